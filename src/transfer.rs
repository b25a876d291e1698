use core::sync::atomic::{fence, Ordering};

use embedded_io::{Read, Seek, SeekFrom};
use log::error;

use crate::card::SdCardMount;
use crate::services::SdVfs;
use crate::SD_COPY_BLOCK_LEN;

impl<'a, V: SdVfs> SdCardMount<'a, V> {
    /// Size of the file at `path`, or 0 when it cannot be opened. An empty
    /// file is indistinguishable from a failed open here; the log line is
    /// the only discriminator.
    pub fn file_size(&mut self, path: &str) -> usize {
        let mut file = match self.slot.vfs.open_file(path) {
            Ok(file) => file,
            Err(err) => {
                error!("file_size: open_failed path={} err={:?}", path, err);
                return 0;
            }
        };

        let size = match file.seek(SeekFrom::End(0)) {
            Ok(size) => size,
            Err(err) => {
                error!("file_size: seek_failed path={} err={:?}", path, err);
                return 0;
            }
        };
        let _ = file.seek(SeekFrom::Start(0));

        size as usize
    }

    /// Stream the file at `path` into `dest` in fixed 512-byte blocks and
    /// return the byte count copied. The caller sizes `dest` beforehand via
    /// `file_size`; a smaller buffer truncates the copy at its end.
    ///
    /// Each block transfer is bracketed by full memory fences so the bytes
    /// become visible to DMA engines and the other core, not just this
    /// thread. Do not drop them: the load region is consumed by hardware.
    pub fn copy_file_to_memory(&mut self, path: &str, dest: &mut [u8]) -> usize {
        let mut file = match self.slot.vfs.open_file(path) {
            Ok(file) => file,
            Err(err) => {
                error!("copy_file: open_failed path={} err={:?}", path, err);
                return 0;
            }
        };

        let mut copied = 0usize;
        loop {
            let want = SD_COPY_BLOCK_LEN.min(dest.len() - copied);
            fence(Ordering::SeqCst);
            let got = match file.read(&mut dest[copied..copied + want]) {
                Ok(got) => got,
                Err(err) => {
                    error!("copy_file: read_failed path={} err={:?}", path, err);
                    break;
                }
            };
            fence(Ordering::SeqCst);
            copied += got;
            // A block shorter than requested means end-of-file (or an
            // exhausted dest). An exact-multiple file ends on a zero read.
            if got < SD_COPY_BLOCK_LEN {
                break;
            }
        }

        copied
    }
}
