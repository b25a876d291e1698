use alloc::collections::{BTreeMap, VecDeque};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use embedded_io::{ErrorKind, ErrorType, Read, Seek, SeekFrom};

use crate::services::{
    SdDir, SdDirEntry, SdDrive, SdError, SdFilesystemKind, SdHostConfig, SdMountOptions,
    SdPartitionTable, SdRawBus, SdSlotConfig, SdVfs,
};
use crate::SD_NAME_MAX;

pub type CallLog = Rc<RefCell<Vec<String>>>;

#[derive(Debug)]
pub struct MockIoError;

impl embedded_io::Error for MockIoError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct MockFile {
    data: Vec<u8>,
    pos: usize,
    fail_read_after: Option<usize>,
    reads_done: usize,
    read_log: Rc<RefCell<Vec<usize>>>,
}

impl ErrorType for MockFile {
    type Error = MockIoError;
}

impl Read for MockFile {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, MockIoError> {
        if let Some(limit) = self.fail_read_after {
            if self.reads_done >= limit {
                return Err(MockIoError);
            }
        }
        self.reads_done += 1;
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        self.read_log.borrow_mut().push(n);
        Ok(n)
    }
}

impl Seek for MockFile {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, MockIoError> {
        let new = match pos {
            SeekFrom::Start(offset) => offset as i64,
            SeekFrom::End(offset) => self.data.len() as i64 + offset,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new < 0 {
            return Err(MockIoError);
        }
        self.pos = new as usize;
        Ok(self.pos as u64)
    }
}

pub struct MockDir {
    names: VecDeque<String>,
    fail_after: Option<usize>,
    served: usize,
}

impl SdDir for MockDir {
    fn next_entry(&mut self) -> Result<Option<SdDirEntry>, SdError> {
        if let Some(limit) = self.fail_after {
            if self.served >= limit {
                return Err(SdError::Io);
            }
        }
        let Some(name) = self.names.pop_front() else {
            return Ok(None);
        };
        self.served += 1;
        let mut entry_name: heapless::String<SD_NAME_MAX> = heapless::String::new();
        entry_name.push_str(name.as_str()).map_err(|_| SdError::Io)?;
        Ok(Some(SdDirEntry { name: entry_name }))
    }
}

/// Scripted stand-in for the mount service, file namespace, and raw bus.
/// Every call appends a line to `calls`; tests keep a clone of the handle.
pub struct MockSd {
    pub calls: CallLog,
    pub read_log: Rc<RefCell<Vec<usize>>>,
    pub mount_results: VecDeque<Result<(), SdError>>,
    pub unmount_results: VecDeque<Result<(), SdError>>,
    pub dir_result: Result<(), SdError>,
    pub dir_names: Vec<String>,
    pub dir_fail_after: Option<usize>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub file_fail_read_after: Option<usize>,
    pub raw_fail_stage: Option<&'static str>,
}

impl MockSd {
    pub fn new() -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            read_log: Rc::new(RefCell::new(Vec::new())),
            mount_results: VecDeque::new(),
            unmount_results: VecDeque::new(),
            dir_result: Ok(()),
            dir_names: Vec::new(),
            dir_fail_after: None,
            files: BTreeMap::new(),
            file_fail_read_after: None,
            raw_fail_stage: None,
        }
    }

    pub fn with_dir(names: &[&str]) -> Self {
        let mut sd = Self::new();
        sd.dir_names = names.iter().map(|name| String::from(*name)).collect();
        sd
    }

    fn record(&self, line: String) {
        self.calls.borrow_mut().push(line);
    }

    fn raw_result(&self, stage: &'static str) -> Result<(), SdError> {
        if self.raw_fail_stage == Some(stage) {
            Err(SdError::Failed)
        } else {
            Ok(())
        }
    }
}

impl SdVfs for MockSd {
    type File = MockFile;
    type Dir = MockDir;

    fn mount(
        &mut self,
        mount_point: &str,
        host: &SdHostConfig,
        slot: &SdSlotConfig,
        options: &SdMountOptions,
    ) -> Result<(), SdError> {
        self.record(format!(
            "mount {} freq={} clk={} miso={} mosi={} cs={} fmt_on_fail={} max_files={}",
            mount_point,
            host.max_freq_khz,
            slot.gpio_clk,
            slot.gpio_miso,
            slot.gpio_mosi,
            slot.gpio_cs,
            options.format_if_mount_failed,
            options.max_open_files,
        ));
        self.mount_results.pop_front().unwrap_or(Ok(()))
    }

    fn unmount(&mut self) -> Result<(), SdError> {
        self.record(String::from("unmount"));
        self.unmount_results.pop_front().unwrap_or(Ok(()))
    }

    fn open_file(&mut self, path: &str) -> Result<MockFile, SdError> {
        self.record(format!("open_file {path}"));
        let data = self.files.get(path).cloned().ok_or(SdError::NotFound)?;
        Ok(MockFile {
            data,
            pos: 0,
            fail_read_after: self.file_fail_read_after,
            reads_done: 0,
            read_log: Rc::clone(&self.read_log),
        })
    }

    fn open_dir(&mut self, path: &str) -> Result<MockDir, SdError> {
        self.record(format!("open_dir {path}"));
        self.dir_result?;
        Ok(MockDir {
            names: self.dir_names.iter().cloned().collect(),
            fail_after: self.dir_fail_after,
            served: 0,
        })
    }
}

impl SdRawBus for MockSd {
    fn acquire_drive(&mut self) -> Result<SdDrive, SdError> {
        self.record(String::from("acquire_drive"));
        self.raw_result("acquire_drive")?;
        Ok(SdDrive(0))
    }

    fn host_init(&mut self, host: &SdHostConfig) -> Result<(), SdError> {
        self.record(format!("host_init freq={}", host.max_freq_khz));
        self.raw_result("host_init")
    }

    fn host_deinit(&mut self) {
        self.record(String::from("host_deinit"));
    }

    fn slot_init(&mut self, slot: &SdSlotConfig) -> Result<(), SdError> {
        self.record(format!(
            "slot_init clk={} miso={} mosi={} cs={}",
            slot.gpio_clk, slot.gpio_miso, slot.gpio_mosi, slot.gpio_cs
        ));
        self.raw_result("slot_init")
    }

    fn card_init(&mut self, _host: &SdHostConfig) -> Result<(), SdError> {
        self.record(String::from("card_init"));
        self.raw_result("card_init")
    }

    fn register_block_device(&mut self, drive: SdDrive) -> Result<(), SdError> {
        self.record(format!("register drive={}", drive.0));
        self.raw_result("register")
    }

    fn unregister_block_device(&mut self, drive: SdDrive) {
        self.record(format!("unregister drive={}", drive.0));
    }

    fn partition(
        &mut self,
        drive: SdDrive,
        table: &SdPartitionTable,
        work: &mut [u8],
    ) -> Result<(), SdError> {
        self.record(format!(
            "partition drive={} p0={} work={}",
            drive.0,
            table.0[0],
            work.len()
        ));
        self.raw_result("partition")
    }

    fn make_filesystem(
        &mut self,
        drive: SdDrive,
        kind: SdFilesystemKind,
        allocation_unit: u32,
        work: &mut [u8],
    ) -> Result<(), SdError> {
        self.record(format!(
            "mkfs drive={} kind={:?} au={} work={}",
            drive.0,
            kind,
            allocation_unit,
            work.len()
        ));
        self.raw_result("mkfs")
    }
}
