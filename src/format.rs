use alloc::vec;

use log::{error, info};

use crate::card::SdCardSlot;
use crate::services::{
    SdDrive, SdError, SdFilesystemKind, SdHostConfig, SdPartitionTable, SdRawBus, SdSlotConfig,
    SdVfs,
};
use crate::{SD_FORMAT_ALLOC_UNIT, SD_FORMAT_WORKBUF_LEN};

impl<V: SdVfs + SdRawBus> SdCardSlot<V> {
    /// Repartition and reformat the card: one partition over the whole
    /// medium, then the requested filesystem. Destructive and single-shot;
    /// every step failure is terminal, no retries.
    ///
    /// Taking `&mut self` means no session handle can be live while this
    /// runs. A leaked handle may still have left the service-level mount
    /// attached, so it is detached best-effort first, outcome ignored.
    pub fn format(&mut self, kind: SdFilesystemKind) -> Result<(), SdError> {
        let mut work = vec![0u8; SD_FORMAT_WORKBUF_LEN];

        let _ = self.vfs.unmount();

        let mut drive = SdDrive::UNASSIGNED;
        let outcome = run_steps(&mut self.vfs, kind, &mut drive, &mut work);

        match outcome {
            Ok(()) => info!("format: done drive={}", drive.0),
            Err((stage, err)) => error!("format: {} err={:?}", stage, err),
        }

        // Cleanup runs on every path, even when acquisition failed and the
        // transport was never brought up.
        drop(work);
        self.vfs.host_deinit();
        self.vfs.unregister_block_device(drive);

        outcome.map_err(|(_, err)| err)
    }
}

fn run_steps<B: SdRawBus>(
    bus: &mut B,
    kind: SdFilesystemKind,
    drive: &mut SdDrive,
    work: &mut [u8],
) -> Result<(), (&'static str, SdError)> {
    let host = SdHostConfig::default();
    let slot = SdSlotConfig::default();

    *drive = bus
        .acquire_drive()
        .map_err(|err| ("acquire_drive failed", err))?;
    bus.host_init(&host).map_err(|err| ("host_init failed", err))?;
    bus.slot_init(&slot).map_err(|err| ("slot_init failed", err))?;
    bus.card_init(&host).map_err(|err| ("card_init failed", err))?;
    bus.register_block_device(*drive)
        .map_err(|err| ("register_block_device failed", err))?;

    info!("format: partitioning drive={}", drive.0);
    bus.partition(*drive, &SdPartitionTable::SINGLE_FULL, work)
        .map_err(|err| ("partition failed", err))?;

    info!("format: making filesystem drive={} kind={:?}", drive.0, kind);
    bus.make_filesystem(*drive, kind, SD_FORMAT_ALLOC_UNIT, work)
        .map_err(|err| ("make_filesystem failed", err))?;

    Ok(())
}
