use log::error;

use crate::services::{SdError, SdHostConfig, SdMountOptions, SdSlotConfig, SdVfs};
use crate::SD_MAX_OPEN_FILES;

/// The card slot. Owns the service handle; at most one mount exists per slot
/// and it is represented by a live [`SdCardMount`].
pub struct SdCardSlot<V: SdVfs> {
    pub(crate) vfs: V,
}

impl<V: SdVfs> SdCardSlot<V> {
    pub fn new(vfs: V) -> Self {
        Self { vfs }
    }

    /// Mount the card filesystem at `mount_point`. While the returned handle
    /// lives the slot stays borrowed, so a second mount cannot be started
    /// and reads cannot outlive the session.
    pub fn open(&mut self, mount_point: &str) -> Result<SdCardMount<'_, V>, SdError> {
        let host = SdHostConfig::default();
        let slot = SdSlotConfig::default();
        let options = SdMountOptions {
            format_if_mount_failed: false,
            max_open_files: SD_MAX_OPEN_FILES,
        };

        match self.vfs.mount(mount_point, &host, &slot, &options) {
            Ok(()) => {}
            // The service says the card is already attached, e.g. after a
            // leaked handle. The mount is usable either way.
            Err(SdError::InvalidState) => {}
            Err(err) => {
                error!("open: mount_failed mount_point={} err={:?}", mount_point, err);
                return Err(err);
            }
        }

        Ok(SdCardMount { slot: self })
    }
}

/// An open card session. Dropping it without [`close`](SdCardMount::close)
/// leaves the service-level mount attached; the next `open` then succeeds
/// through the already-attached path.
pub struct SdCardMount<'a, V: SdVfs> {
    pub(crate) slot: &'a mut SdCardSlot<V>,
}

impl<'a, V: SdVfs> core::fmt::Debug for SdCardMount<'a, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SdCardMount").finish_non_exhaustive()
    }
}

impl<'a, V: SdVfs> SdCardMount<'a, V> {
    /// Unmount the card. On failure the handle is handed back so the session
    /// stays open and the caller may retry.
    pub fn close(self) -> Result<(), (Self, SdError)> {
        match self.slot.vfs.unmount() {
            Ok(()) => Ok(()),
            Err(err) => {
                error!("close: unmount_failed err={:?}", err);
                Err((self, err))
            }
        }
    }
}
