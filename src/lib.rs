#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod card;
pub mod format;
pub mod listing;
pub mod services;
pub mod sort;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testutil;

pub use card::{SdCardMount, SdCardSlot};
pub use services::{
    SdDir, SdDirEntry, SdDrive, SdError, SdFilesystemKind, SdHostConfig, SdMountOptions,
    SdPartitionTable, SdRawBus, SdSlotConfig, SdVfs,
};

pub const SD_NAME_MAX: usize = 96;
pub const SD_MAX_LISTED_FILES: usize = 1024;
pub const SD_COPY_BLOCK_LEN: usize = 512;
pub const SD_MAX_OPEN_FILES: u8 = 5;
pub const SD_FORMAT_WORKBUF_LEN: usize = 4096;
pub const SD_FORMAT_ALLOC_UNIT: u32 = 4096;
