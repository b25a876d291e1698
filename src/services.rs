use heapless::String;

use crate::SD_NAME_MAX;

pub const SD_PIN_CLK: u8 = 18;
pub const SD_PIN_MISO: u8 = 19;
pub const SD_PIN_MOSI: u8 = 23;
pub const SD_PIN_CS: u8 = 22;
pub const SD_FREQ_DEFAULT_KHZ: u32 = 20_000;

/// Status codes surfaced by the mount service and the raw card bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdError {
    Failed,
    InvalidState,
    Timeout,
    NoMedia,
    NotFound,
    Io,
    NoFreeDrive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SdHostConfig {
    pub max_freq_khz: u32,
}

impl Default for SdHostConfig {
    fn default() -> Self {
        Self {
            max_freq_khz: SD_FREQ_DEFAULT_KHZ,
        }
    }
}

/// The four GPIO roles of the card slot. Fixed by the board layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SdSlotConfig {
    pub gpio_clk: u8,
    pub gpio_miso: u8,
    pub gpio_mosi: u8,
    pub gpio_cs: u8,
}

impl Default for SdSlotConfig {
    fn default() -> Self {
        Self {
            gpio_clk: SD_PIN_CLK,
            gpio_miso: SD_PIN_MISO,
            gpio_mosi: SD_PIN_MOSI,
            gpio_cs: SD_PIN_CS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SdMountOptions {
    pub format_if_mount_failed: bool,
    pub max_open_files: u8,
}

/// Logical drive number in the block-device registration layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SdDrive(pub u8);

impl SdDrive {
    pub const UNASSIGNED: Self = Self(0xFF);
}

/// Four-slot partition table, each entry a percentage of the card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SdPartitionTable(pub [u32; 4]);

impl SdPartitionTable {
    /// One partition spanning the whole card.
    pub const SINGLE_FULL: Self = Self([100, 0, 0, 0]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SdFilesystemKind {
    Fat32,
    ExFat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SdDirEntry {
    pub name: String<SD_NAME_MAX>,
}

/// Cursor over one directory. `Ok(None)` ends the walk.
pub trait SdDir {
    fn next_entry(&mut self) -> Result<Option<SdDirEntry>, SdError>;
}

/// Mount service and file namespace of the card filesystem.
///
/// Opened files follow `fread` semantics: a read shorter than the requested
/// length means end-of-file.
pub trait SdVfs {
    type File: embedded_io::Read + embedded_io::Seek;
    type Dir: SdDir;

    fn mount(
        &mut self,
        mount_point: &str,
        host: &SdHostConfig,
        slot: &SdSlotConfig,
        options: &SdMountOptions,
    ) -> Result<(), SdError>;
    fn unmount(&mut self) -> Result<(), SdError>;
    fn open_file(&mut self, path: &str) -> Result<Self::File, SdError>;
    fn open_dir(&mut self, path: &str) -> Result<Self::Dir, SdError>;
}

/// Transport and block-format primitives, below the filesystem layer.
pub trait SdRawBus {
    fn acquire_drive(&mut self) -> Result<SdDrive, SdError>;
    fn host_init(&mut self, host: &SdHostConfig) -> Result<(), SdError>;
    fn host_deinit(&mut self);
    fn slot_init(&mut self, slot: &SdSlotConfig) -> Result<(), SdError>;
    fn card_init(&mut self, host: &SdHostConfig) -> Result<(), SdError>;
    fn register_block_device(&mut self, drive: SdDrive) -> Result<(), SdError>;
    fn unregister_block_device(&mut self, drive: SdDrive);
    fn partition(
        &mut self,
        drive: SdDrive,
        table: &SdPartitionTable,
        work: &mut [u8],
    ) -> Result<(), SdError>;
    fn make_filesystem(
        &mut self,
        drive: SdDrive,
        kind: SdFilesystemKind,
        allocation_unit: u32,
        work: &mut [u8],
    ) -> Result<(), SdError>;
}
