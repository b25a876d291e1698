use alloc::string::String;
use alloc::vec::Vec;

use log::{error, warn};

use crate::card::SdCardMount;
use crate::services::{SdDir, SdVfs};
use crate::{sort, SD_MAX_LISTED_FILES};

impl<'a, V: SdVfs> SdCardMount<'a, V> {
    /// List the entries of `path` whose names end in `extension`
    /// (case-insensitive), sorted for menu display.
    ///
    /// `extension` must be non-empty; an empty filter is a caller bug and
    /// panics. An unreadable directory yields an empty listing with the
    /// failure visible only in the log, so a zero count is not by itself an
    /// error. Collection stops silently at [`SD_MAX_LISTED_FILES`].
    pub fn list_files(&mut self, path: &str, extension: &str) -> Vec<String> {
        assert!(!extension.is_empty(), "list_files: empty extension filter");

        let mut dir = match self.slot.vfs.open_dir(path) {
            Ok(dir) => dir,
            Err(err) => {
                error!("list_files: opendir_failed path={} err={:?}", path, err);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = Vec::new();
        loop {
            let entry = match dir.next_entry() {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!("list_files: readdir_failed path={} err={:?}", path, err);
                    break;
                }
            };

            let name = entry.name.as_str();
            if name.starts_with('.') {
                continue;
            }
            // Shorter-or-equal names cannot carry the suffix; this check
            // also keeps the tail slice below from underflowing.
            if name.len() <= extension.len() {
                continue;
            }
            let tail = &name.as_bytes()[name.len() - extension.len()..];
            if !tail.eq_ignore_ascii_case(extension.as_bytes()) {
                continue;
            }

            names.push(String::from(name));
            if names.len() >= SD_MAX_LISTED_FILES {
                break;
            }
        }

        sort::sort_names(&mut names);
        names
    }
}
