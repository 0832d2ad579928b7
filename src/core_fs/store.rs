use crate::core_fs::error::StoreError;
use chrono::NaiveDateTime;
use std::io::{Read, Write};

/// One directory entry as produced by [`FileStore::dir_loop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    /// Local time of the last modification.
    pub modified: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskSpace {
    pub free_bytes: u64,
    pub capacity_bytes: u64,
}

impl DiskSpace {
    pub fn free_mb(&self) -> u64 {
        self.free_bytes / (1024 * 1024)
    }

    pub fn capacity_mb(&self) -> u64 {
        self.capacity_bytes / (1024 * 1024)
    }
}

/// Directory/file store the FTP engine works against.
///
/// Paths are virtual: absolute (`/a/b`) or relative to the store's current
/// directory. Implementations keep every resolved path inside their root.
pub trait FileStore {
    fn cd(&mut self, path: &str) -> Result<(), StoreError>;

    /// Current virtual directory, always starting with `/`.
    fn current(&self) -> String;

    fn probe(&self, path: &str) -> bool;

    fn is_dir(&self, path: &str) -> bool;

    /// Removes a file or an empty directory.
    fn remove(&mut self, path: &str) -> Result<(), StoreError>;

    fn mkdir(&mut self, path: &str) -> Result<(), StoreError>;

    fn rename(&mut self, from: &str, to: &str) -> Result<(), StoreError>;

    fn size(&self, path: &str) -> Result<u64, StoreError>;

    fn modified(&self, path: &str) -> Result<NaiveDateTime, StoreError>;

    fn set_modified(&mut self, path: &str, time: NaiveDateTime) -> Result<(), StoreError>;

    fn disk_space(&self) -> Result<DiskSpace, StoreError>;

    /// Calls `visitor` once per entry of the directory and returns the
    /// number of entries visited.
    fn dir_loop(
        &self,
        path: &str,
        visitor: &mut dyn FnMut(&DirEntry),
    ) -> Result<usize, StoreError>;

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>, StoreError>;

    /// Creates or truncates the file.
    fn open_write(&mut self, path: &str) -> Result<Box<dyn Write + Send>, StoreError>;
}
