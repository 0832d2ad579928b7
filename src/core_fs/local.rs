use crate::core_fs::error::StoreError;
use crate::core_fs::store::{DirEntry, DiskSpace, FileStore};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use filetime::{set_file_mtime, FileTime};
use log::{debug, error, trace, warn};
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use sysinfo::{DiskExt, System, SystemExt};

/// [`FileStore`] over a directory of the local filesystem.
///
/// The root acts as a chroot: virtual paths are normalised lexically (no
/// component may climb above `/`) and the resolved real path is checked
/// against the canonical root, so symlinks cannot escape either.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    cwd: String,
}

fn map_io(path: &str, e: std::io::Error) -> StoreError {
    match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
        ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_string()),
        _ => StoreError::Io(e),
    }
}

fn local_time(t: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(t).naive_local()
}

impl LocalStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .map_err(|e| map_io(&root.to_string_lossy(), e))?;
        if !root.is_dir() {
            return Err(StoreError::NotADirectory(root.to_string_lossy().into_owned()));
        }
        debug!("file store root: {:?}", root);
        Ok(Self {
            root,
            cwd: String::from("/"),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalises `path` against the current directory into an absolute
    /// virtual path.
    pub fn resolve_virtual(&self, path: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !path.starts_with('/') {
            parts.extend(self.cwd.split('/').filter(|p| !p.is_empty()));
        }
        for part in path.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                name => parts.push(name),
            }
        }
        format!("/{}", parts.join("/"))
    }

    fn real_path(&self, path: &str) -> Result<PathBuf, StoreError> {
        let virtual_path = self.resolve_virtual(path);
        let real = self.root.join(virtual_path.trim_start_matches('/'));

        // The deepest existing ancestor must still live under the root.
        let mut probe = real.as_path();
        loop {
            if let Ok(canonical) = probe.canonicalize() {
                if !canonical.starts_with(&self.root) {
                    error!("Path is outside of the allowed area: {:?}", canonical);
                    return Err(StoreError::OutsideRoot(virtual_path));
                }
                break;
            }
            match probe.parent() {
                Some(parent) => probe = parent,
                None => break,
            }
        }
        trace!("resolved {:?} -> {:?}", path, real);
        Ok(real)
    }
}

impl FileStore for LocalStore {
    fn cd(&mut self, path: &str) -> Result<(), StoreError> {
        let real = self.real_path(path)?;
        if !real.exists() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        if !real.is_dir() {
            return Err(StoreError::NotADirectory(path.to_string()));
        }
        self.cwd = self.resolve_virtual(path);
        Ok(())
    }

    fn current(&self) -> String {
        self.cwd.clone()
    }

    fn probe(&self, path: &str) -> bool {
        self.real_path(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.real_path(path).map(|p| p.is_dir()).unwrap_or(false)
    }

    fn remove(&mut self, path: &str) -> Result<(), StoreError> {
        let real = self.real_path(path)?;
        if real == self.root {
            warn!("refusing to remove the store root");
            return Err(StoreError::OutsideRoot(path.to_string()));
        }
        let result = if real.is_dir() {
            fs::remove_dir(&real)
        } else {
            fs::remove_file(&real)
        };
        result.map_err(|e| map_io(path, e))
    }

    fn mkdir(&mut self, path: &str) -> Result<(), StoreError> {
        let real = self.real_path(path)?;
        if real.exists() {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        fs::create_dir(&real).map_err(|e| map_io(path, e))
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), StoreError> {
        let src = self.real_path(from)?;
        let dst = self.real_path(to)?;
        if !src.exists() {
            return Err(StoreError::NotFound(from.to_string()));
        }
        if dst.exists() {
            return Err(StoreError::AlreadyExists(to.to_string()));
        }
        fs::rename(&src, &dst).map_err(|e| map_io(to, e))
    }

    fn size(&self, path: &str) -> Result<u64, StoreError> {
        let real = self.real_path(path)?;
        let metadata = fs::metadata(&real).map_err(|e| map_io(path, e))?;
        Ok(metadata.len())
    }

    fn modified(&self, path: &str) -> Result<NaiveDateTime, StoreError> {
        let real = self.real_path(path)?;
        let metadata = fs::metadata(&real).map_err(|e| map_io(path, e))?;
        Ok(local_time(metadata.modified()?))
    }

    fn set_modified(&mut self, path: &str, time: NaiveDateTime) -> Result<(), StoreError> {
        let real = self.real_path(path)?;
        if !real.exists() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        let timestamp = Local
            .from_local_datetime(&time)
            .earliest()
            .map(|t| t.timestamp())
            .unwrap_or_else(|| time.and_utc().timestamp());
        set_file_mtime(&real, FileTime::from_unix_time(timestamp, 0))?;
        Ok(())
    }

    fn disk_space(&self) -> Result<DiskSpace, StoreError> {
        let mut sys = System::new();
        sys.refresh_disks_list();

        // Longest mount point containing the root wins.
        sys.disks()
            .iter()
            .filter(|disk| self.root.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(|disk| DiskSpace {
                free_bytes: disk.available_space(),
                capacity_bytes: disk.total_space(),
            })
            .ok_or(StoreError::DiskInfoUnavailable)
    }

    fn dir_loop(
        &self,
        path: &str,
        visitor: &mut dyn FnMut(&DirEntry),
    ) -> Result<usize, StoreError> {
        let real = self.real_path(path)?;
        if !real.is_dir() {
            return Err(StoreError::NotADirectory(path.to_string()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&real).map_err(|e| map_io(path, e))? {
            let entry = entry?;
            let metadata = match fs::metadata(entry.path()) {
                Ok(m) => m,
                Err(e) => {
                    warn!("skipping {:?}: {}", entry.path(), e);
                    continue;
                }
            };
            let modified = metadata
                .modified()
                .map(local_time)
                .unwrap_or_default();
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: metadata.is_dir(),
                size: if metadata.is_dir() { 0 } else { metadata.len() },
                modified,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in &entries {
            visitor(entry);
        }
        Ok(entries.len())
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>, StoreError> {
        let real = self.real_path(path)?;
        if real.is_dir() {
            return Err(StoreError::NotFound(path.to_string()));
        }
        let file = fs::File::open(&real).map_err(|e| map_io(path, e))?;
        Ok(Box::new(file))
    }

    fn open_write(&mut self, path: &str) -> Result<Box<dyn Write + Send>, StoreError> {
        let real = self.real_path(path)?;
        let file = fs::File::create(&real).map_err(|e| map_io(path, e))?;
        Ok(Box::new(file))
    }
}
