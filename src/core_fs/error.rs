use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("path is outside of the allowed area: {0}")]
    OutsideRoot(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("disk information unavailable")]
    DiskInfoUnavailable,

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            StoreError::NotFound(_) => "550 File not found.".to_string(),
            StoreError::AlreadyExists(_) => "553 File already exists.".to_string(),
            StoreError::OutsideRoot(_) => "550 Path is outside of the allowed area.".to_string(),
            StoreError::NotADirectory(_) => "550 Not a directory.".to_string(),
            StoreError::DiskInfoUnavailable => "550 disk not available".to_string(),
            StoreError::Io(_) => "451 Requested action aborted. Local error in processing.".to_string(),
        }
    }
}
