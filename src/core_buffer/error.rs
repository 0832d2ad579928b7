use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("line longer than {capacity} bytes, partial line discarded")]
    Overflow { capacity: usize },
}

impl LineError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            LineError::Overflow { .. } => "500 Line too long.".to_string(),
        }
    }
}
