use crate::core_fs::StoreError;
use crate::core_network::error::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl FtpError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            FtpError::Transport(e) => e.to_ftp_response(),
            FtpError::Store(e) => e.to_ftp_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_reply_follows_the_wrapped_error() {
        let err = FtpError::from(StoreError::OutsideRoot("/etc".to_string()));
        assert!(err.to_ftp_response().starts_with("550 "));

        let err = FtpError::from(StoreError::AlreadyExists("a".to_string()));
        assert!(err.to_ftp_response().starts_with("553 "));

        let err = FtpError::from(StoreError::Io(io::Error::new(io::ErrorKind::Other, "x")));
        assert!(err.to_ftp_response().starts_with("451 "));

        let err = FtpError::from(TransportError::Closed);
        assert!(err.to_ftp_response().starts_with("426 "));
    }
}
