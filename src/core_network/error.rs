use crate::core_network::transport::SocketHandle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("no such socket: {0:?}")]
    NoSuchSocket(SocketHandle),

    #[error("socket {0:?} is not connected")]
    NotConnected(SocketHandle),

    #[error("peer closed the connection")]
    Closed,

    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn to_ftp_response(&self) -> String {
        match self {
            TransportError::Closed | TransportError::NotConnected(_) => {
                "426 Connection closed; transfer aborted.".to_string()
            }
            _ => "425 Can't open data connection".to_string(),
        }
    }
}
