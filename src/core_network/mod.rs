pub mod data_channel;
pub mod error;
pub mod network;
pub mod pasv;
pub mod port;
pub mod tokio_transport;
pub mod transport;

pub use data_channel::{DataChannel, DataState};
pub use error::TransportError;
pub use network::FtpServer;
pub use tokio_transport::TokioTransport;
pub use transport::{Role, SocketHandle, SocketOptions, Transport};
