pub mod clock;
pub mod config;
pub mod constants;
pub mod core_auth;
pub mod core_buffer;
pub mod core_cli;
pub mod core_fs;
pub mod core_ftpcommand;
pub mod core_http;
pub mod core_network;
pub mod core_reply;
pub mod core_transfer;
pub mod helpers;
pub mod server;
pub mod session;

pub use config::Config;
