pub mod error;
pub mod local;
pub mod store;

pub use error::StoreError;
pub use local::LocalStore;
pub use store::{DirEntry, DiskSpace, FileStore};
