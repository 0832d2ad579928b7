pub mod helper;

pub use helper::{hash_password, verify_password};
