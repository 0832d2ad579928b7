// src/constants.rs

pub const DEFAULT_CONFIG_PATH: &str = "/etc/tickftpd.conf";

/// Upper bound on control bytes read per tick.
pub const CONTROL_READ_CHUNK: usize = 256;

/// Lines listed by FEAT, in reply order.
pub const FEAT_EXTENSIONS: &[&str] = &["MDTM", "MLSD", "SIZE", "SITE FREE"];

pub const FAVICON_PATH: &str = "/favicon.ico";

/// Width of the reserved `Content-Length` field.
pub const CONTENT_LENGTH_FIELD: usize = 5;
