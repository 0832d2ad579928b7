use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use log::error;

/// Bcrypt hashes are stored with their `$2a$`/`$2b$`/`$2y$` prefix.
fn is_bcrypt_hash(s: &str) -> bool {
    s.starts_with("$2")
}

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Checks `password` against the configured secret, which is either plain
/// text or a bcrypt hash.
pub fn verify_password(password: &str, configured: &str) -> bool {
    if is_bcrypt_hash(configured) {
        match verify(password, configured) {
            Ok(ok) => ok,
            Err(e) => {
                error!("Invalid bcrypt hash in configuration: {}", e);
                false
            }
        }
    } else {
        password == configured
    }
}
