use crate::error::Result;

/// Work factor for stored password hashes.
pub const BCRYPT_COST: u32 = 10;

/// Hashes a password with bcrypt.
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

/// Checks a password against a stored bcrypt hash. A malformed stored hash
/// counts as a mismatch.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password hash is not valid bcrypt: {}", e);
            false
        }
    }
}
