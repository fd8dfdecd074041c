//! Salted PBKDF2-HMAC-SHA256 password hashing
//!
//! Stored hash = `pbkdf2-sha256$<iterations>$<hex key>`, salt = 16 random
//! bytes hex. The iteration count travels with the hash so verification keeps
//! working after the default is raised.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
const KEY_LENGTH: usize = 32;
const SCHEME: &str = "pbkdf2-sha256";

/// Generate a fresh random salt (32 hex chars)
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password with the given salt at the default work factor
pub fn hash_password(password: &str, salt: &str) -> String {
    hash_with_iterations(password, salt, PBKDF2_ITERATIONS)
}

/// Hash a password with an explicit iteration count
///
/// # Examples
///
/// ```
/// use docfinder_common::identity::password::hash_with_iterations;
///
/// let hash = hash_with_iterations("secret", "abcd", 1_000);
/// assert!(hash.starts_with("pbkdf2-sha256$1000$"));
/// assert_eq!(hash, hash_with_iterations("secret", "abcd", 1_000));
/// ```
pub fn hash_with_iterations(password: &str, salt: &str, iterations: u32) -> String {
    format!(
        "{}${}${}",
        SCHEME,
        iterations,
        hex::encode(derive(password, salt, iterations))
    )
}

/// Check a password against a stored salt and hash
///
/// Malformed stored hashes never verify.
pub fn verify_password(password: &str, salt: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(SCHEME), Some(iterations), Some(key_hex)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let (Ok(iterations), Ok(expected)) = (iterations.parse::<u32>(), hex::decode(key_hex)) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }

    let calculated = derive(password, salt, iterations);
    calculated.as_slice().ct_eq(expected.as_slice()).into()
}

fn derive(password: &str, salt: &str, iterations: u32) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key
}
