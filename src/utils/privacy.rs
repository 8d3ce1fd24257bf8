// Client address hashing: logs carry a salted digest, never the raw address.

use sha2::{Digest, Sha256};

/// Salted SHA-256 of a client address, hex encoded. Empty input hashes to "".
pub fn hash_ip(ip: &str, salt: &str) -> String {
    if ip.is_empty() {
        return String::new();
    }
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(ip.as_bytes());
    hex::encode(hasher.finalize())
}

/// Short prefix of [`hash_ip`] suitable for a log field.
pub fn client_fingerprint(ip: &str, salt: &str) -> String {
    let mut digest = hash_ip(ip, salt);
    digest.truncate(12);
    if digest.is_empty() {
        "unknown".to_string()
    } else {
        digest
    }
}
