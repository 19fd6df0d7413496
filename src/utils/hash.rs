//! One-way digests for API key secrets.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Produces a comparable digest from a raw key value.
///
/// Implementations must be deterministic: the same input always yields the
/// same digest, so stored `key_hash` values stay comparable.
pub trait KeyHasher: Send + Sync {
    fn hash(&self, raw: &str) -> String;
}

/// Plain SHA-256, lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl KeyHasher for Sha256Hasher {
    fn hash(&self, raw: &str) -> String {
        hex::encode(Sha256::digest(raw.as_bytes()))
    }
}

/// HMAC-SHA256 keyed by a server-side secret, lowercase hex.
///
/// Someone with read access to stored digests cannot test candidate keys
/// without the secret.
#[derive(Clone)]
pub struct HmacSha256Hasher {
    secret: Vec<u8>,
}

impl HmacSha256Hasher {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl KeyHasher for HmacSha256Hasher {
    fn hash(&self, raw: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(raw.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
