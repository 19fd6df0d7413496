pub mod hash;

pub use hash::{HmacSha256Hasher, KeyHasher, Sha256Hasher};
