//! Canonical serialization for deterministic hashing.
//!
//! Used for the metrics configuration hash and the report hash.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: struct fields serialize in declaration order
//! - Stable Vec order: vectors serialize in index order
//! - No HashMap allowed: use BTreeMap for maps in hashed data
//! - Floats in hashed parameters are quantized to integers first

use std::io::{self, Write};

use serde::Serialize;
use xxhash_rust::xxh64::Xxh64;

/// Feeds serialized JSON straight into an xxh64 state.
struct HashWriter(Xxh64);

impl Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serialize a value to canonical JSON bytes.
///
/// Hashed types use string map keys only, so serialization cannot fail.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("hashed values serialize with string keys")
}

/// xxh64 (seed 0) over the canonical JSON of a value, without buffering it.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let mut writer = HashWriter(Xxh64::new(0));
    serde_json::to_writer(&mut writer, value).expect("hashed values serialize with string keys");
    writer.0.digest()
}

/// [`canonical_hash`] as 16 lowercase hex digits.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}
