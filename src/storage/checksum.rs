//! CRC32 (IEEE) checksums for data file records
//!
//! Every record carries a checksum over its length prefix and body.
//! A mismatch on read is corruption; the record is never returned.

use crc32fast::Hasher;

/// Computes the CRC32 of `data`.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
