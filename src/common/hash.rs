// Shared hash utilities for payload digests
//
// Provides one streaming interface over MD5, SHA-1, SHA-256, SHA-512,
// BLAKE2b, BLAKE3, XXH3, XXH64 and CRC32, plus digesting of a byte range
// of any seekable handle.

use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::str::FromStr;
use md5::Md5;
use sha1::{Sha1, Digest};
use sha2::{Sha256, Sha512};
use blake2::Blake2b512;
use blake3::Hasher as Blake3Hasher;
use xxhash_rust::xxh3::Xxh3;
use xxhash_rust::xxh64::Xxh64;
use crc32fast::Hasher as Crc32Hasher;
use serde::Serialize;
use tracing::{debug, instrument};

use super::BUFFER_SIZE;
use crate::error::{SumError, SumResult};
use crate::tags::ByteRange;

// =============================================================================
// Hash Algorithm Enum
// =============================================================================

/// Supported digest algorithms
/// - MD5: the historical default for audiosum listings
/// - SHA1/SHA256/SHA512/BLAKE2b/BLAKE3: cryptographic
/// - XXH3/XXH64/CRC32: fast non-cryptographic checksums
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    Blake3,
    Blake2,
    Xxh3,
    Xxh64,
    Crc32,
}

impl HashAlgorithm {
    /// Every algorithm, in listing order
    pub const ALL: [HashAlgorithm; 9] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Blake2,
        HashAlgorithm::Blake3,
        HashAlgorithm::Xxh3,
        HashAlgorithm::Xxh64,
        HashAlgorithm::Crc32,
    ];

    /// Name accepted on the command line
    pub fn cli_name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Blake2 => "blake2",
            HashAlgorithm::Xxh3 => "xxh3",
            HashAlgorithm::Xxh64 => "xxh64",
            HashAlgorithm::Crc32 => "crc32",
        }
    }

    /// Get the canonical algorithm name
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha512 => "SHA-512",
            HashAlgorithm::Blake3 => "BLAKE3",
            HashAlgorithm::Blake2 => "BLAKE2b",
            HashAlgorithm::Xxh3 => "XXH3",
            HashAlgorithm::Xxh64 => "XXH64",
            HashAlgorithm::Crc32 => "CRC32",
        }
    }

    /// Get expected hash length in hex characters
    pub fn hash_length(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha512 => 128,
            HashAlgorithm::Blake3 => 64,
            HashAlgorithm::Blake2 => 128,
            HashAlgorithm::Xxh3 => 32,  // 128-bit = 32 hex chars
            HashAlgorithm::Xxh64 => 16, // 64-bit = 16 hex chars
            HashAlgorithm::Crc32 => 8,  // 32-bit = 8 hex chars
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = SumError;

    /// Parse algorithm name (case-insensitive)
    fn from_str(algorithm: &str) -> Result<Self, Self::Err> {
        match algorithm.trim().to_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(HashAlgorithm::Sha512),
            "blake3" => Ok(HashAlgorithm::Blake3),
            "blake2" | "blake2b" => Ok(HashAlgorithm::Blake2),
            "xxh3" | "xxhash3" => Ok(HashAlgorithm::Xxh3),
            "xxh64" | "xxhash64" => Ok(HashAlgorithm::Xxh64),
            "crc32" | "crc-32" => Ok(HashAlgorithm::Crc32),
            _ => Err(SumError::UnsupportedAlgorithm(algorithm.to_string())),
        }
    }
}

/// Command-line names of every supported algorithm
pub fn supported_names() -> Vec<&'static str> {
    HashAlgorithm::ALL.iter().map(|a| a.cli_name()).collect()
}

// =============================================================================
// Streaming Hasher - Unified interface for incremental hashing
// =============================================================================

/// A unified streaming hasher: `new` begins, `update` feeds chunks,
/// `finalize` finishes into lowercase hex
/// Note: Blake3Hasher is boxed because it's ~1920 bytes, while other variants are ~20-600 bytes
pub enum StreamingHasher {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
    Blake3(Box<Blake3Hasher>),
    Blake2(Blake2b512),
    Xxh3(Xxh3),
    Xxh64(Xxh64),
    Crc32(Crc32Hasher),
}

impl StreamingHasher {
    /// Create a new streaming hasher for the specified algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => StreamingHasher::Md5(Md5::new()),
            HashAlgorithm::Sha1 => StreamingHasher::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => StreamingHasher::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => StreamingHasher::Sha512(Sha512::new()),
            HashAlgorithm::Blake3 => StreamingHasher::Blake3(Box::new(Blake3Hasher::new())),
            HashAlgorithm::Blake2 => StreamingHasher::Blake2(Blake2b512::new()),
            HashAlgorithm::Xxh3 => StreamingHasher::Xxh3(Xxh3::new()),
            HashAlgorithm::Xxh64 => StreamingHasher::Xxh64(Xxh64::new(0)),
            HashAlgorithm::Crc32 => StreamingHasher::Crc32(Crc32Hasher::new()),
        }
    }

    /// Update the hash with more data
    pub fn update(&mut self, data: &[u8]) {
        match self {
            StreamingHasher::Md5(h) => Digest::update(h, data),
            StreamingHasher::Sha1(h) => Digest::update(h, data),
            StreamingHasher::Sha256(h) => Digest::update(h, data),
            StreamingHasher::Sha512(h) => Digest::update(h, data),
            StreamingHasher::Blake3(h) => { h.update(data); }
            StreamingHasher::Blake2(h) => Digest::update(h, data),
            StreamingHasher::Xxh3(h) => h.update(data),
            StreamingHasher::Xxh64(h) => h.update(data),
            StreamingHasher::Crc32(h) => h.update(data),
        }
    }

    /// Update with parallel hashing (only effective for BLAKE3)
    /// Falls back to regular update for other algorithms
    pub fn update_parallel(&mut self, data: &[u8]) {
        match self {
            StreamingHasher::Blake3(h) => { h.update_rayon(data); }
            _ => self.update(data),
        }
    }

    /// Finalize and return the hash as a hex string
    pub fn finalize(self) -> String {
        match self {
            StreamingHasher::Md5(h) => hex::encode(h.finalize()),
            StreamingHasher::Sha1(h) => hex::encode(h.finalize()),
            StreamingHasher::Sha256(h) => hex::encode(h.finalize()),
            StreamingHasher::Sha512(h) => hex::encode(h.finalize()),
            StreamingHasher::Blake3(h) => h.finalize().to_hex().to_string(),
            StreamingHasher::Blake2(h) => hex::encode(h.finalize()),
            StreamingHasher::Xxh3(h) => format!("{:032x}", h.digest128()),
            StreamingHasher::Xxh64(h) => format!("{:016x}", h.digest()),
            StreamingHasher::Crc32(h) => format!("{:08x}", h.finalize()),
        }
    }
}

/// Compute hash of in-memory data (one-shot)
pub fn compute_hash(data: &[u8], algorithm: HashAlgorithm) -> String {
    let mut hasher = StreamingHasher::new(algorithm);
    hasher.update(data);
    hasher.finalize()
}

// =============================================================================
// Range Hashing
// =============================================================================

/// Hash exactly the bytes of `range`
///
/// Fails if the handle ends before `range.end`.
#[instrument(skip(reader), fields(start = range.start, end = range.end))]
pub fn hash_range<R: Read + Seek>(
    reader: &mut R,
    range: ByteRange,
    algorithm: HashAlgorithm,
) -> SumResult<String> {
    reader.seek(SeekFrom::Start(range.start))?;
    let expected = range.len();
    let mut payload = BufReader::with_capacity(BUFFER_SIZE, Read::take(reader, expected));
    let mut hasher = StreamingHasher::new(algorithm);
    let mut hashed = 0u64;

    loop {
        let buf = payload.fill_buf()?;
        let len = buf.len();
        if len == 0 {
            break;
        }
        hasher.update_parallel(buf);
        payload.consume(len);
        hashed += len as u64;
    }

    if hashed != expected {
        return Err(SumError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("payload ended after {} of {} bytes", hashed, expected),
        )));
    }

    let hash = hasher.finalize();
    debug!(algorithm = algorithm.name(), hashed, hash = %hash, "Range hash complete");
    Ok(hash)
}

/// Hash the leading `percent` of `range`; `None` when percent is 0
pub fn hash_range_percent<R: Read + Seek>(
    reader: &mut R,
    range: ByteRange,
    algorithm: HashAlgorithm,
    percent: u8,
) -> SumResult<Option<String>> {
    if percent == 0 {
        return Ok(None);
    }
    hash_range(reader, range.leading_percent(percent), algorithm).map(Some)
}
