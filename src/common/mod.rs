// Common utilities shared by the tag probes and the digest stage

pub mod hash;
pub mod binary;

// Re-exports for convenience
pub use hash::{HashAlgorithm, StreamingHasher, compute_hash, hash_range, hash_range_percent};
pub use binary::{read_array_at, read_bytes_at, signature_at, stream_len};

// Shared constants
pub const BUFFER_SIZE: usize = 256 * 1024; // 256KB read buffer for digesting
