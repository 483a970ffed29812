// Shared binary reading utilities for tag probes
//
// All readers are generic over `Read + Seek` so probes work the same on a
// `File` and on an in-memory `Cursor`.

use std::io::{self, Read, Seek, SeekFrom};

// =============================================================================
// Read at Offset Functions (seek + read)
// =============================================================================

/// Total length of the stream, leaving the cursor at the end
pub fn stream_len<R: Seek>(reader: &mut R) -> io::Result<u64> {
    reader.seek(SeekFrom::End(0))
}

/// Read exact bytes at specific offset
pub fn read_bytes_at<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    length: usize,
) -> io::Result<Vec<u8>> {
    if length == 0 {
        return Ok(Vec::new());
    }
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; length];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read a fixed-size array at specific offset
pub fn read_array_at<R: Read + Seek, const N: usize>(
    reader: &mut R,
    offset: u64,
) -> io::Result<[u8; N]> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Check whether `signature` is stored verbatim at `offset`
pub fn signature_at<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    signature: &[u8],
) -> io::Result<bool> {
    let found = read_bytes_at(reader, offset, signature.len())?;
    Ok(found == signature)
}

// =============================================================================
// Buffer Utilities
// =============================================================================

/// Offset of the first occurrence of `needle` in `haystack`
pub fn find_signature(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Decode a synch-safe big-endian integer (7 significant bits per byte)
pub fn decode_synchsafe(bytes: [u8; 4]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 7) | u64::from(b & 0x7F))
}

/// Whether every byte leaves its top bit clear
pub fn is_synchsafe(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b < 0x80)
}

/// Parse a fixed-width field of ASCII digits as an unsigned decimal
///
/// Returns None on an empty field or any non-digit byte.
pub fn parse_ascii_decimal(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    bytes.iter().try_fold(0u64, |acc, &b| {
        if b.is_ascii_digit() {
            acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
        } else {
            None
        }
    })
}
