//! Tag probes
//!
//! Each probe takes the current payload range and returns the range with its
//! container excluded. Probes never touch bytes outside the file and only
//! fail on unreadable windows or inconsistent trailers.

use std::io::{self, Read, Seek};
use tracing::{debug, trace};

use super::types::*;
use crate::common::binary::{
    find_signature, parse_ascii_decimal, read_array_at, read_bytes_at, signature_at,
};
use crate::error::{SumError, SumResult};

// =============================================================================
// ID3v1 - 128-byte trailer starting with "TAG"
// =============================================================================

/// Probe for an ID3v1 tag in the last 128 bytes of the range
///
/// A range shorter than the tag cannot be probed and is an I/O failure.
pub fn probe_id3v1<R: Read + Seek>(reader: &mut R, range: ByteRange) -> SumResult<Probe> {
    let tag = TagKind::Id3v1;
    let offset = range.back_from_end(ID3V1_TAG_SIZE).ok_or_else(|| {
        SumError::tag_io(
            tag,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} bytes cannot hold a {}-byte tag", range.len(), ID3V1_TAG_SIZE),
            ),
        )
    })?;

    let found = signature_at(reader, offset, ID3V1_SIGNATURE)
        .map_err(|e| SumError::tag_io(tag, e))?;
    if !found {
        trace!(offset, "No ID3v1 signature");
        return Ok(Probe::absent(range));
    }

    debug!(offset, "ID3v1 tag found");
    Ok(Probe::present(ByteRange::new(range.start, offset), ProbeOutcome::Present))
}

// =============================================================================
// ID3v2 - variable-size header at the start of the payload
// =============================================================================

/// Probe for an ID3v2 header at the range start
pub fn probe_id3v2<R: Read + Seek>(reader: &mut R, range: ByteRange) -> SumResult<Probe> {
    let tag = TagKind::Id3v2;
    if range.len() < ID3V2_HEADER_SIZE {
        return Ok(Probe::absent(range));
    }

    let raw: [u8; 10] = read_array_at(reader, range.start)
        .map_err(|e| SumError::tag_io(tag, e))?;
    let header = match Id3v2Header::parse(&raw) {
        Some(header) => header,
        None => {
            trace!(offset = range.start, "No valid ID3v2 header");
            return Ok(Probe::absent(range));
        }
    };

    let size = header.tag_size();
    let start = range
        .start
        .checked_add(size)
        .filter(|&start| start <= range.end)
        .ok_or_else(|| {
            SumError::malformed(
                tag,
                format!("{}-byte tag runs past payload end at {}", size, range.end),
            )
        })?;

    debug!(
        version = ?header.version,
        footer = header.has_footer(),
        size,
        "ID3v2 tag found"
    );
    Ok(Probe::present(ByteRange::new(start, range.end), ProbeOutcome::Present))
}

// =============================================================================
// Lyrics3 v1 - "LYRICSBEGIN" ... "LYRICSEND", at most 5100 bytes of lyrics
// =============================================================================

/// Probe for a Lyrics3v1 block ending at the range end
pub fn probe_lyrics3v1<R: Read + Seek>(reader: &mut R, range: ByteRange) -> SumResult<Probe> {
    let tag = TagKind::Lyrics3v1;
    let Some(end_offset) = range.back_from_end(LYRICS3V1_END.len() as u64) else {
        return Ok(Probe::absent(range));
    };
    let found = signature_at(reader, end_offset, LYRICS3V1_END)
        .map_err(|e| SumError::tag_io(tag, e))?;
    if !found {
        trace!(offset = end_offset, "No LYRICSEND signature");
        return Ok(Probe::absent(range));
    }

    // Search window never reaches before the payload start
    let window_start = range.end.saturating_sub(LYRICS3V1_MAX_BLOCK).max(range.start);
    let window = read_bytes_at(reader, window_start, (range.end - window_start) as usize)
        .map_err(|e| SumError::tag_io(tag, e))?;

    let pos = find_signature(&window, LYRICS_BEGIN)
        .ok_or_else(|| SumError::malformed(tag, "LYRICSEND without LYRICSBEGIN"))?;

    let begin = window_start + pos as u64;
    debug!(begin, length = range.end - begin, "Lyrics3v1 block found");
    Ok(Probe::present(ByteRange::new(range.start, begin), ProbeOutcome::Present))
}

// =============================================================================
// Lyrics3 v2 - "LYRICSBEGIN" ... <6-digit size> "LYRICS200"
// =============================================================================

/// Probe for a Lyrics3v2 block ending at the range end
///
/// The size field is tried first as the distance from LYRICSBEGIN to the
/// size digits, then as the distance from LYRICSBEGIN to the range end.
/// Taggers disagree on which one they write; the second reports
/// `PresentAlternateSizing`.
pub fn probe_lyrics3v2<R: Read + Seek>(reader: &mut R, range: ByteRange) -> SumResult<Probe> {
    let tag = TagKind::Lyrics3v2;
    let Some(end_offset) = range.back_from_end(LYRICS3V2_END.len() as u64) else {
        return Ok(Probe::absent(range));
    };
    let found = signature_at(reader, end_offset, LYRICS3V2_END)
        .map_err(|e| SumError::tag_io(tag, e))?;
    if !found {
        trace!(offset = end_offset, "No LYRICS200 signature");
        return Ok(Probe::absent(range));
    }

    let size_offset = range
        .back_from_end(LYRICS3V2_TRAILER)
        .ok_or_else(|| SumError::malformed(tag, "LYRICS200 without a size field"))?;
    let digits: [u8; 6] = read_array_at(reader, size_offset)
        .map_err(|e| SumError::tag_io(tag, e))?;
    let size = parse_ascii_decimal(&digits).ok_or_else(|| {
        SumError::malformed(
            tag,
            format!("size field {:?} is not decimal", String::from_utf8_lossy(&digits)),
        )
    })?;

    let primary = size
        .checked_add(LYRICS3V2_TRAILER)
        .and_then(|distance| range.back_from_end(distance));
    if let Some(begin) = primary {
        if lyrics_begin_at(reader, range, begin)? {
            debug!(begin, size, "Lyrics3v2 block found");
            return Ok(Probe::present(ByteRange::new(range.start, begin), ProbeOutcome::Present));
        }
    }

    if let Some(begin) = range.back_from_end(size) {
        if lyrics_begin_at(reader, range, begin)? {
            debug!(begin, size, "Lyrics3v2 block found, size includes trailer");
            return Ok(Probe::present(
                ByteRange::new(range.start, begin),
                ProbeOutcome::PresentAlternateSizing,
            ));
        }
    }

    Err(SumError::malformed(
        tag,
        format!("LYRICS200 with size {} has no matching LYRICSBEGIN", size),
    ))
}

/// Whether LYRICSBEGIN starts at `offset` and fits inside the range
fn lyrics_begin_at<R: Read + Seek>(
    reader: &mut R,
    range: ByteRange,
    offset: u64,
) -> SumResult<bool> {
    if offset + LYRICS_BEGIN.len() as u64 > range.end {
        return Ok(false);
    }
    signature_at(reader, offset, LYRICS_BEGIN).map_err(|e| SumError::tag_io(TagKind::Lyrics3v2, e))
}
