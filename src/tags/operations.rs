//! Boundary resolution - runs every probe against one file

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, instrument};

use super::parser::{probe_id3v1, probe_id3v2, probe_lyrics3v1, probe_lyrics3v2};
use super::types::{Boundaries, ByteRange, Probe, TagKind};
use crate::common::binary::stream_len;
use crate::error::SumResult;

/// Run the probe for one tag kind against `range`
pub fn probe<R: Read + Seek>(reader: &mut R, tag: TagKind, range: ByteRange) -> SumResult<Probe> {
    match tag {
        TagKind::Id3v1 => probe_id3v1(reader, range),
        TagKind::Id3v2 => probe_id3v2(reader, range),
        TagKind::Lyrics3v1 => probe_lyrics3v1(reader, range),
        TagKind::Lyrics3v2 => probe_lyrics3v2(reader, range),
    }
}

/// Resolve the payload range of a stream of `len` bytes
///
/// Probes run in `TagKind::ORDER`, each seeing the range left by the ones
/// before it. The first failing probe aborts resolution.
#[instrument(skip(reader))]
pub fn resolve<R: Read + Seek>(reader: &mut R, len: u64) -> SumResult<Boundaries> {
    let mut boundaries = Boundaries::new(ByteRange::whole(len));
    for tag in TagKind::ORDER {
        let result = probe(reader, tag, boundaries.range)?;
        boundaries.record(tag, result);
    }
    debug!(
        start = boundaries.range.start,
        end = boundaries.range.end,
        codes = ?boundaries.codes(),
        "Payload resolved"
    );
    Ok(boundaries)
}

/// Resolve a stream, taking its length from the stream itself
pub fn resolve_stream<R: Read + Seek>(reader: &mut R) -> SumResult<Boundaries> {
    let len = stream_len(reader)?;
    resolve(reader, len)
}

/// Open `path` and resolve its payload range
pub fn resolve_file(path: &Path) -> SumResult<Boundaries> {
    let mut file = File::open(path)?;
    resolve_stream(&mut file)
}
