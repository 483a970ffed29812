//! Type definitions for tag boundary detection

use serde::Serialize;

use crate::common::binary::{decode_synchsafe, is_synchsafe};

// =============================================================================
// Core Constants
// =============================================================================

pub(crate) const ID3V1_TAG_SIZE: u64 = 128;
pub(crate) const ID3V1_SIGNATURE: &[u8; 3] = b"TAG";

pub(crate) const ID3V2_HEADER_SIZE: u64 = 10;
pub(crate) const ID3V2_FOOTER_SIZE: u64 = 10;
pub(crate) const ID3V2_SIGNATURE: &[u8; 3] = b"ID3";
pub(crate) const ID3V2_FLAG_FOOTER: u8 = 0x10;

pub(crate) const LYRICS_BEGIN: &[u8; 11] = b"LYRICSBEGIN";
pub(crate) const LYRICS3V1_END: &[u8; 9] = b"LYRICSEND";
/// 5100 bytes of lyrics at most, plus the end signature
pub(crate) const LYRICS3V1_MAX_BLOCK: u64 = 5100 + 9;
pub(crate) const LYRICS3V2_END: &[u8; 9] = b"LYRICS200";
pub(crate) const LYRICS3V2_SIZE_DIGITS: u64 = 6;
/// Size digits plus end signature
pub(crate) const LYRICS3V2_TRAILER: u64 = LYRICS3V2_SIZE_DIGITS + 9;

// =============================================================================
// Byte Range
// =============================================================================

/// Half-open `[start, end)` span of a file considered to be audio payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// The whole of a file of `len` bytes
    pub fn whole(len: u64) -> Self {
        Self::new(0, len)
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Offset `distance` bytes before `end`, if it still lies inside the range
    pub(crate) fn back_from_end(&self, distance: u64) -> Option<u64> {
        self.end
            .checked_sub(distance)
            .filter(|&offset| offset >= self.start)
    }

    /// Same start, covering only the first `percent` of the bytes
    pub fn leading_percent(&self, percent: u8) -> Self {
        let percent = u64::from(percent.min(100));
        // u128 keeps len * 100 from overflowing on huge ranges
        let len = (u128::from(self.len()) * u128::from(percent) / 100) as u64;
        Self::new(self.start, self.start + len)
    }
}

// =============================================================================
// Tag Kinds and Probe Outcomes
// =============================================================================

/// The four legacy containers recognized, in probing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Id3v1,
    Id3v2,
    Lyrics3v1,
    Lyrics3v2,
}

impl TagKind {
    /// Probing order; later end-side probes see the range already shrunk
    pub const ORDER: [TagKind; 4] = [
        TagKind::Id3v1,
        TagKind::Id3v2,
        TagKind::Lyrics3v1,
        TagKind::Lyrics3v2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TagKind::Id3v1 => "ID3v1",
            TagKind::Id3v2 => "ID3v2",
            TagKind::Lyrics3v1 => "Lyrics3v1",
            TagKind::Lyrics3v2 => "Lyrics3v2",
        }
    }

    /// Four-character code printed when the tag is present
    pub fn code(&self) -> &'static str {
        match self {
            TagKind::Id3v1 => "I3v1",
            TagKind::Id3v2 => "I3v2",
            TagKind::Lyrics3v1 => "L3v1",
            TagKind::Lyrics3v2 => "L3v2",
        }
    }

    fn index(&self) -> usize {
        match self {
            TagKind::Id3v1 => 0,
            TagKind::Id3v2 => 1,
            TagKind::Lyrics3v1 => 2,
            TagKind::Lyrics3v2 => 3,
        }
    }
}

/// Result of one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    #[default]
    Absent,
    Present,
    /// Lyrics3v2 only: the size field counted the LYRICSBEGIN signature
    PresentAlternateSizing,
}

impl ProbeOutcome {
    /// Four-character listing code for this outcome of `tag`
    pub fn code(&self, tag: TagKind) -> &'static str {
        match (self, tag) {
            (ProbeOutcome::Absent, _) => "----",
            (ProbeOutcome::Present, tag) => tag.code(),
            (ProbeOutcome::PresentAlternateSizing, TagKind::Lyrics3v2) => "l3v2",
            (ProbeOutcome::PresentAlternateSizing, tag) => tag.code(),
        }
    }
}

/// What a single probe hands back to the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub range: ByteRange,
    pub outcome: ProbeOutcome,
}

impl Probe {
    pub(crate) fn absent(range: ByteRange) -> Self {
        Self { range, outcome: ProbeOutcome::Absent }
    }

    pub(crate) fn present(range: ByteRange, outcome: ProbeOutcome) -> Self {
        Self { range, outcome }
    }
}

// =============================================================================
// Resolved Boundaries
// =============================================================================

/// Final payload range plus the outcome of every probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundaries {
    pub range: ByteRange,
    outcomes: [ProbeOutcome; 4],
}

impl Boundaries {
    pub(crate) fn new(range: ByteRange) -> Self {
        Self { range, outcomes: [ProbeOutcome::Absent; 4] }
    }

    pub(crate) fn record(&mut self, tag: TagKind, probe: Probe) {
        self.range = probe.range;
        self.outcomes[tag.index()] = probe.outcome;
    }

    pub fn outcome(&self, tag: TagKind) -> ProbeOutcome {
        self.outcomes[tag.index()]
    }

    /// (tag, outcome) pairs in probing order
    pub fn outcomes(&self) -> impl Iterator<Item = (TagKind, ProbeOutcome)> + '_ {
        TagKind::ORDER.iter().map(move |&tag| (tag, self.outcome(tag)))
    }

    /// Listing codes in probing order
    pub fn codes(&self) -> [&'static str; 4] {
        TagKind::ORDER.map(|tag| self.outcome(tag).code(tag))
    }
}

// =============================================================================
// ID3v2 Header
// =============================================================================

/// Fixed 10-byte ID3v2 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Id3v2Header {
    pub version: [u8; 2],
    pub flags: u8,
    pub size: [u8; 4],
}

impl Id3v2Header {
    /// Validate signature, version and synch-safe size bytes
    pub fn parse(raw: &[u8; 10]) -> Option<Self> {
        if &raw[..3] != ID3V2_SIGNATURE {
            return None;
        }
        let version = [raw[3], raw[4]];
        let flags = raw[5];
        let size = [raw[6], raw[7], raw[8], raw[9]];
        if version[0] == 0xFF || !is_synchsafe(&size) {
            return None;
        }
        Some(Self { version, flags, size })
    }

    pub fn has_footer(&self) -> bool {
        self.flags & ID3V2_FLAG_FOOTER != 0
    }

    /// Bytes occupied by the whole tag, header and footer included
    pub fn tag_size(&self) -> u64 {
        let mut size = decode_synchsafe(self.size) + ID3V2_HEADER_SIZE;
        if self.has_footer() {
            size += ID3V2_FOOTER_SIZE;
        }
        size
    }
}
