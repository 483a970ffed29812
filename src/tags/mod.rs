//! Tag boundary detection
//!
//! Finds the audio payload of a file by excluding legacy metadata containers
//! at either end:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ ID3v2 (optional, start of file)                              │
//! │  - "ID3", version (2), flags (1), synch-safe size (4)        │
//! │  - tag body, plus a 10-byte footer when flag 0x10 is set     │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Audio payload  <- the range that gets digested               │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Lyrics3v1: "LYRICSBEGIN" ... "LYRICSEND" (<= 5100 bytes)     │
//! │   or                                                         │
//! │ Lyrics3v2: "LYRICSBEGIN" ... size (6 digits) "LYRICS200"     │
//! ├──────────────────────────────────────────────────────────────┤
//! │ ID3v1 (optional, last 128 bytes): "TAG" ...                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Probes run in a fixed order (ID3v1, ID3v2, Lyrics3v1, Lyrics3v2). The
//! range is threaded from one probe to the next, so the Lyrics3 probes look
//! in front of an ID3v1 tag that has already been excluded.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let boundaries = tags::resolve_file(Path::new("song.mp3"))?;
//! println!("{:?} {:?}", boundaries.range, boundaries.codes());
//! ```

mod types;
mod parser;
mod operations;

// Re-export public types
pub use types::{Boundaries, ByteRange, Probe, ProbeOutcome, TagKind};

// Re-export public functions
pub use parser::{probe_id3v1, probe_id3v2, probe_lyrics3v1, probe_lyrics3v2};
pub use operations::{probe, resolve, resolve_file, resolve_stream};
