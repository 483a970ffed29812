//! Per-file result lines
//!
//! Text lines keep the historical audiosum layout:
//!
//! ```text
//! 0000000a 7d1c3f0e... [I3v1] [I3v2] [----] [----] path/to/song.mp3
//! 0000000a  [I3v1] [I3v2] [----] [----] path/to/song.mp3
//! ```
//!
//! The second form is brief mode. The path is written as the exact bytes
//! read from the input.
//!
//! JSON lines carry the same information as one object per file.

use serde::Serialize;
use std::io::Write;

use crate::common::hash::HashAlgorithm;
use crate::error::SumResult;
use crate::tags::{Boundaries, ProbeOutcome, TagKind};

/// How result lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Outcome of every probe, keyed by tag name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TagSummary {
    pub id3v1: ProbeOutcome,
    pub id3v2: ProbeOutcome,
    pub lyrics3v1: ProbeOutcome,
    pub lyrics3v2: ProbeOutcome,
}

impl From<&Boundaries> for TagSummary {
    fn from(boundaries: &Boundaries) -> Self {
        let mut summary = Self::default();
        for (tag, outcome) in boundaries.outcomes() {
            match tag {
                TagKind::Id3v1 => summary.id3v1 = outcome,
                TagKind::Id3v2 => summary.id3v2 = outcome,
                TagKind::Lyrics3v1 => summary.lyrics3v1 = outcome,
                TagKind::Lyrics3v2 => summary.lyrics3v2 = outcome,
            }
        }
        summary
    }
}

/// Everything printed for one successfully processed file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Lossy UTF-8 form of the name, used in JSON
    pub path: String,
    pub start: u64,
    pub end: u64,
    pub length: u64,
    /// Algorithm used, absent in brief mode
    pub algorithm: Option<HashAlgorithm>,
    pub digest: Option<String>,
    pub tags: TagSummary,
    /// Name exactly as read from the input
    #[serde(skip)]
    raw_path: Vec<u8>,
    #[serde(skip)]
    codes: [&'static str; 4],
}

impl FileReport {
    pub fn new(
        path: impl Into<Vec<u8>>,
        boundaries: &Boundaries,
        algorithm: HashAlgorithm,
        digest: Option<String>,
    ) -> Self {
        let raw_path = path.into();
        let range = boundaries.range;
        Self {
            path: String::from_utf8_lossy(&raw_path).into_owned(),
            start: range.start,
            end: range.end,
            length: range.len(),
            algorithm: digest.as_ref().map(|_| algorithm),
            digest,
            tags: TagSummary::from(boundaries),
            raw_path,
            codes: boundaries.codes(),
        }
    }

    /// Historical text line, path bytes copied verbatim
    ///
    /// Brief lines keep the doubled space the digest would have filled.
    pub fn to_line(&self) -> Vec<u8> {
        let mut line = format!("{:08x} ", self.length);
        if let Some(digest) = &self.digest {
            line.push_str(digest);
        }
        for code in self.codes {
            line.push_str(" [");
            line.push_str(code);
            line.push(']');
        }
        line.push(' ');
        let mut line = line.into_bytes();
        line.extend_from_slice(&self.raw_path);
        line
    }

    /// One JSON object on a single line
    pub fn to_json(&self) -> SumResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> SumResult<Vec<u8>> {
        match format {
            OutputFormat::Text => Ok(self.to_line()),
            OutputFormat::Json => Ok(self.to_json()?.into_bytes()),
        }
    }

    /// Write the rendered line and its newline
    pub fn write_line<W: Write>(&self, out: &mut W, format: OutputFormat) -> SumResult<()> {
        let mut line = self.render(format)?;
        line.push(b'\n');
        out.write_all(&line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{resolve_stream, ByteRange};
    use std::io::Cursor;

    fn text(report: &FileReport) -> String {
        String::from_utf8(report.to_line()).unwrap()
    }

    fn tagged_boundaries() -> Boundaries {
        let mut data = b"ID3\x03\x00\x00\x00\x00\x00\x0A".to_vec();
        data.extend_from_slice(&[0u8; 10]);
        data.extend_from_slice(b"HELLOAUDIO");
        let mut tag = b"TAG".to_vec();
        tag.resize(128, 0);
        data.extend(tag);
        resolve_stream(&mut Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_text_line() {
        let boundaries = tagged_boundaries();
        assert_eq!(boundaries.range, ByteRange::new(20, 30));
        let report = FileReport::new(
            "music/a b.mp3",
            &boundaries,
            HashAlgorithm::Crc32,
            Some("deadbeef".to_string()),
        );
        assert_eq!(
            text(&report),
            "0000000a deadbeef [I3v1] [I3v2] [----] [----] music/a b.mp3"
        );
    }

    #[test]
    fn test_brief_line() {
        let report = FileReport::new("x.mp3", &tagged_boundaries(), HashAlgorithm::Md5, None);
        assert_eq!(text(&report), "0000000a  [I3v1] [I3v2] [----] [----] x.mp3");
        assert_eq!(report.algorithm, None);
    }

    #[test]
    fn test_json_line() {
        let report = FileReport::new(
            "x.mp3",
            &tagged_boundaries(),
            HashAlgorithm::Md5,
            Some("00".to_string()),
        );
        let json = String::from_utf8(report.render(OutputFormat::Json).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["path"], "x.mp3");
        assert_eq!(value["start"], 20);
        assert_eq!(value["length"], 10);
        assert_eq!(value["algorithm"], "md5");
        assert_eq!(value["tags"]["id3v1"], "present");
        assert_eq!(value["tags"]["lyrics3v2"], "absent");
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_raw_path_kept_in_text_line() {
        let raw = b"music/Caf\xe9.mp3".to_vec();
        let report = FileReport::new(raw.clone(), &tagged_boundaries(), HashAlgorithm::Md5, None);
        assert!(report.to_line().ends_with(&raw));
        assert_eq!(report.path, "music/Caf\u{FFFD}.mp3");

        let mut out = Vec::new();
        report.write_line(&mut out, OutputFormat::Text).unwrap();
        let mut expected = b"0000000a  [I3v1] [I3v2] [----] [----] ".to_vec();
        expected.extend_from_slice(&raw);
        expected.push(b'\n');
        assert_eq!(out, expected);
    }
}
