//! audiosum - checksums of audio files that ignore embedded tags
//!
//! Two files whose audio bytes match but whose ID3 or Lyrics3 sections differ
//! get the same digest. The tag boundaries are found by [`tags::resolve`]
//! and the remaining payload is hashed by [`common::hash::hash_range`].

pub mod batch;
pub mod cli;
pub mod common;
pub mod error;
pub mod logging;
pub mod report;
pub mod tags;

// Re-export core types
pub use batch::{process_file, run_batch, BatchStats, InputName};
pub use cli::AppConfig;
pub use common::hash::HashAlgorithm;
pub use error::{SumError, SumResult};
pub use report::{FileReport, OutputFormat};
pub use tags::{Boundaries, ByteRange, ProbeOutcome, TagKind};
