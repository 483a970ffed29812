//! Batch processing of file names read from an input stream
//!
//! Each name is handled independently: open, resolve boundaries, digest,
//! render one line. A file that fails is reported on the diagnostic stream
//! and skipped; only failures writing the result stream stop the batch.

use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info, instrument, trace};

use crate::cli::AppConfig;
use crate::common::hash::hash_range_percent;
use crate::error::{SumError, SumResult};
use crate::report::FileReport;
use crate::tags;

/// Counts for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub processed: usize,
    pub failed: usize,
}

/// One input line: the path to open and the name to print
#[derive(Debug, Clone)]
pub struct InputName {
    pub path: PathBuf,
    /// Name bytes exactly as read, printed on result lines
    pub bytes: Vec<u8>,
    /// Lossy form for diagnostics and logs
    pub display: String,
}

impl InputName {
    /// Strip the trailing `\n`
    ///
    /// On Windows a `\r` before it is dropped too; elsewhere it is a legal
    /// file name byte.
    pub fn from_line(mut line: Vec<u8>) -> Option<Self> {
        if line.last() == Some(&b'\n') {
            line.pop();
            if cfg!(windows) && line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        if line.is_empty() {
            return None;
        }
        let display = String::from_utf8_lossy(&line).into_owned();
        Some(Self { path: bytes_to_path(line.clone()), bytes: line, display })
    }
}

#[cfg(unix)]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// Resolve and digest a single file
///
/// The file handle is dropped on every return path.
#[instrument(skip_all, fields(path = %name.display))]
pub fn process_file(name: &InputName, config: &AppConfig) -> SumResult<FileReport> {
    let mut file = File::open(&name.path)?;
    let boundaries = tags::resolve_stream(&mut file)?;
    let digest = hash_range_percent(&mut file, boundaries.range, config.algorithm, config.percent)?;
    Ok(FileReport::new(name.bytes.clone(), &boundaries, config.algorithm, digest))
}

/// Diagnostic line for a skipped file
fn describe_failure(name: &InputName, error: &SumError) -> String {
    match error {
        SumError::Io(e) => format!("ERROR:{}: {}", name.display, e),
        _ => format!("ERROR:Unexpected, {}: {}", name.display, error),
    }
}

/// Read every input name, process each file and write one line per success
pub fn run_batch<R, W, E>(
    input: R,
    output: &mut W,
    errors: &mut E,
    config: &AppConfig,
) -> SumResult<BatchStats>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    if config.is_parallel() {
        run_parallel(input, output, errors, config)
    } else {
        run_serial(input, output, errors, config)
    }
}

/// Write one outcome and update the counters
fn emit<W: Write, E: Write>(
    name: &InputName,
    result: SumResult<FileReport>,
    output: &mut W,
    errors: &mut E,
    config: &AppConfig,
    stats: &mut BatchStats,
) -> SumResult<()> {
    match result {
        Ok(report) => {
            report.write_line(output, config.format)?;
            stats.processed += 1;
        }
        Err(e) => {
            debug!(path = %name.display, tag = ?e.tag(), error = %e, "Skipping file");
            writeln!(errors, "{}", describe_failure(name, &e))?;
            stats.failed += 1;
        }
    }
    Ok(())
}

/// Next name from the input, skipping blank lines
fn next_name<R: BufRead>(input: &mut R) -> io::Result<Option<Option<InputName>>> {
    let mut line = Vec::new();
    if input.read_until(b'\n', &mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(InputName::from_line(line)))
}

/// One file at a time, each line written as soon as it is ready
fn run_serial<R, W, E>(
    mut input: R,
    output: &mut W,
    errors: &mut E,
    config: &AppConfig,
) -> SumResult<BatchStats>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut stats = BatchStats::default();
    while let Some(name) = next_name(&mut input)? {
        let Some(name) = name else {
            trace!("Skipping blank input line");
            continue;
        };
        let result = process_file(&name, config);
        emit(&name, result, output, errors, config, &mut stats)?;
    }
    output.flush()?;
    info!(processed = stats.processed, failed = stats.failed, "Batch complete");
    Ok(stats)
}

/// All names read up front, files spread over a rayon pool,
/// lines written in input order
fn run_parallel<R, W, E>(
    mut input: R,
    output: &mut W,
    errors: &mut E,
    config: &AppConfig,
) -> SumResult<BatchStats>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut names = Vec::new();
    while let Some(name) = next_name(&mut input)? {
        names.extend(name);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
        .map_err(|e| SumError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))?;
    debug!(files = names.len(), threads = pool.current_num_threads(), "Processing in parallel");

    let results: Vec<SumResult<FileReport>> = pool.install(|| {
        names
            .par_iter()
            .map(|name| process_file(name, config))
            .collect()
    });

    let mut stats = BatchStats::default();
    for (name, result) in names.iter().zip(results) {
        emit(name, result, output, errors, config, &mut stats)?;
    }
    output.flush()?;
    info!(processed = stats.processed, failed = stats.failed, "Batch complete");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::hash::{compute_hash, HashAlgorithm};
    use crate::report::OutputFormat;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn id3v1_tag() -> Vec<u8> {
        let mut tag = b"TAG".to_vec();
        tag.resize(128, 0);
        tag
    }

    fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn run(input: String, config: &AppConfig) -> (BatchStats, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let stats = run_batch(Cursor::new(input), &mut out, &mut err, config).unwrap();
        (
            stats,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_input_name_from_line() {
        let name = InputName::from_line(b"song.mp3\n".to_vec()).unwrap();
        assert_eq!(name.display, "song.mp3");
        assert_eq!(name.bytes, b"song.mp3");
        assert_eq!(name.path, PathBuf::from("song.mp3"));
        assert!(InputName::from_line(b"\n".to_vec()).is_none());
        let name = InputName::from_line(b"last line".to_vec()).unwrap();
        assert_eq!(name.display, "last line");
    }

    #[cfg(unix)]
    #[test]
    fn test_carriage_return_is_part_of_name() {
        let name = InputName::from_line(b"song.mp3\r\n".to_vec()).unwrap();
        assert_eq!(name.bytes, b"song.mp3\r");
        assert_eq!(name.path, PathBuf::from("song.mp3\r"));
    }

    #[cfg(windows)]
    #[test]
    fn test_crlf_input() {
        let name = InputName::from_line(b"song.mp3\r\n".to_vec()).unwrap();
        assert_eq!(name.bytes, b"song.mp3");
    }

    // Some unix filesystems refuse names that are not valid UTF-8
    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_printed_verbatim() {
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let file_name = std::ffi::OsStr::from_bytes(b"Caf\xe9.mp3");
        let path = dir.path().join(file_name);
        std::fs::write(&path, vec![0x42u8; 200]).unwrap();

        let mut input = path.as_os_str().as_bytes().to_vec();
        input.push(b'\n');
        let config = AppConfig { percent: 0, ..AppConfig::default() };
        let mut out = Vec::new();
        let mut err = Vec::new();
        let stats = run_batch(Cursor::new(input.clone()), &mut out, &mut err, &config).unwrap();

        assert_eq!(stats.processed, 1);
        let mut expected = b"000000c8  [----] [----] [----] [----] ".to_vec();
        expected.extend_from_slice(&input);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_serial_batch() {
        let dir = TempDir::new().unwrap();
        let payload = vec![0x55u8; 300];
        let mut tagged = payload.clone();
        tagged.extend(id3v1_tag());
        let good = write_file(&dir, "good.mp3", &tagged);
        let mut broken = vec![0x55u8; 300];
        broken.extend_from_slice(b"LYRICSEND");
        let bad = write_file(&dir, "bad.mp3", &broken);
        let missing = dir.path().join("missing.mp3").to_string_lossy().into_owned();

        let input = format!("{}\n{}\n\n{}\n", good, bad, missing);
        let (stats, out, err) = run(input, &AppConfig::default());

        assert_eq!(stats, BatchStats { processed: 1, failed: 2 });
        let expected = format!(
            "0000012c {} [I3v1] [----] [----] [----] {}\n",
            compute_hash(&payload, HashAlgorithm::Md5),
            good
        );
        assert_eq!(out, expected);
        assert!(err.contains(&bad));
        assert!(err.contains("Lyrics3v1"));
        assert!(err.contains(&missing));
        assert_eq!(err.lines().count(), 2);
    }

    #[test]
    fn test_brief_batch() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.mp3", &id3v1_tag());
        let config = AppConfig { percent: 0, ..AppConfig::default() };
        let (_, out, _) = run(format!("{}\n", path), &config);
        assert_eq!(out, format!("00000000  [I3v1] [----] [----] [----] {}\n", path));
    }

    #[test]
    fn test_parallel_keeps_input_order() {
        let dir = TempDir::new().unwrap();
        let mut input = String::new();
        for i in 0..8 {
            let path = write_file(&dir, &format!("{}.mp3", i), &vec![i as u8 + 1; 200 + i]);
            input.push_str(&path);
            input.push('\n');
        }
        let config = AppConfig { jobs: 4, algorithm: HashAlgorithm::Crc32, ..AppConfig::default() };
        let (stats, out, _) = run(input.clone(), &config);
        let (_, serial_out, _) = run(input, &AppConfig { jobs: 1, ..config.clone() });

        assert_eq!(stats.processed, 8);
        assert_eq!(out, serial_out);
        let sizes: Vec<&str> = out.lines().map(|l| &l[..8]).collect();
        assert_eq!(sizes[0], "000000c8");
        assert_eq!(sizes[7], "000000cf");
    }

    #[test]
    fn test_json_batch() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.mp3", &vec![0x33u8; 256]);
        let config = AppConfig { format: OutputFormat::Json, ..AppConfig::default() };
        let (_, out, _) = run(format!("{}\n", path), &config);
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["length"], 256);
        assert_eq!(value["path"], path.as_str());
    }
}
