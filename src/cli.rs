//! Command-line interface
//!
//! Options are parsed with clap; the algorithm name is validated here so an
//! unsupported one stops the run before any input is read.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io::{self, Write};

use crate::common::hash::HashAlgorithm;
use crate::error::SumResult;
use crate::report::OutputFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

const LONG_ABOUT: &str = "\
Reads a sequence of file names from stdin (one per line, normally MP3 files)
and prints one line per file to stdout:

  : Payload size, in hex format (%08x).
  : Digest of the file without ID3 or Lyrics3 sections, in hex format.
  : Whether each signature was found: [I3v1] [I3v2] [L3v1] [L3v2],
    [l3v2] when the Lyrics3v2 size field counted its own trailer,
    [----] when absent.
  : Complete file name.

Sections ignored: ID3v1.x, ID3v2.x, Lyrics3 v1, Lyrics3 v2.00.

Files that cannot be opened or carry inconsistent tags are reported on
stderr and skipped.";

/// Runtime configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub algorithm: HashAlgorithm,
    /// Share of the payload to digest, 0 skips digesting
    pub percent: u8,
    /// Worker threads; 1 is serial, 0 lets rayon pick
    pub jobs: usize,
    pub format: OutputFormat,
    pub verbosity: u8,
    pub list_algorithms: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Md5,
            percent: 100,
            jobs: 1,
            format: OutputFormat::Text,
            verbosity: 0,
            list_algorithms: false,
        }
    }
}

impl AppConfig {
    #[inline]
    pub fn is_parallel(&self) -> bool {
        self.jobs != 1
    }
}

/// Argument definitions
pub fn build_command() -> Command {
    Command::new("audiosum")
        .version(VERSION)
        .about(DESCRIPTION)
        .long_about(LONG_ABOUT)
        .arg(
            Arg::new("algorithm")
                .long("algorithm")
                .short('a')
                .value_name("NAME")
                .env("AUDIOSUM_ALGORITHM")
                .default_value("md5")
                .help("Digest algorithm (see --list-algorithms)"),
        )
        .arg(
            Arg::new("percent")
                .long("percent")
                .short('p')
                .value_name("0-100")
                .value_parser(value_parser!(u8).range(0..=100))
                .default_value("100")
                .help("Digest only the first PERCENT of each payload"),
        )
        .arg(
            Arg::new("brief")
                .long("brief")
                .short('b')
                .action(ArgAction::SetTrue)
                .help("Brief: only print size of files"),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .short('j')
                .value_name("N")
                .env("AUDIOSUM_JOBS")
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Files processed in parallel (0 = one per CPU)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print one JSON object per file"),
        )
        .arg(
            Arg::new("list-algorithms")
                .long("list-algorithms")
                .short('l')
                .action(ArgAction::SetTrue)
                .help("List supported digest algorithms and exit"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("More log output on stderr (repeat for more)"),
        )
}

/// Build the configuration from parsed arguments
pub fn config_from_matches(matches: &ArgMatches) -> SumResult<AppConfig> {
    let algorithm = matches
        .get_one::<String>("algorithm")
        .map(|name| name.parse::<HashAlgorithm>())
        .transpose()?
        .unwrap_or(HashAlgorithm::Md5);

    let percent = if matches.get_flag("brief") {
        0
    } else {
        matches.get_one::<u8>("percent").copied().unwrap_or(100)
    };

    let format = if matches.get_flag("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    Ok(AppConfig {
        algorithm,
        percent,
        jobs: matches.get_one::<usize>("jobs").copied().unwrap_or(1),
        format,
        verbosity: matches.get_count("verbose"),
        list_algorithms: matches.get_flag("list-algorithms"),
    })
}

/// Parse the process arguments
///
/// clap exits on its own for malformed options and `--help`.
pub fn parse_args() -> SumResult<AppConfig> {
    config_from_matches(&build_command().get_matches())
}

/// Print the algorithm table for `--list-algorithms`
pub fn print_algorithms<W: Write>(out: &mut W) -> io::Result<()> {
    for algorithm in HashAlgorithm::ALL {
        writeln!(
            out,
            "{:<8} {:<8} {:>3} hex digits",
            algorithm.cli_name(),
            algorithm.name(),
            algorithm.hash_length()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SumError;

    fn config(args: &[&str]) -> SumResult<AppConfig> {
        let matches = build_command()
            .try_get_matches_from(std::iter::once("audiosum").chain(args.iter().copied()))
            .unwrap();
        config_from_matches(&matches)
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.percent, 100);
        assert_eq!(config.jobs, 1);
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.algorithm, HashAlgorithm::Md5);
        assert!(!config.is_parallel());
        assert!(!config.list_algorithms);
    }

    #[test]
    fn test_brief_overrides_percent() {
        let config = config(&["-b", "-p", "40"]).unwrap();
        assert_eq!(config.percent, 0);
    }

    #[test]
    fn test_options() {
        let config = config(&["-a", "SHA-256", "-p", "25", "-j", "4", "--json", "-vv"]).unwrap();
        assert_eq!(config.algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.percent, 25);
        assert_eq!(config.jobs, 4);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.verbosity, 2);
    }

    #[test]
    fn test_unsupported_algorithm() {
        let err = config(&["--algorithm", "whirlpool"]).unwrap_err();
        assert!(matches!(err, SumError::UnsupportedAlgorithm(ref name) if name == "whirlpool"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_percent_out_of_range_rejected() {
        let result = build_command().try_get_matches_from(["audiosum", "-p", "101"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_print_algorithms() {
        let mut out = Vec::new();
        print_algorithms(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), HashAlgorithm::ALL.len());
        assert!(text.lines().next().unwrap().starts_with("md5"));
    }
}
