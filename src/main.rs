use std::io;
use std::process;

use audiosum::{batch, cli, logging};

/// Exit codes
mod exit_codes {
    /// Writing results or reading stdin failed
    pub const GENERAL_ERROR: i32 = 1;
    /// Bad configuration, nothing was processed
    pub const CONFIG_ERROR: i32 = 2;
}

fn main() {
    let config = match cli::parse_args() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("audiosum: {error}");
            process::exit(exit_codes::CONFIG_ERROR);
        }
    };

    // Control log level with -v or the RUST_LOG env var:
    //   RUST_LOG=audiosum=debug audiosum < list.txt
    logging::init(config.verbosity);

    if config.list_algorithms {
        if let Err(error) = cli::print_algorithms(&mut io::stdout().lock()) {
            eprintln!("audiosum: {error}");
            process::exit(exit_codes::GENERAL_ERROR);
        }
        return;
    }

    let stdin = io::stdin();
    let result = batch::run_batch(
        stdin.lock(),
        &mut io::stdout().lock(),
        &mut io::stderr(),
        &config,
    );

    if let Err(error) = result {
        eprintln!("audiosum: {error}");
        let code = if error.is_config_error() {
            exit_codes::CONFIG_ERROR
        } else {
            exit_codes::GENERAL_ERROR
        };
        process::exit(code);
    }
}
