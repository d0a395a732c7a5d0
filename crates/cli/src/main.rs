//! tcestore CLI: one command per invocation.
//!
//! `tcestore [--data-dir DIR] [--json] [-v] COMMAND`
//!
//! Exit code 0 on success, 1 on any error. Errors go to stderr with their
//! HTTP-style status code.

mod commands;
mod format;
mod parse;

use std::process;

use tcestore_executor::{AccessMode, OpenOptions, TceStore};
use tracing::Level;

use commands::{build_cli, DEFAULT_DATA_DIR};
use format::{format_error, format_output, OutputMode};
use parse::matches_to_command;

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_count("verbose"));

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let command = match matches_to_command(&matches) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let store = match open_store(&matches) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    };

    let exit_code = match store.executor().execute(command) {
        Ok(output) => {
            println!("{}", format_output(&output, mode));
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    };

    if let Err(e) = store.shutdown() {
        eprintln!("{}", format_error(&e, mode));
    }
    process::exit(exit_code);
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .init();
}

fn open_store(matches: &clap::ArgMatches) -> tcestore_executor::Result<TceStore> {
    let path = matches
        .get_one::<String>("data-dir")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_DATA_DIR);

    let mut opts = OpenOptions::new();
    if matches.get_flag("read-only") {
        opts = opts.access_mode(AccessMode::ReadOnly);
    }
    if let Some(strategy) = matches.get_one::<String>("fingerprint") {
        opts = opts.fingerprint(strategy);
    }

    TceStore::open_with(path, opts)
}
