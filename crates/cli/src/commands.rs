//! Clap command tree definition.

use clap::{value_parser, Arg, ArgAction, Command};

/// Default data directory when `--data-dir` is not given.
pub const DEFAULT_DATA_DIR: &str = ".tcestore";

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("tcestore")
        .about("Versioned JSON record store with a relational summary index")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Data directory (default: .tcestore)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("read-only")
                .long("read-only")
                .help("Open the store in read-only mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("fingerprint")
                .long("fingerprint")
                .help("Override the fingerprint strategy in tcestore.toml")
                .value_parser(["sha256", "exact"])
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(build_submit())
        .subcommand(build_get())
        .subcommand(build_versions())
        .subcommand(build_list())
        .subcommand(build_delete())
        .subcommand(build_repair())
}

fn key_arg() -> Arg {
    Arg::new("key").required(true).help("Record key (idUnico)")
}

fn build_submit() -> Command {
    Command::new("submit")
        .about("Store a JSON document as a new version unless unchanged")
        .arg(
            Arg::new("file")
                .required(true)
                .help("JSON file to submit, or - for stdin"),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .help("Store under this key instead of the document's idUnico"),
        )
}

fn build_get() -> Command {
    Command::new("get")
        .about("Print the latest (or a specific) version of a record")
        .arg(key_arg())
        .arg(
            Arg::new("version")
                .long("version")
                .help("Version number to read")
                .value_parser(value_parser!(u32).range(1..)),
        )
}

fn build_versions() -> Command {
    Command::new("versions")
        .about("List the stored versions of a record")
        .arg(key_arg())
}

fn build_list() -> Command {
    Command::new("list").about("List every record, ordered by intern name")
}

fn build_delete() -> Command {
    Command::new("delete")
        .about("Delete a record's whole history")
        .arg(key_arg())
        .arg(
            Arg::new("credential")
                .long("credential")
                .help("Delete credential (checked against TCESTORE_DELETE_SECRET)"),
        )
}

fn build_repair() -> Command {
    Command::new("repair").about("Rebuild the record index from the snapshot files")
}
