//! ArgMatches → Command conversion.

use std::io::Read;

use clap::ArgMatches;
use serde_json::Value;
use tcestore_executor::Command;

/// Translate a parsed subcommand into an executor command.
///
/// Returns an error message for unreadable input files.
pub fn matches_to_command(matches: &ArgMatches) -> Result<Command, String> {
    match matches.subcommand() {
        Some(("submit", sub)) => {
            let file = required(sub, "file")?;
            let document = read_json(file)?;
            Ok(match sub.get_one::<String>("key") {
                Some(key) => Command::SubmitKeyed {
                    key: key.clone(),
                    document,
                },
                None => Command::Submit { document },
            })
        }
        Some(("get", sub)) => {
            let key = required(sub, "key")?.to_string();
            Ok(match sub.get_one::<u32>("version") {
                Some(&version) => Command::GetVersion { key, version },
                None => Command::GetLatest { key },
            })
        }
        Some(("versions", sub)) => Ok(Command::ListVersions {
            key: required(sub, "key")?.to_string(),
        }),
        Some(("list", _)) => Ok(Command::ListRecords),
        Some(("delete", sub)) => Ok(Command::Delete {
            key: required(sub, "key")?.to_string(),
            credential: sub.get_one::<String>("credential").cloned(),
        }),
        Some(("repair", _)) => Ok(Command::Repair),
        Some((other, _)) => Err(format!("unknown command '{}'", other)),
        None => Err("no command given".to_string()),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument <{}>", name))
}

fn read_json(file: &str) -> Result<Value, String> {
    let text = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        buf
    } else {
        std::fs::read_to_string(file).map_err(|e| format!("failed to read '{}': {}", file, e))?
    };
    serde_json::from_str(&text).map_err(|e| format!("'{}' is not valid JSON: {}", file, e))
}
