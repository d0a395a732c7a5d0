//! Output → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one summary line, followed by the document or table
//! - **JSON** (`--json`): `serde_json::to_string_pretty` of the output

use serde_json::json;
use tcestore_executor::{Error, IndexRow, Output};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format an error with its status code.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&json!({
            "status": err.status_code(),
            "error": err.to_string(),
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Human => format!("(error {}) {}", err.status_code(), err),
    }
}

fn format_json(output: &Output) -> String {
    let body = json!({
        "status": output.status_code(),
        "message": output.message(),
        "result": output,
    });
    serde_json::to_string_pretty(&body).unwrap_or_else(|e| format!("(error) {}", e))
}

fn format_human(output: &Output) -> String {
    match output {
        Output::Saved { path, .. } => format!("{}\n{}", output.message(), path.display()),
        Output::Snapshot { document, .. } => {
            let pretty = serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string());
            format!("{}\n{}", output.message(), pretty)
        }
        Output::Versions { versions, .. } => {
            let list: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
            format!("{}\n{}", output.message(), list.join("\n"))
        }
        Output::Records(rows) if rows.is_empty() => "(empty list)".to_string(),
        Output::Records(rows) => format_rows(rows),
        _ => output.message(),
    }
}

fn format_rows(rows: &[IndexRow]) -> String {
    let dash = "-";
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            format!(
                "{}) {}  v{}  {}  {}  {}  updated {}",
                i + 1,
                row.record_key,
                row.latest_version,
                row.intern_name.as_deref().unwrap_or(dash),
                row.registration_number.as_deref().unwrap_or(dash),
                row.company_name.as_deref().unwrap_or(dash),
                row.updated_at.to_rfc3339(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
