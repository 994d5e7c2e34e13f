//! Output formatting for reports

use ckia_core::{CheckFailure, CkiaError, Report, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Format a report as JSON indented with four spaces
pub fn format_json(report: &Report) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| CkiaError::Serialization(e.to_string()))
}

/// Write the report to `path`, or to stdout when no path is given
pub fn write_report(report: &Report, path: Option<&Path>) -> Result<()> {
    let mut json = format_json(report)?;
    json.push('\n');

    match path {
        Some(path) => std::fs::write(path, json)?,
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(json.as_bytes())?;
            handle.flush()?;
        }
    }
    Ok(())
}

/// One line per failed check, for stderr
pub fn format_failures(failures: &[CheckFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }

    let mut output = format!("{} check(s) failed:\n", failures.len());
    for failure in failures {
        output.push_str(&format!("  {}\n", failure));
    }
    output
}
