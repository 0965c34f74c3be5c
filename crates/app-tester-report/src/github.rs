//! GitHub Actions helpers
//!
//! Step outputs and the job summary are files whose paths GitHub passes in
//! `GITHUB_OUTPUT` and `GITHUB_STEP_SUMMARY`. Outside of Actions both are
//! unset and the helpers do nothing.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::Result;

pub const OUTPUT_ENV: &str = "GITHUB_OUTPUT";
pub const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// Publish `name=value` as a step output. Returns whether it was written.
pub fn set_output(name: &str, value: &str) -> Result<bool> {
    match std::env::var_os(OUTPUT_ENV) {
        Some(path) => {
            write_output(Path::new(&path), name, value)?;
            Ok(true)
        }
        None => {
            debug!(name, "{OUTPUT_ENV} not set, output not published");
            Ok(false)
        }
    }
}

/// Append Markdown to the job summary. Returns whether it was written.
pub fn append_step_summary(content: &str) -> Result<bool> {
    match std::env::var_os(STEP_SUMMARY_ENV) {
        Some(path) => {
            append(Path::new(&path), content)?;
            Ok(true)
        }
        None => {
            debug!("{STEP_SUMMARY_ENV} not set, summary not written");
            Ok(false)
        }
    }
}

/// Append one output to an output file, using a heredoc for multiline values
pub fn write_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let entry = if value.contains('\n') {
        format!("{name}<<EOF\n{value}\nEOF\n")
    } else {
        format!("{name}={value}\n")
    };
    append(path, &entry)
}

fn append(path: &Path, content: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
