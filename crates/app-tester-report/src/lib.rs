//! App tester report library
//!
//! Combines result files produced by independent runs and renders them as
//! Markdown tables, status counts, a CI gate and Slack payloads.

pub mod error;
pub mod github;
pub mod markdown;
pub mod merge;
pub mod slack;
pub mod status;

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use app_tester_core::{AppResult, Stage};

pub use error::{ReportError, Result};
pub use markdown::{render_markdown, render_table, status_icon};
pub use merge::{merge_files, merge_json, merge_jsons, merge_multiple_jsons};
pub use slack::{build_slack_payload, SlackPayload};
pub use status::{check_status, count_status, StatusCounts};

/// A JSON object from a report or input file
pub type Record = Map<String, Value>;

/// Resolve a report key (`build`, `test`, `scan`) to its stage
pub fn parse_key(key: &str) -> Result<Stage> {
    Stage::parse(key).ok_or_else(|| ReportError::UnknownKey(key.to_string()))
}

/// Read a JSON array of objects, keeping every field
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;

    let Value::Array(items) = value else {
        return Err(ReportError::NotAnArray(path.to_path_buf()));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            _ => Err(ReportError::NotAnArray(path.to_path_buf())),
        })
        .collect()
}

/// Read a result file
pub fn load_report(path: &Path) -> Result<Vec<AppResult>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write `value` as pretty JSON, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("scan_build").unwrap(), Stage::Scan);
        assert!(matches!(parse_key("deploy"), Err(ReportError::UnknownKey(_))));
    }

    #[test]
    fn test_load_records_rejects_non_arrays() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.json");

        std::fs::write(&path, r#"{"name": "A"}"#).unwrap();
        assert!(matches!(load_records(&path), Err(ReportError::NotAnArray(_))));

        std::fs::write(&path, r#"[{"name": "A", "extra": 1}]"#).unwrap();
        let records = load_records(&path).unwrap();
        assert_eq!(records[0]["extra"], 1);
    }

    #[test]
    fn test_load_report() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.json");
        std::fs::write(&path, r#"[{"name": "A", "test": {"nanos": "Fail"}}]"#).unwrap();

        let report = load_report(&path).unwrap();
        assert!(report[0].has_failure(Stage::Test));
    }
}
