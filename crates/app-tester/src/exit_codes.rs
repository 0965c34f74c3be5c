//! Exit codes for the CLI

use app_tester_core::TesterError;
use app_tester_report::ReportError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration or input error
pub const CONFIG_ERROR: i32 = 2;

/// A required tool is not installed
pub const TOOL_NOT_FOUND: i32 = 3;

/// The pass/fail gate found a failure
pub const GATE_FAILED: i32 = 10;

/// Pick the exit code for an error returned by a command
pub fn for_error(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<TesterError>() {
        return match e {
            TesterError::ToolNotFound { .. } => TOOL_NOT_FOUND,
            e if e.is_config() => CONFIG_ERROR,
            _ => ERROR,
        };
    }

    if let Some(e) = error.downcast_ref::<ReportError>() {
        return match e {
            e if e.is_gate_failure() => GATE_FAILED,
            ReportError::UnknownKey(_)
            | ReportError::MissingName { .. }
            | ReportError::NotAnArray(_)
            | ReportError::Pattern(_)
            | ReportError::Json(_) => CONFIG_ERROR,
            _ => ERROR,
        };
    }

    ERROR
}
