//! Slack payload
//!
//! Summarises one stage as `{title, status, status_detail?, url?}`. Counts
//! are per device: a device whose variants include a failure counts as one
//! failure.

use serde::{Deserialize, Serialize};

use app_tester_core::{AppResult, DeviceResult, Stage, Status};

/// Repository whose workflow runs are linked when none is configured
pub const DEFAULT_REPOSITORY: &str = "LedgerHQ/ledger-app-tester";

/// Message sent to the team channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackPayload {
    pub title: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Link to a GitHub Actions run
pub fn run_url(repository: &str, run_id: &str) -> String {
    format!("https://github.com/{repository}/actions/runs/{run_id}")
}

/// Overall status of one device entry, `None` when nothing ran
fn device_status(result: &DeviceResult) -> Option<Status> {
    if result.has_fail() {
        Some(Status::Fail)
    } else if result.has_success() {
        Some(Status::Success)
    } else {
        None
    }
}

/// Failure lines for one application, empty when it has none
fn failure_detail(app: &AppResult, stage: Stage) -> String {
    let Some(devices) = app.stage(stage) else {
        return String::new();
    };

    let mut detail = String::new();
    let mut scalar_failures = Vec::new();

    for (device, result) in devices {
        match result {
            DeviceResult::Ran(_) if result.has_fail() => {
                detail.push_str(&format!(
                    "\t\t  - {device} : {} \n",
                    result.failed_variants().join(", ")
                ));
            }
            DeviceResult::Status(Status::Fail) => scalar_failures.push(device.as_str()),
            _ => {}
        }
    }

    if !scalar_failures.is_empty() {
        detail.push_str(&format!("\t\t  -  {}\n", scalar_failures.join(", ")));
    }

    detail
}

/// Build the payload for `stage`, titled with the stage key and the device
/// list when given
pub fn build_slack_payload(
    apps: &[AppResult],
    stage: Stage,
    devices: Option<&str>,
    url: Option<String>,
) -> SlackPayload {
    let mut success = 0;
    let mut fail = 0;

    for results in apps.iter().filter_map(|a| a.stage(stage)) {
        for status in results.values().filter_map(device_status) {
            match status {
                Status::Success => success += 1,
                Status::Fail => fail += 1,
            }
        }
    }
    let total = success + fail;

    let title = match devices.filter(|d| !d.trim().is_empty()) {
        Some(devices) => format!("{stage} on {devices}"),
        None => stage.to_string(),
    };

    let (status, status_detail) = if fail == 0 {
        (format!(":large_green_circle: Success for {total} apps"), None)
    } else {
        let mut detail = String::from("Failed for:\n");
        for app in apps {
            let lines = failure_detail(app, stage);
            if !lines.is_empty() {
                detail.push_str(&format!("\t•  {}\n", app.name));
                detail.push_str(&lines);
            }
        }
        (format!(":red-cross: Fail for {fail} / {total} apps"), Some(detail))
    };

    SlackPayload {
        title,
        status,
        status_detail,
        url,
    }
}
