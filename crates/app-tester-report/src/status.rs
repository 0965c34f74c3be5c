//! Status counting and the pass/fail gate

use std::fmt;

use tracing::{error, info};

use app_tester_core::{AppResult, DeviceResult, Stage, Status};

use crate::error::{ReportError, Result};

/// Flat counts over every device and variant of one stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub success: usize,
    pub fail: usize,
    pub total: usize,
}

impl StatusCounts {
    fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Success => self.success += 1,
            Status::Fail => self.fail += 1,
        }
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\nSuccess: {}\nFailures: {}\nTotal: {}\n",
            self.success, self.fail, self.total
        )
    }
}

/// Count statuses under `stage`. Variant maps contribute one entry per
/// variant; sentinel words count toward the total only.
pub fn count_status(apps: &[AppResult], stage: Stage) -> StatusCounts {
    let mut counts = StatusCounts::default();

    for devices in apps.iter().filter_map(|a| a.stage(stage)) {
        for result in devices.values() {
            match result {
                DeviceResult::Ran(variants) => {
                    variants.values().for_each(|s| counts.record(*s));
                }
                DeviceResult::Status(status) => counts.record(*status),
                DeviceResult::Skipped | DeviceResult::Blacklisted | DeviceResult::Unselected => {
                    counts.total += 1;
                }
            }
        }
    }

    counts
}

/// Error naming the first application with a failure under `stage`
pub fn check_status(apps: &[AppResult], stage: Stage) -> Result<()> {
    if let Some(app) = apps.iter().find(|a| a.has_failure(stage)) {
        error!(app = %app.name, stage = %stage, "failure found");
        return Err(ReportError::Failed {
            app: app.name.clone(),
            stage: stage.to_string(),
        });
    }

    info!(stage = %stage, applications = apps.len(), "no failure found");
    Ok(())
}
