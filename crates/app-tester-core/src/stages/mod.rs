//! Build, test and scan stages
//!
//! Each stage walks the device table of one application. For every device
//! the same gate applies, in order:
//!
//! 1. device not selected for this run → `Unselected`
//! 2. excluded by the application's policy list → `Blacklisted`
//! 3. no variants declared for the device → `Skipped` (build and scan
//!    only; the test stage always runs the default build)
//! 4. otherwise the stage runs and produces a status per variant (build,
//!    scan) or a single status (test)
//!
//! Devices are processed one after the other and a failure on one device
//! never stops the others.

mod build;
mod scan;

pub use build::{build_command, build_device, clean_command};
pub use scan::{scan_command, scan_device};
pub use test::{install_command, test_command, test_device};

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::application::ApplicationSpec;
use crate::device::{Device, Devices};
use crate::result::{DeviceResult, DeviceResults, Stage, Status, VariantResult};
use crate::runner::{CommandOutcome, CommandRunner};

/// Filesystem locations used while processing one application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// SDK checkout passed as `BOLOS_SDK`
    pub sdk: PathBuf,
    /// Directory holding the application Makefile
    pub build: PathBuf,
    /// Directory holding the application tests
    pub test: PathBuf,
}

impl AppPaths {
    /// Resolve paths for `app` cloned under `workdir`
    pub fn new(workdir: &Path, sdk: &Path, app: &ApplicationSpec) -> Self {
        let clone = workdir.join(&app.name);
        Self {
            sdk: sdk.to_path_buf(),
            build: clone.join(app.build_path_or_default()),
            test: clone.join(app.test_dir_or_default()),
        }
    }
}

/// Result of one stage on one device, with the error log it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOutcome {
    pub result: DeviceResult,
    pub log: String,
}

impl DeviceOutcome {
    pub fn new(result: DeviceResult) -> Self {
        Self {
            result,
            log: String::new(),
        }
    }

    fn with_log(result: DeviceResult, log: String) -> Self {
        Self { result, log }
    }
}

/// Results of one stage across all devices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOutput {
    /// Reportable results keyed by device name
    pub results: DeviceResults,
    /// Concatenated error log of every failed command
    pub log: String,
}

impl StageOutput {
    pub fn failed_devices(&self) -> usize {
        self.results.values().filter(|r| r.has_fail()).count()
    }
}

/// Decide whether `stage` may run on `device`, or the result that stops it
pub fn gate(stage: Stage, device: &Device, app: &ApplicationSpec) -> Option<DeviceResult> {
    if !device.selected {
        return Some(DeviceResult::Unselected);
    }

    let excluded = match stage {
        Stage::Build => app.is_build_blacklisted(device.model),
        Stage::Test => app.is_test_blacklisted(device.model),
        Stage::Scan => !app.is_scan_whitelisted(device.model),
    };
    if excluded {
        return Some(DeviceResult::Blacklisted);
    }

    if stage != Stage::Test && app.variants(device.model).is_empty() {
        return Some(DeviceResult::Skipped);
    }

    None
}

/// Run one stage for one device
pub async fn run_device(
    runner: &dyn CommandRunner,
    stage: Stage,
    device: &Device,
    app: &ApplicationSpec,
    paths: &AppPaths,
) -> DeviceOutcome {
    match stage {
        Stage::Build => build_device(runner, device, app, paths).await,
        Stage::Test => test_device(runner, device, app, paths).await,
        Stage::Scan => scan_device(runner, device, app, paths).await,
    }
}

/// Run one stage across the device table, keeping reportable results only
pub async fn run_stage(
    runner: &dyn CommandRunner,
    stage: Stage,
    devices: &Devices,
    app: &ApplicationSpec,
    paths: &AppPaths,
) -> StageOutput {
    let mut output = StageOutput::default();

    for device in devices.iter() {
        let outcome = run_device(runner, stage, device, app, paths).await;
        output.log.push_str(&outcome.log);

        if outcome.result.is_reportable() {
            output
                .results
                .insert(device.model_name().to_string(), outcome.result);
        } else {
            debug!(app = %app.name, device = %device.model, stage = %stage, result = ?outcome.result, "not reported");
        }
    }

    output
}

/// `TARGET=.. BOLOS_SDK=..` prefix for make invocations
pub(crate) fn make_env(device: &Device, sdk: &Path) -> String {
    format!("TARGET={} BOLOS_SDK={}", device.target_name(), sdk.display())
}

/// Join command fragments, dropping empty ones
pub(crate) fn join_command(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command whose failure is an expected outcome
pub(crate) async fn run_allowing_failure(
    runner: &dyn CommandRunner,
    command: &str,
    cwd: &Path,
) -> CommandOutcome {
    match runner.run(command, cwd, true).await {
        Ok(outcome) => outcome,
        Err(e) => CommandOutcome::failure(None, e.to_string()),
    }
}

/// Best-effort `make clean`, then `command`, classified by the latter
pub(crate) async fn run_variant(
    runner: &dyn CommandRunner,
    device: &Device,
    paths: &AppPaths,
    command: &str,
) -> (Status, String) {
    run_allowing_failure(runner, &clean_command(device, &paths.sdk), &paths.build).await;

    let outcome = run_allowing_failure(runner, command, &paths.build).await;
    if !outcome.is_success() {
        warn!(device = %device.model, command, "=> KO");
    }

    (
        Status::from_success(outcome.is_success()),
        outcome.error_log(command, &paths.build),
    )
}

/// Run `command_for(variant)` for every declared variant of the device
pub(crate) async fn run_variants<F>(
    runner: &dyn CommandRunner,
    device: &Device,
    app: &ApplicationSpec,
    paths: &AppPaths,
    command_for: F,
) -> DeviceOutcome
where
    F: Fn(&str) -> String,
{
    let mut variants = VariantResult::new();
    let mut log = String::new();

    for variant in app.variants(device.model) {
        debug!(app = %app.name, device = %device.model, variant = %variant, "processing variant");
        let (status, variant_log) = run_variant(runner, device, paths, &command_for(variant)).await;
        variants.insert(variant.clone(), status);
        log.push_str(&variant_log);
    }

    DeviceOutcome::with_log(DeviceResult::Ran(variants), log)
}
