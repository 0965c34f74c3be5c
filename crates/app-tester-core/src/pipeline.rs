//! The build-and-test run
//!
//! Loads the application list, prepares the SDK and every application
//! clone, runs the enabled stages per application and rewrites the output
//! and error log files after each application so a crash keeps completed
//! work.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::application::{load_applications, ApplicationSpec};
use crate::config::RunConfig;
use crate::error::{Result, TesterError, WorkspaceError};
use crate::result::{AppResult, Stage};
use crate::runner::CommandRunner;
use crate::stages::{run_stage, AppPaths};
use crate::workspace::{SetupOutcome, Workspace};

/// Totals reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Applications processed
    pub applications: usize,
    /// Device results holding at least one failure
    pub failed_devices: usize,
}

/// Tools needed on `PATH` for the given run, with install hints
pub fn required_tools(config: &RunConfig) -> Vec<(&'static str, &'static str)> {
    let mut tools = Vec::new();
    if !config.skip_setup {
        tools.push(("git", "Install git from https://git-scm.com"));
    }
    if !config.stages.is_empty() {
        tools.push(("make", "Install GNU make"));
    }
    if config.runs(Stage::Test) {
        tools.push(("pip", "Install Python 3 with pip"));
        tools.push(("pytest", "Install it with: pip install pytest"));
    }
    tools
}

/// Fail early when a tool the run depends on is missing
pub fn preflight(config: &RunConfig) -> Result<()> {
    for (tool, hint) in required_tools(config) {
        match which::which(tool) {
            Ok(path) => debug!(tool, path = %path.display(), "found tool"),
            Err(_) => return Err(TesterError::tool_not_found(tool, hint)),
        }
    }
    Ok(())
}

/// One `build-and-test` run over an application list
pub struct Pipeline<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a RunConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a RunConfig) -> Self {
        Self { runner, config }
    }

    /// Run everything, checking tools on `PATH` first
    pub async fn run(&self) -> Result<RunSummary> {
        let apps = self.prepare()?;
        preflight(self.config)?;
        self.run_applications(&apps).await
    }

    /// Create the workdir and load the input list
    fn prepare(&self) -> Result<Vec<ApplicationSpec>> {
        std::fs::create_dir_all(&self.config.workdir)?;
        load_applications(&self.config.input_file)
    }

    /// Set up the SDK, then process each application in order
    pub async fn run_applications(&self, apps: &[ApplicationSpec]) -> Result<RunSummary> {
        let workspace = Workspace::new(self.runner, &self.config.workdir)
            .with_https_rewrite(self.config.https_rewrite);

        if !self.config.skip_setup {
            info!(git_ref = %self.config.sdk_ref, "setting up SDK");
            let outcome = workspace
                .setup(&self.config.sdk_name, &self.config.sdk_ref, &self.config.sdk_url)
                .await?;
            if outcome == SetupOutcome::Removed {
                return Err(WorkspaceError::CheckoutFailed {
                    git_ref: self.config.sdk_ref.clone(),
                    path: self.config.sdk_path(),
                }
                .into());
            }
        }

        let mut results = Vec::with_capacity(apps.len());
        let mut logs = String::new();
        let mut summary = RunSummary::default();

        for app in apps {
            let (result, log) = self.process_app(&workspace, app).await?;
            summary.applications += 1;
            summary.failed_devices += result.failure_count();
            results.push(result);
            logs.push_str(&log);

            self.flush(&results, &logs)?;
        }

        if apps.is_empty() {
            self.flush(&results, &logs)?;
        }

        info!(
            applications = summary.applications,
            failed_devices = summary.failed_devices,
            "run complete"
        );
        Ok(summary)
    }

    /// Set up one application and run the enabled stages on it
    #[instrument(skip_all, fields(app = %app.name))]
    pub async fn process_app(
        &self,
        workspace: &Workspace<'_>,
        app: &ApplicationSpec,
    ) -> Result<(AppResult, String)> {
        if !self.config.skip_setup {
            info!("setup");
            if workspace.setup(&app.name, &app.git_ref, &app.url).await? == SetupOutcome::Removed {
                warn!("clone removed, stages will fail");
            }
        }

        let paths = AppPaths::new(&self.config.workdir, &self.config.sdk_path(), app);
        let mut result = AppResult::new(&app.name);
        let mut log = String::new();

        for stage in &self.config.stages {
            info!(stage = %stage, "running stage");
            let output = run_stage(self.runner, *stage, &self.config.devices, app, &paths).await;
            log.push_str(&output.log);
            result.set_stage(*stage, output.results);
        }

        Ok((result, log))
    }

    fn flush(&self, results: &[AppResult], logs: &str) -> Result<()> {
        write_file(&self.config.output_file, &serde_json::to_string_pretty(results)?)?;
        write_file(&self.config.logs_file, logs)?;
        debug!(output = %self.config.output_file.display(), count = results.len(), "output flushed");
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TesterConfig;
    use crate::device::{DeviceModel, Devices};
    use crate::runner::testing::ScriptedRunner;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn config(temp: &TempDir, stages: &[Stage]) -> RunConfig {
        RunConfig::from_config(&TesterConfig::default())
            .with_devices(Devices::select(&[DeviceModel::Nanos, DeviceModel::Stax]))
            .with_stages(stages)
            .with_files(
                temp.path().join("input.json"),
                temp.path().join("out").join("output.json"),
                temp.path().join("out").join("error_logs.txt"),
            )
            .with_workdir(temp.path().join("workdir"))
    }

    fn apps() -> Vec<ApplicationSpec> {
        let mut a = ApplicationSpec::new("A");
        a.variant_param = Some("COIN".to_string());
        a.variants_nanos = vec!["v1".to_string(), "v2".to_string()];

        let mut b = ApplicationSpec::new("B");
        b.variants_stax = vec!["default".to_string()];
        b.test_blacklist = vec!["stax".to_string()];

        vec![a, b]
    }

    #[tokio::test]
    async fn test_run_writes_output_and_logs() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp, &[Stage::Build, Stage::Test]).with_skip_setup(true);
        let runner = ScriptedRunner::new().failing_on("COIN=v2");

        let summary = Pipeline::new(&runner, &config)
            .run_applications(&apps())
            .await
            .unwrap();

        assert_eq!(summary.applications, 2);
        assert_eq!(summary.failed_devices, 1);

        let output: Value =
            serde_json::from_str(&std::fs::read_to_string(&config.output_file).unwrap()).unwrap();
        assert_eq!(
            output,
            json!([
                {"name": "A", "build": {"nanos": {"v1": "Success", "v2": "Fail"}}, "test": {"nanos": "Success", "stax": "Success"}},
                {"name": "B", "build": {"stax": {"default": "Success"}}, "test": {"stax": "Blacklisted"}}
            ])
        );

        let logs = std::fs::read_to_string(&config.logs_file).unwrap();
        assert!(logs.contains("make COIN=v2"));
    }

    #[tokio::test]
    async fn test_setup_clones_sdk_then_apps() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp, &[]);
        std::fs::create_dir_all(&config.workdir).unwrap();
        let runner = ScriptedRunner::new();

        Pipeline::new(&runner, &config)
            .run_applications(&apps())
            .await
            .unwrap();

        let clones: Vec<String> = runner
            .commands()
            .into_iter()
            .filter(|c| c.contains(" clone "))
            .collect();
        assert_eq!(clones.len(), 3);
        assert!(clones[0].ends_with("ledger-secure-sdk.git sdk"));
        assert!(clones[1].ends_with(" A"));
        assert!(clones[2].ends_with(" B"));
    }

    #[tokio::test]
    async fn test_sdk_checkout_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp, &[Stage::Build]).with_sdk_ref("origin/missing");
        std::fs::create_dir_all(config.workdir.join("sdk")).unwrap();
        let runner = ScriptedRunner::new().failing_on("checkout origin/missing");

        let err = Pipeline::new(&runner, &config)
            .run_applications(&apps())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TesterError::Workspace(WorkspaceError::CheckoutFailed { .. })
        ));
        assert!(!config.output_file.exists());
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp, &[Stage::Build]);
        let runner = ScriptedRunner::new();

        let err = Pipeline::new(&runner, &config).run().await.unwrap_err();
        assert!(matches!(err, TesterError::InputNotFound(_)));
        assert!(runner.calls().is_empty());
        assert!(!config.output_file.exists());
    }

    #[test]
    fn test_required_tools() {
        let temp = TempDir::new().unwrap();
        let names = |c: &RunConfig| required_tools(c).into_iter().map(|(t, _)| t).collect::<Vec<_>>();

        assert_eq!(names(&config(&temp, &[Stage::Build])), vec!["git", "make"]);
        assert_eq!(
            names(&config(&temp, &[Stage::Test]).with_skip_setup(true)),
            vec!["make", "pip", "pytest"]
        );
    }
}
