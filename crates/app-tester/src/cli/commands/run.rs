//! build-and-test command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use app_tester_core::config::{DEFAULT_INPUT_FILE, DEFAULT_LOGS_FILE, DEFAULT_OUTPUT_FILE};
use app_tester_core::{Pipeline, RunConfig, RunSummary, ShellRunner, Stage};

use crate::cli::{output, Cli, DeviceArgs, OutputFormat};

/// Clone, build, test and scan every application of an input list
#[derive(Debug, Args)]
pub struct RunCommand {
    #[command(flatten)]
    pub devices: DeviceArgs,

    /// Build every declared variant
    #[arg(long)]
    pub build: bool,

    /// Run the functional tests
    #[arg(long)]
    pub test: bool,

    /// Run static analysis on whitelisted devices
    #[arg(long)]
    pub scan_build: bool,

    /// Use existing clones as they are
    #[arg(long)]
    pub skip_setup: bool,

    /// SDK ref to check out (default from config: origin/master)
    #[arg(long)]
    pub sdk_ref: Option<String>,

    /// Application list
    #[arg(long, default_value = DEFAULT_INPUT_FILE)]
    pub input_file: PathBuf,

    /// Result file, rewritten after each application
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Error log of every failed command
    #[arg(long, default_value = DEFAULT_LOGS_FILE)]
    pub logs_file: PathBuf,

    /// Directory holding the clones (default from config: workdir)
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    /// Kill commands running longer than this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl RunCommand {
    fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        if self.build {
            stages.push(Stage::Build);
        }
        if self.test {
            stages.push(Stage::Test);
        }
        if self.scan_build {
            stages.push(Stage::Scan);
        }
        stages
    }

    /// Fold config file settings and flags into the run configuration
    pub fn run_config(&self, cli: &Cli) -> anyhow::Result<RunConfig> {
        let cwd = std::env::current_dir()?;
        let mut file_config = cli.load_config(&cwd)?;
        if let Some(secs) = self.timeout {
            file_config.command_timeout_secs = secs;
        }

        let mut config = RunConfig::from_config(&file_config)
            .with_devices(self.devices.devices())
            .with_stages(&self.stages())
            .with_skip_setup(self.skip_setup)
            .with_files(
                self.input_file.clone(),
                self.output_file.clone(),
                self.logs_file.clone(),
            );
        if let Some(sdk_ref) = &self.sdk_ref {
            config = config.with_sdk_ref(sdk_ref.clone());
        }
        if let Some(workdir) = &self.workdir {
            config = config.with_workdir(workdir.clone());
        }

        Ok(config.resolve_workdir(&cwd))
    }

    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = self.run_config(cli)?;
        info!(
            devices = %config.devices.selected_names(),
            stages = ?config.stages,
            "starting run"
        );

        if cli.show_text() {
            println!("{}", output::header("Build and test"));
            println!("{}", output::key_value("Input", &config.input_file.display().to_string()));
            println!("{}", output::key_value("Workdir", &config.workdir.display().to_string()));
            println!("{}", output::key_value("Devices", &config.devices.selected_names()));
            println!();
        }
        if !config.devices.any_selected() {
            output::warning("No device selected, nothing will be built");
        }

        let runner = ShellRunner::new().with_timeout(config.command_timeout);
        let summary = Pipeline::new(&runner, &config).run().await?;

        self.report(cli, &config, &summary)
    }

    fn report(&self, cli: &Cli, config: &RunConfig, summary: &RunSummary) -> anyhow::Result<()> {
        if cli.format == OutputFormat::Json {
            let json = serde_json::json!({
                "applications": summary.applications,
                "failed_devices": summary.failed_devices,
                "output_file": config.output_file,
                "logs_file": config.logs_file,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        if cli.quiet {
            return Ok(());
        }

        let message = format!(
            "Processed {} applications, results in {}",
            summary.applications,
            output::path_style().apply_to(config.output_file.display())
        );
        if summary.failed_devices == 0 {
            output::success(&message);
        } else {
            output::warning(&format!(
                "{message} ({} device results failed, see {})",
                style(summary.failed_devices).red().bold(),
                config.logs_file.display()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_run_config_from_flags() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("app-tester.toml");
        std::fs::write(&config_path, "workdir = \"farm\"\ncommand_timeout_secs = 60\n").unwrap();

        let cli = Cli::try_parse_from([
            "app-tester",
            "--config",
            config_path.to_str().unwrap(),
            "build-and-test",
            "--all",
            "--scan-build",
            "--test",
            "--sdk-ref",
            "origin/API_LEVEL_5",
            "--timeout",
            "900",
        ])
        .unwrap();
        let crate::cli::Commands::BuildAndTest(cmd) = &cli.command else {
            panic!("expected build-and-test");
        };

        let config = cmd.run_config(&cli).unwrap();
        assert_eq!(config.stages, vec![Stage::Test, Stage::Scan]);
        assert_eq!(config.sdk_ref, "origin/API_LEVEL_5");
        assert_eq!(config.command_timeout, Some(std::time::Duration::from_secs(900)));
        assert!(config.workdir.is_absolute());
        assert!(config.workdir.ends_with("farm"));
        assert_eq!(config.devices.selected().count(), 4);
    }
}
