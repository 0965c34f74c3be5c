//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use app_tester_core::config::load_config_or_default;
use app_tester_core::{DeviceModel, Devices, TesterConfig};

use commands::{
    CompletionsCommand, ConvertCommand, DevicesCommand, MergeCommand, RunCommand, SlackCommand,
    SplitCommand, StatusCommand, VariantsCommand,
};

/// app-tester - build, test and scan embedded applications across devices
#[derive(Debug, Parser)]
#[command(name = "app-tester")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: nearest app-tester.toml / app-tester.yaml)
    #[arg(long, global = true, env = "APP_TESTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clone, build, test and scan every application of an input list
    BuildAndTest(RunCommand),

    /// Split an input list into N files for parallel runs
    SplitInput(SplitCommand),

    /// Discover application variants from their Makefiles
    ListVariants(VariantsCommand),

    /// Render a result file as a Markdown table
    ConvertOutput(ConvertCommand),

    /// Union merge result files produced by parallel runs
    MergeOutput(MergeCommand),

    /// Fail when a result file records a failure
    StatusOutput(StatusCommand),

    /// Build the Slack summary payload of a result file
    SlackOutput(SlackCommand),

    /// Compute the device list for a CI event
    SelectDevices(DevicesCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::BuildAndTest(ref cmd) => cmd.execute(&self),
            Commands::SplitInput(ref cmd) => cmd.execute(&self),
            Commands::ListVariants(ref cmd) => cmd.execute(&self),
            Commands::ConvertOutput(ref cmd) => cmd.execute(&self),
            Commands::MergeOutput(ref cmd) => cmd.execute(&self),
            Commands::StatusOutput(ref cmd) => cmd.execute(&self),
            Commands::SlackOutput(ref cmd) => cmd.execute(&self),
            Commands::SelectDevices(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }

    /// Configuration file settings for `dir`, or defaults
    pub fn load_config(&self, dir: &Path) -> anyhow::Result<TesterConfig> {
        let (config, path) = load_config_or_default(self.config.as_deref(), dir)?;
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "using config file");
        }
        Ok(config)
    }

    /// Whether human-readable messages should be printed
    pub fn show_text(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}

/// Device selection flags shared by several commands
#[derive(Debug, Clone, Default, Args)]
pub struct DeviceArgs {
    /// Select every device
    #[arg(long)]
    pub all: bool,

    /// Select Nano S
    #[arg(long)]
    pub nanos: bool,

    /// Select Nano S Plus
    #[arg(long)]
    pub nanosp: bool,

    /// Select Nano X
    #[arg(long)]
    pub nanox: bool,

    /// Select Stax
    #[arg(long)]
    pub stax: bool,
}

impl DeviceArgs {
    /// Models selected by the flags
    pub fn models(&self) -> Vec<DeviceModel> {
        DeviceModel::ALL
            .into_iter()
            .filter(|m| {
                self.all
                    || match m {
                        DeviceModel::Nanos => self.nanos,
                        DeviceModel::Nanosp => self.nanosp,
                        DeviceModel::Nanox => self.nanox,
                        DeviceModel::Stax => self.stax,
                    }
            })
            .collect()
    }

    pub fn devices(&self) -> Devices {
        Devices::select(&self.models())
    }
}
