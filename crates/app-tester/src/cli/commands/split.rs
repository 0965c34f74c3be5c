//! split-input command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use app_tester_core::split::write_splits;

use crate::cli::{output, Cli, OutputFormat};

/// Split an input list into N files for parallel runs
#[derive(Debug, Args)]
pub struct SplitCommand {
    /// Application list to split
    #[arg(long, default_value = "input_files/input.json")]
    pub input_file: PathBuf,

    /// Number of files to produce
    #[arg(long, default_value = "10")]
    pub split_count: usize,

    /// Directory receiving input_1.json .. input_N.json
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl SplitCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(input = %self.input_file.display(), count = self.split_count, "splitting input");
        let files = write_splits(&self.input_file, self.split_count, &self.output_dir)?;

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&files)?);
        } else if !cli.quiet {
            output::success(&format!("Data split into {} JSON files", files.len()));
            for file in &files {
                println!("  {}", output::path_style().apply_to(file.display()));
            }
        }

        Ok(())
    }
}
