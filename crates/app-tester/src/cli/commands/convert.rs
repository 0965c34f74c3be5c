//! convert-output command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use app_tester_report::{github, load_report, parse_key, render_markdown};

use crate::cli::{output, Cli};

/// Render a result file as a Markdown table followed by status counts
#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// Result file to render
    #[arg(long)]
    pub input_file: PathBuf,

    /// Also write the Markdown to this file
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Stage to render: build, test or scan
    #[arg(long, default_value = "build")]
    pub key: String,

    /// Append the Markdown to the GitHub Actions job summary
    #[arg(long)]
    pub step_summary: bool,
}

impl ConvertCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let stage = parse_key(&self.key)?;
        let apps = load_report(&self.input_file)?;
        info!(input = %self.input_file.display(), stage = %stage, count = apps.len(), "rendering markdown");

        let markdown = render_markdown(&apps, stage);
        if !cli.quiet {
            println!("{markdown}");
        }

        if let Some(path) = &self.output_file {
            std::fs::write(path, &markdown)?;
            if cli.show_text() {
                output::success(&format!("Markdown written to {}", path.display()));
            }
        }

        if self.step_summary && !github::append_step_summary(&markdown)? {
            output::warning("GITHUB_STEP_SUMMARY is not set, summary not written");
        }

        Ok(())
    }
}
