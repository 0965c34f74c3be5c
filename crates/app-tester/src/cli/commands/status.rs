//! status-output command

use std::path::PathBuf;

use clap::Args;

use app_tester_report::{check_status, count_status, load_report, parse_key};

use crate::cli::{output, Cli, OutputFormat};

/// Fail when a result file records a failure under a key
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Result file to check
    #[arg(long)]
    pub input_file: PathBuf,

    /// Stage to check: build, test or scan
    #[arg(long)]
    pub key: String,
}

impl StatusCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let stage = parse_key(&self.key)?;
        let apps = load_report(&self.input_file)?;
        let counts = count_status(&apps, stage);

        if cli.format == OutputFormat::Json {
            let json = serde_json::json!({
                "key": stage.key(),
                "success": counts.success,
                "fail": counts.fail,
                "total": counts.total,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else if !cli.quiet {
            println!("{}", output::header(&format!("Status of '{stage}'")));
            println!("{}", output::counts(&counts));
        }

        check_status(&apps, stage)?;

        if cli.show_text() {
            output::success(&format!(
                "No failure under '{}' ({} results)",
                stage, counts.total
            ));
        }
        Ok(())
    }
}
