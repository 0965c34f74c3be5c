//! slack-output command

use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use app_tester_report::slack::{run_url, DEFAULT_REPOSITORY};
use app_tester_report::{build_slack_payload, load_report, parse_key, write_json};

use crate::cli::{output, Cli};

/// Build the Slack summary payload of a result file
#[derive(Debug, Args)]
pub struct SlackCommand {
    /// Result file to summarise
    #[arg(long)]
    pub input_file: PathBuf,

    /// Write the payload here instead of stdout
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Stage to summarise: build, test or scan
    #[arg(long, default_value = "build")]
    pub key: String,

    /// Devices the run covered, appended to the title
    #[arg(long)]
    pub devices: Option<String>,

    /// Link attached to the message (default: the current workflow run)
    #[arg(long)]
    pub url: Option<String>,
}

/// Explicit URL, else the workflow run given by `GH_RUN_ID`
fn resolve_url(
    explicit: Option<&str>,
    run_id: Option<String>,
    repository: Option<String>,
) -> Option<String> {
    if let Some(url) = explicit {
        return Some(url.to_string());
    }

    match run_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let repository = repository.unwrap_or_else(|| DEFAULT_REPOSITORY.to_string());
            Some(run_url(&repository, &id))
        }
        None => {
            warn!("GH_RUN_ID is not set, payload has no url");
            None
        }
    }
}

impl SlackCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let stage = parse_key(&self.key)?;
        let apps = load_report(&self.input_file)?;

        let url = resolve_url(
            self.url.as_deref(),
            std::env::var("GH_RUN_ID").ok(),
            std::env::var("GITHUB_REPOSITORY").ok(),
        );
        let payload = build_slack_payload(&apps, stage, self.devices.as_deref(), url);
        info!(stage = %stage, status = %payload.status, "slack payload built");

        match &self.output_file {
            Some(path) => {
                write_json(path, &payload)?;
                if cli.show_text() {
                    output::success(&format!("Slack payload written to {}", path.display()));
                }
            }
            None => println!("{}", serde_json::to_string_pretty(&payload)?),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_url_wins() {
        assert_eq!(
            resolve_url(Some("https://ci/run/1"), Some("42".to_string()), None).as_deref(),
            Some("https://ci/run/1")
        );
    }

    #[test]
    fn test_url_from_run_id() {
        assert_eq!(
            resolve_url(None, Some("42".to_string()), Some("org/repo".to_string())).as_deref(),
            Some("https://github.com/org/repo/actions/runs/42")
        );
        assert_eq!(
            resolve_url(None, Some("7".to_string()), None).as_deref(),
            Some("https://github.com/LedgerHQ/ledger-app-tester/actions/runs/7")
        );
        assert_eq!(resolve_url(None, None, None), None);
    }
}
