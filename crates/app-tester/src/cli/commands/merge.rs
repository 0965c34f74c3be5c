//! merge-output command

use std::path::PathBuf;

use clap::Args;

use app_tester_report::{merge_files, write_json, ReportError};

use crate::cli::{output, Cli};

/// Union merge result files produced by parallel runs
#[derive(Debug, Args)]
pub struct MergeCommand {
    /// Glob pattern of the files to merge (e.g. "output_*.json")
    #[arg(long)]
    pub input_pattern: String,

    /// Merged result file
    #[arg(long)]
    pub output_file: PathBuf,

    /// Key whose payloads are merged: build, test or scan
    #[arg(long)]
    pub key: String,
}

impl MergeCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let (files, merged) = match merge_files(&self.input_pattern, &self.key) {
            Ok(result) => result,
            Err(ReportError::NoInputFiles(pattern)) => {
                output::warning(&format!("No input files found matching {pattern}"));
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        write_json(&self.output_file, &merged)?;

        if cli.show_text() {
            output::success(&format!(
                "Merged {} files into {} ({} applications)",
                files.len(),
                output::path_style().apply_to(self.output_file.display()),
                merged.len()
            ));
        }
        Ok(())
    }
}
