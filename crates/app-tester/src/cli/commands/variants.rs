//! list-variants command

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;
use tracing::{info, warn};

use app_tester_core::config::DEFAULT_WORKDIR;
use app_tester_core::pipeline::preflight;
use app_tester_core::variants::variant_fragment;
use app_tester_core::{CommandRunner, RunConfig, SetupOutcome, ShellRunner, Workspace};
use app_tester_report::{load_records, merge_json, write_json, Record};

use crate::cli::{output, Cli};

/// Discover application variants from their Makefiles
#[derive(Debug, Args)]
pub struct VariantsCommand {
    /// Application list; every entry is cloned and inspected
    #[arg(long, conflicts_with = "build_path", required_unless_present = "build_path")]
    pub input_file: Option<PathBuf>,

    /// Inspect a single checked-out application
    #[arg(long, requires = "name")]
    pub build_path: Option<PathBuf>,

    /// Name of the single application
    #[arg(long)]
    pub name: Option<String>,

    /// Directory holding the clones
    #[arg(long, default_value = DEFAULT_WORKDIR)]
    pub workdir: PathBuf,

    /// Use existing clones as they are
    #[arg(long)]
    pub skip_setup: bool,

    /// Variant fragments, one per application
    #[arg(long, default_value = "output_files/variant.json")]
    pub output_file: PathBuf,

    /// Input list merged with the discovered variants
    #[arg(long)]
    pub full_output_file: Option<PathBuf>,
}

impl VariantsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        let file_config = cli.load_config(&cwd)?;
        let runner =
            ShellRunner::new().with_timeout(RunConfig::from_config(&file_config).command_timeout);

        if let (Some(build_path), Some(name)) = (&self.build_path, &self.name) {
            let fragment = variant_fragment(&runner, name, build_path).await;
            println!("{}", serde_json::to_string_pretty(&fragment)?);
            return Ok(());
        }

        let Some(input_file) = &self.input_file else {
            anyhow::bail!("either --input-file or --build-path is required");
        };
        let apps = load_records(input_file)?;

        let workdir = cwd.join(&self.workdir);
        std::fs::create_dir_all(&workdir)?;
        if !self.skip_setup {
            let config = RunConfig::from_config(&file_config).with_stages(&[]);
            preflight(&config)?;
        }

        let workspace =
            Workspace::new(&runner, &workdir).with_https_rewrite(file_config.git.https_rewrite);

        let mut fragments = Vec::with_capacity(apps.len());
        for app in &apps {
            match self.discover(&runner, &workspace, app).await? {
                Some(fragment) => fragments.push(fragment),
                None => warn!("record without a name skipped"),
            }
        }

        write_json(&self.output_file, &fragments)?;
        if let Some(path) = &self.full_output_file {
            write_json(path, &merge_json(&apps, &fragments, "name"))?;
        }

        if cli.show_text() {
            output::success(&format!(
                "Variants generated for {} applications in {}",
                fragments.len(),
                output::path_style().apply_to(self.output_file.display())
            ));
        }
        Ok(())
    }

    async fn discover(
        &self,
        runner: &dyn CommandRunner,
        workspace: &Workspace<'_>,
        app: &Record,
    ) -> anyhow::Result<Option<Record>> {
        let field = |key: &str| app.get(key).and_then(Value::as_str).unwrap_or_default();

        let name = field("name");
        if name.is_empty() {
            return Ok(None);
        }

        if !self.skip_setup {
            info!(app = name, "cloning");
            if workspace.setup(name, field("ref"), field("url")).await? == SetupOutcome::Removed {
                warn!(app = name, "clone removed after a failed checkout");
            }
        }

        let build_path = match field("build_path") {
            "" => ".",
            path => path,
        };
        let path = workspace.repo_path(name).join(build_path);

        Ok(Some(variant_fragment(runner, name, &path).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_input_or_build_path_required() {
        assert!(Cli::try_parse_from(["app-tester", "list-variants"]).is_err());
        assert!(Cli::try_parse_from([
            "app-tester",
            "list-variants",
            "--build-path",
            "app",
            "--name",
            "app-boilerplate",
        ])
        .is_ok());
        assert!(Cli::try_parse_from(["app-tester", "list-variants", "--build-path", "app"]).is_err());
    }
}
