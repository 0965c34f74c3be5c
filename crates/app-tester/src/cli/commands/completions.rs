//! completions command

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::{output, Cli};

const BIN_NAME: &str = "app-tester";

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        tracing::debug!(shell = %self.shell, "generating completions");

        let Some(path) = &self.output else {
            write_script(self.shell, &mut std::io::stdout());
            return Ok(());
        };

        let mut file = std::fs::File::create(path)?;
        write_script(self.shell, &mut file);
        if cli.show_text() {
            output::success(&format!(
                "{} completions written to {}",
                self.shell,
                output::path_style().apply_to(path.display())
            ));
        }
        Ok(())
    }
}

fn write_script(shell: Shell, out: &mut dyn Write) {
    generate(shell, &mut Cli::command(), BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_mentions_subcommands() {
        let mut buf = Vec::new();
        write_script(Shell::Bash, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("build-and-test"));
        assert!(script.contains("merge-output"));
    }
}
