//! Command runner
//!
//! Every external tool (git, make, pip, pytest) goes through a
//! [`CommandRunner`]. Commands are shell strings so that inline `VAR=value`
//! prefixes work the way they do on a terminal.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::error::{CommandError, Result};

const BANNER: &str =
    "###############################################################################";

/// Exit status and combined stdout/stderr of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` if the process was killed or never started
    pub exit_code: Option<i32>,
    /// Interleaved stdout and stderr
    pub output: String,
    /// Set when the wall-clock timeout expired
    pub timed_out_after: Option<Duration>,
}

impl CommandOutcome {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            output: output.into(),
            timed_out_after: None,
        }
    }

    pub fn failure(exit_code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
            timed_out_after: None,
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self {
            exit_code: None,
            output: String::new(),
            timed_out_after: Some(limit),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0) && self.timed_out_after.is_none()
    }

    /// Banner block for the cumulative error log. Empty for successes.
    pub fn error_log(&self, command: &str, cwd: &Path) -> String {
        if self.is_success() {
            return String::new();
        }

        let mut log = format!(
            "\n{BANNER}\n[run_cmd] Running: {command} from {}\n{BANNER}\n",
            cwd.display()
        );
        if let Some(limit) = self.timed_out_after {
            log.push_str(&format!("[run_cmd] Timed out after {limit:?}\n"));
        }
        log.push_str(&self.output);
        if !log.ends_with('\n') {
            log.push('\n');
        }
        log
    }
}

/// Executes shell commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` in `cwd`. Errors only when the process cannot be
    /// started; a nonzero exit is a normal outcome.
    async fn execute(&self, command: &str, cwd: &Path) -> Result<CommandOutcome>;

    /// Run `command`, turning a failure into an error unless `allow_failure`
    async fn run(&self, command: &str, cwd: &Path, allow_failure: bool) -> Result<CommandOutcome> {
        info!(command, cwd = %cwd.display(), "running command");

        let outcome = match self.execute(command, cwd).await {
            Ok(outcome) => outcome,
            Err(e) if allow_failure => {
                warn!(command, error = %e, "command could not be started");
                CommandOutcome::failure(None, e.to_string())
            }
            Err(e) => return Err(e),
        };

        if outcome.is_success() {
            return Ok(outcome);
        }

        if !allow_failure {
            error!(command, exit_code = ?outcome.exit_code, output = %outcome.output, "command failed");
            return Err(match outcome.timed_out_after {
                Some(limit) => CommandError::Timeout {
                    command: command.to_string(),
                    limit,
                },
                None => CommandError::Failed {
                    command: command.to_string(),
                    cwd: cwd.to_path_buf(),
                    exit_code: outcome.exit_code,
                    output: outcome.output,
                },
            }
            .into());
        }

        warn!(command, exit_code = ?outcome.exit_code, "command failed");
        debug!(output = %outcome.output, "failed command output");
        Ok(outcome)
    }
}

/// Runs commands through `sh -c`, optionally bounded by a timeout
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill commands that run longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn execute(&self, command: &str, cwd: &Path) -> Result<CommandOutcome> {
        let spawn_error = |e: std::io::Error| CommandError::SpawnFailed {
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
            message: e.to_string(),
        };

        // Fold stderr into stdout so the log keeps the original interleaving
        let script = format!("exec 2>&1\n{command}");

        let mut shell = Command::new("sh");
        shell
            .arg("-c")
            .arg(&script)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so a timeout reaches every process the command started
        #[cfg(unix)]
        shell.process_group(0);

        let child = shell.spawn().map_err(spawn_error)?;
        let pid = child.id();

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(result) => result.map_err(spawn_error)?,
                Err(_) => {
                    kill_process_group(pid);
                    warn!(command, ?limit, "command timed out, killed");
                    return Ok(CommandOutcome::timeout(limit));
                }
            },
            None => wait.await.map_err(spawn_error)?,
        };

        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutcome {
            exit_code: output.status.code(),
            output: text,
            timed_out_after: None,
        })
    }
}

/// SIGKILL the process group led by `pid`. The shell itself is reaped by
/// tokio once its handle is dropped.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid.and_then(|p| libc::pid_t::try_from(p).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal to the group created at spawn
    if unsafe { libc::killpg(pid, libc::SIGKILL) } != 0 {
        debug!(pid, error = %std::io::Error::last_os_error(), "process group already gone");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TesterError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_shell_runner_success() {
        let temp = TempDir::new().unwrap();
        let outcome = ShellRunner::new()
            .run("echo hello", temp.path(), false)
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.output.trim(), "hello");
        assert!(outcome.error_log("echo hello", temp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_shell_runner_folds_stderr() {
        let temp = TempDir::new().unwrap();
        let outcome = ShellRunner::new()
            .run("echo out; echo err >&2; exit 3", temp.path(), true)
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, Some(3));
        assert!(outcome.output.contains("out"));
        assert!(outcome.output.contains("err"));
    }

    #[tokio::test]
    async fn test_inline_env_prefix() {
        let temp = TempDir::new().unwrap();
        let outcome = ShellRunner::new()
            .run("TARGET=nanos2 printenv TARGET", temp.path(), false)
            .await
            .unwrap();

        assert_eq!(outcome.output.trim(), "nanos2");
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "x").unwrap();

        let outcome = ShellRunner::new()
            .run("ls", temp.path(), false)
            .await
            .unwrap();
        assert!(outcome.output.contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_failure_is_error_unless_allowed() {
        let temp = TempDir::new().unwrap();
        let err = ShellRunner::new()
            .run("false", temp.path(), false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TesterError::Command(CommandError::Failed { exit_code: Some(1), .. })
        ));

        let outcome = ShellRunner::new()
            .run("false", temp.path(), true)
            .await
            .unwrap();
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_missing_directory_allowed_is_failure() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone");

        let outcome = ShellRunner::new().run("true", &missing, true).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code, None);

        assert!(ShellRunner::new().run("true", &missing, false).await.is_err());
    }

    #[tokio::test]
    async fn test_timeout_kills_command() {
        let temp = TempDir::new().unwrap();
        let runner = ShellRunner::new().with_timeout(Some(Duration::from_millis(200)));

        let outcome = runner.run("sleep 5", temp.path(), true).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.timed_out_after, Some(Duration::from_millis(200)));
        assert!(outcome
            .error_log("sleep 5", temp.path())
            .contains("Timed out after 200ms"));

        let err = runner.run("sleep 5", temp.path(), false).await.unwrap_err();
        assert!(matches!(err, TesterError::Command(CommandError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_timeout_kills_child_processes() {
        let temp = TempDir::new().unwrap();
        let runner = ShellRunner::new().with_timeout(Some(Duration::from_millis(300)));

        let outcome = runner
            .run("sh -c 'sleep 2; touch marker'; true", temp.path(), true)
            .await
            .unwrap();
        assert!(outcome.timed_out_after.is_some());

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!temp.path().join("marker").exists());
    }

    #[test]
    fn test_error_log_banner() {
        let outcome = CommandOutcome::failure(Some(2), "make: *** [all] Error 2");
        let log = outcome.error_log("make -j", Path::new("/work/app"));

        assert!(log.contains("[run_cmd] Running: make -j from /work/app"));
        assert!(log.contains("make: *** [all] Error 2"));
        assert_eq!(log.matches(BANNER).count(), 2);
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let runner = ShellRunner::new().with_timeout(Some(Duration::ZERO));
        assert!(runner.timeout.is_none());
    }
}
