//! Git workspace setup
//!
//! Each repository is cloned once under the workdir, keyed by its name, and
//! brought to the requested ref on every run. A clone whose checkout or
//! submodule update fails is deleted so the next run starts from scratch.

use std::path::{Path, PathBuf};

use tracing::{error, info, instrument};

use crate::error::{Result, WorkspaceError};
use crate::runner::CommandRunner;

/// Forces https for GitHub SSH and `git://` URLs
const HTTPS_REWRITE: &str =
    r#"-c url."https://github.com/".insteadOf="git@github.com:" -c url."https://".insteadOf="git://""#;

/// State of a clone after setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Checked out at the requested ref with submodules initialised
    Ready,
    /// Checkout or submodule update failed and the clone was deleted
    Removed,
}

/// Clones and updates repositories under one root directory
pub struct Workspace<'a> {
    runner: &'a dyn CommandRunner,
    root: PathBuf,
    https_rewrite: bool,
}

impl<'a> Workspace<'a> {
    pub fn new(runner: &'a dyn CommandRunner, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
            https_rewrite: true,
        }
    }

    pub fn with_https_rewrite(mut self, enabled: bool) -> Self {
        self.https_rewrite = enabled;
        self
    }

    /// Clone directory of a repository
    pub fn repo_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn git(&self, args: &str) -> String {
        if self.https_rewrite {
            format!("git {HTTPS_REWRITE} {args}")
        } else {
            format!("git {args}")
        }
    }

    /// Clone `url` as `name` (or fetch an existing clone) and check out
    /// `git_ref` with submodules.
    ///
    /// Clone and fetch failures are errors. Checkout and submodule failures
    /// remove the clone and report [`SetupOutcome::Removed`].
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn setup(&self, name: &str, git_ref: &str, url: &str) -> Result<SetupOutcome> {
        let repo = self.repo_path(name);

        if repo.exists() {
            info!(repo = %name, "fetching existing clone");
            self.runner
                .run("git fetch", &repo, false)
                .await
                .map_err(|_| WorkspaceError::FetchFailed(repo.clone()))?;
        } else {
            info!(repo = %name, url, "cloning");
            self.runner
                .run(&self.git(&format!("clone {url} {name}")), &self.root, false)
                .await
                .map_err(|_| WorkspaceError::CloneFailed {
                    url: url.to_string(),
                    path: repo.clone(),
                })?;
        }

        let checkout = self
            .runner
            .run(&format!("git checkout {git_ref}"), &repo, true)
            .await?;
        if !checkout.is_success() {
            error!(repo = %name, git_ref, "checkout failed, removing clone");
            self.remove(&repo).await?;
            return Ok(SetupOutcome::Removed);
        }

        let submodules = self
            .runner
            .run(&self.git("submodule update --init --recursive"), &repo, true)
            .await?;
        if !submodules.is_success() {
            error!(repo = %name, "submodule update failed, removing clone");
            self.remove(&repo).await?;
            return Ok(SetupOutcome::Removed);
        }

        Ok(SetupOutcome::Ready)
    }

    async fn remove(&self, repo: &Path) -> Result<()> {
        tokio::fs::remove_dir_all(repo)
            .await
            .map_err(|e| WorkspaceError::CleanupFailed {
                path: repo.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
