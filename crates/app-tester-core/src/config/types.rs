//! Configuration types

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::device::Devices;
use crate::result::Stage;

/// Settings read from `app-tester.toml` / `app-tester.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesterConfig {
    /// SDK checkout settings
    pub sdk: SdkConfig,

    /// Git behaviour for every clone
    pub git: GitConfig,

    /// Directory holding every clone, relative to the working directory
    pub workdir: PathBuf,

    /// Per-command wall-clock limit in seconds, 0 disables it
    pub command_timeout_secs: u64,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            sdk: SdkConfig::default(),
            git: GitConfig::default(),
            workdir: PathBuf::from(DEFAULT_WORKDIR),
            command_timeout_secs: 0,
        }
    }
}

/// SDK checkout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub url: String,
    pub name: String,
    pub default_ref: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SDK_URL.to_string(),
            name: DEFAULT_SDK_NAME.to_string(),
            default_ref: DEFAULT_SDK_REF.to_string(),
        }
    }
}

/// Git settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Rewrite `git@github.com:` and `git://` URLs to https
    pub https_rewrite: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            https_rewrite: true,
        }
    }
}

/// Everything one `build-and-test` invocation needs, fixed before it starts
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub devices: Devices,
    pub stages: Vec<Stage>,
    pub skip_setup: bool,
    pub sdk_url: String,
    pub sdk_name: String,
    pub sdk_ref: String,
    pub https_rewrite: bool,
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub logs_file: PathBuf,
    pub workdir: PathBuf,
    pub command_timeout: Option<Duration>,
}

impl RunConfig {
    /// Start from file settings with nothing selected
    pub fn from_config(config: &TesterConfig) -> Self {
        Self {
            devices: Devices::none(),
            stages: Vec::new(),
            skip_setup: false,
            sdk_url: config.sdk.url.clone(),
            sdk_name: config.sdk.name.clone(),
            sdk_ref: config.sdk.default_ref.clone(),
            https_rewrite: config.git.https_rewrite,
            input_file: PathBuf::from(DEFAULT_INPUT_FILE),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            logs_file: PathBuf::from(DEFAULT_LOGS_FILE),
            workdir: config.workdir.clone(),
            command_timeout: match config.command_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }

    pub fn with_devices(mut self, devices: Devices) -> Self {
        self.devices = devices;
        self
    }

    /// Enable stages; they always run in build, test, scan order
    pub fn with_stages(mut self, stages: &[Stage]) -> Self {
        self.stages = Stage::ALL
            .into_iter()
            .filter(|s| stages.contains(s))
            .collect();
        self
    }

    pub fn with_skip_setup(mut self, skip_setup: bool) -> Self {
        self.skip_setup = skip_setup;
        self
    }

    pub fn with_sdk_ref(mut self, sdk_ref: impl Into<String>) -> Self {
        self.sdk_ref = sdk_ref.into();
        self
    }

    pub fn with_files(mut self, input: PathBuf, output: PathBuf, logs: PathBuf) -> Self {
        self.input_file = input;
        self.output_file = output;
        self.logs_file = logs;
        self
    }

    pub fn with_workdir(mut self, workdir: PathBuf) -> Self {
        self.workdir = workdir;
        self
    }

    /// Resolve the workdir against `base` when it is relative
    pub fn resolve_workdir(mut self, base: &Path) -> Self {
        if self.workdir.is_relative() {
            self.workdir = base.join(&self.workdir);
        }
        self
    }

    pub fn runs(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Clone directory of the SDK
    pub fn sdk_path(&self) -> PathBuf {
        self.workdir.join(&self.sdk_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceModel;

    #[test]
    fn test_defaults() {
        let config = TesterConfig::default();
        assert_eq!(config.sdk.name, "sdk");
        assert_eq!(config.sdk.default_ref, "origin/master");
        assert!(config.git.https_rewrite);
        assert_eq!(config.workdir, PathBuf::from("workdir"));
    }

    #[test]
    fn test_run_config_from_file_settings() {
        let mut config = TesterConfig::default();
        config.command_timeout_secs = 600;

        let run = RunConfig::from_config(&config)
            .with_devices(Devices::select(&[DeviceModel::Stax]))
            .with_stages(&[Stage::Scan, Stage::Build])
            .resolve_workdir(Path::new("/ci"));

        assert_eq!(run.stages, vec![Stage::Build, Stage::Scan]);
        assert!(run.runs(Stage::Build));
        assert!(!run.runs(Stage::Test));
        assert_eq!(run.command_timeout, Some(Duration::from_secs(600)));
        assert_eq!(run.sdk_path(), PathBuf::from("/ci/workdir/sdk"));
        assert_eq!(run.devices.selected_names(), "stax");
    }

    #[test]
    fn test_zero_timeout_is_none() {
        let run = RunConfig::from_config(&TesterConfig::default());
        assert_eq!(run.command_timeout, None);
    }

    #[test]
    fn test_absolute_workdir_kept() {
        let run = RunConfig::from_config(&TesterConfig::default())
            .with_workdir(PathBuf::from("/tmp/w"))
            .resolve_workdir(Path::new("/ci"));
        assert_eq!(run.workdir, PathBuf::from("/tmp/w"));
    }
}
