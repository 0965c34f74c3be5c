//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::CONFIG_FILE_NAMES;
use super::types::TesterConfig;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<TesterConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()).into());
    }

    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: TesterConfig = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Nearest configuration file, walking from `start_dir` up to the root.
///
/// Each directory is checked for `<name>` then `.github/<name>`, for every
/// name in [`CONFIG_FILE_NAMES`] order.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let found = start_dir.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES.iter().find_map(|name| {
            [dir.join(name), dir.join(".github").join(name)]
                .into_iter()
                .find(|candidate| candidate.is_file())
        })
    });

    match &found {
        Some(path) => info!(path = %path.display(), "found config file"),
        None => debug!(start_dir = %start_dir.display(), "no config file found"),
    }
    found
}

/// Load the explicit file if given, else the nearest one, else defaults.
///
/// A file that exists but does not parse or validate is an error.
pub fn load_config_or_default(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<(TesterConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config(dir),
    };

    match path {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            debug!(dir = %dir.display(), "no config found, using defaults");
            Ok((TesterConfig::default(), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TesterError;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("app-tester.toml");
        std::fs::write(&config_path, "workdir = \"w\"").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_github_dir_of_parent() {
        let temp = TempDir::new().unwrap();
        let github_dir = temp.path().join(".github");
        std::fs::create_dir_all(&github_dir).unwrap();
        let config_path = github_dir.join("app-tester.yml");
        std::fs::write(&config_path, "workdir: w").unwrap();

        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_load_config_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("app-tester.toml");
        std::fs::write(
            &config_path,
            r#"
workdir = "build-farm"
command_timeout_secs = 1800

[sdk]
default_ref = "origin/API_LEVEL_14"

[git]
https_rewrite = false
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.workdir, PathBuf::from("build-farm"));
        assert_eq!(config.command_timeout_secs, 1800);
        assert_eq!(config.sdk.default_ref, "origin/API_LEVEL_14");
        assert_eq!(config.sdk.name, "sdk");
        assert!(!config.git.https_rewrite);
    }

    #[test]
    fn test_load_config_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("app-tester.yaml");
        std::fs::write(&config_path, "sdk:\n  name: secure-sdk\n").unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.sdk.name, "secure-sdk");
        assert_eq!(config.workdir, PathBuf::from("workdir"));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("app-tester.toml");
        std::fs::write(&config_path, "[sdk]\nurl = \"\"\n").unwrap();

        let err = load_config_or_default(None, temp.path()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config_or_default(None, temp.path()).unwrap();
        assert_eq!(config, TesterConfig::default());
        assert!(path.is_none());
    }

    #[test]
    fn test_explicit_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_config_or_default(Some(&temp.path().join("x.toml")), temp.path()).unwrap_err();
        assert!(matches!(err, TesterError::Config(ConfigError::NotFound(_))));
    }
}
