//! Application input records
//!
//! One [`ApplicationSpec`] per repository to process, read from the input
//! JSON array. Records are read-only for the whole run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::device::DeviceModel;
use crate::error::{Result, TesterError};

/// An application to clone, build, test and scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSpec {
    /// Repository name, also the clone directory name
    pub name: String,

    /// Clone URL
    pub url: String,

    /// Git ref to check out
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Makefile directory, relative to the clone
    pub build_path: String,

    /// Test directory, relative to the clone
    pub test_dir: String,

    /// Makefile parameter that selects a variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_param: Option<String>,

    pub variants_nanos: Vec<String>,
    pub variants_nanosp: Vec<String>,
    pub variants_nanox: Vec<String>,
    pub variants_stax: Vec<String>,

    /// Devices excluded from the build stage
    pub build_blacklist: Vec<String>,

    /// Devices excluded from the test stage
    pub test_blacklist: Vec<String>,

    /// Devices the scan stage may run on
    pub scan_whitelist: Vec<String>,

    /// Extra arguments appended to `make`
    pub extra_flags: String,

    pub test_param_nanos: String,
    pub test_param_nanosp: String,
    pub test_param_nanox: String,
    pub test_param_stax: String,
}

impl ApplicationSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            build_path: ".".to_string(),
            test_dir: ".".to_string(),
            ..Default::default()
        }
    }

    /// Declared variants for a device, in declaration order
    pub fn variants(&self, model: DeviceModel) -> &[String] {
        match model {
            DeviceModel::Nanos => &self.variants_nanos,
            DeviceModel::Nanosp => &self.variants_nanosp,
            DeviceModel::Nanox => &self.variants_nanox,
            DeviceModel::Stax => &self.variants_stax,
        }
    }

    /// Device-specific extra arguments for the test runner
    pub fn test_params(&self, model: DeviceModel) -> &str {
        match model {
            DeviceModel::Nanos => &self.test_param_nanos,
            DeviceModel::Nanosp => &self.test_param_nanosp,
            DeviceModel::Nanox => &self.test_param_nanox,
            DeviceModel::Stax => &self.test_param_stax,
        }
    }

    pub fn is_build_blacklisted(&self, model: DeviceModel) -> bool {
        contains_device(&self.build_blacklist, model)
    }

    pub fn is_test_blacklisted(&self, model: DeviceModel) -> bool {
        contains_device(&self.test_blacklist, model)
    }

    pub fn is_scan_whitelisted(&self, model: DeviceModel) -> bool {
        contains_device(&self.scan_whitelist, model)
    }

    /// Makefile parameter, treating an empty string as absent
    pub fn variant_param(&self) -> Option<&str> {
        self.variant_param.as_deref().filter(|p| !p.is_empty())
    }

    pub fn build_path_or_default(&self) -> &str {
        if self.build_path.is_empty() {
            "."
        } else {
            &self.build_path
        }
    }

    pub fn test_dir_or_default(&self) -> &str {
        if self.test_dir.is_empty() {
            "."
        } else {
            &self.test_dir
        }
    }
}

fn contains_device(list: &[String], model: DeviceModel) -> bool {
    list.iter().any(|d| d == model.as_str())
}

/// Load the input application list
pub fn load_applications(path: &Path) -> Result<Vec<ApplicationSpec>> {
    if !path.exists() {
        return Err(TesterError::InputNotFound(path.to_path_buf()));
    }

    info!(path = %path.display(), "loading application list");
    let content = std::fs::read_to_string(path)?;
    let apps: Vec<ApplicationSpec> = serde_json::from_str(&content)?;
    debug!(count = apps.len(), "application list loaded");
    Ok(apps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INPUT: &str = r#"[
      {
        "name": "app-boilerplate",
        "url": "https://github.com/LedgerHQ/app-boilerplate",
        "ref": "develop",
        "build_path": ".",
        "test_dir": "tests",
        "variant_param": "COIN",
        "variants_nanos": ["BOL", "BOL_TESTNET"],
        "variants_stax": ["BOL"],
        "build_blacklist": ["nanos"],
        "scan_whitelist": ["stax"],
        "test_param_nanox": "--golden_run",
        "owner": "LedgerHQ"
      }
    ]"#;

    #[test]
    fn test_parse_input_record() {
        let apps: Vec<ApplicationSpec> = serde_json::from_str(INPUT).unwrap();
        let app = &apps[0];

        assert_eq!(app.name, "app-boilerplate");
        assert_eq!(app.git_ref, "develop");
        assert_eq!(app.variant_param(), Some("COIN"));
        assert_eq!(app.variants(DeviceModel::Nanos), ["BOL", "BOL_TESTNET"]);
        assert!(app.variants(DeviceModel::Nanox).is_empty());
        assert!(app.is_build_blacklisted(DeviceModel::Nanos));
        assert!(!app.is_test_blacklisted(DeviceModel::Nanos));
        assert!(app.is_scan_whitelisted(DeviceModel::Stax));
        assert_eq!(app.test_params(DeviceModel::Nanox), "--golden_run");
        assert_eq!(app.test_params(DeviceModel::Stax), "");
    }

    #[test]
    fn test_missing_paths_default_to_clone_root() {
        let app: ApplicationSpec = serde_json::from_str(r#"{"name": "app"}"#).unwrap();
        assert_eq!(app.build_path_or_default(), ".");
        assert_eq!(app.test_dir_or_default(), ".");
        assert_eq!(app.variant_param(), None);
    }

    #[test]
    fn test_empty_variant_param_is_absent() {
        let app: ApplicationSpec =
            serde_json::from_str(r#"{"name": "app", "variant_param": ""}"#).unwrap();
        assert_eq!(app.variant_param(), None);
    }

    #[test]
    fn test_ref_key_round_trips() {
        let mut app = ApplicationSpec::new("app");
        app.git_ref = "main".to_string();
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["ref"], "main");
    }

    #[test]
    fn test_load_missing_input() {
        let temp = TempDir::new().unwrap();
        let err = load_applications(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TesterError::InputNotFound(_)));
    }

    #[test]
    fn test_load_input_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("input.json");
        std::fs::write(&path, INPUT).unwrap();

        let apps = load_applications(&path).unwrap();
        assert_eq!(apps.len(), 1);
    }
}
