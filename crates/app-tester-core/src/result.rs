//! Result model
//!
//! Per-device outcomes for the build, test and scan stages, and the
//! per-application record that collects them. The JSON shape matches what
//! downstream pipeline steps read:
//!
//! ```json
//! {"name": "app", "build": {"nanos": {"v1": "Success", "v2": "Fail"}}, "test": {"nanox": "Fail"}}
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Pass/fail of one command run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Success,
    Fail,
}

impl Status {
    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Fail => "Fail",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant name to status, one entry per declared variant
pub type VariantResult = BTreeMap<String, Status>;

/// Device name to result, for one stage
pub type DeviceResults = BTreeMap<String, DeviceResult>;

/// Outcome of one stage on one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DeviceResultRepr", into = "DeviceResultRepr")]
pub enum DeviceResult {
    /// Variants were built, one status each
    Ran(VariantResult),
    /// A single status (the test stage)
    Status(Status),
    /// No variants declared for the device
    Skipped,
    /// Excluded by the application's blacklist, or absent from its whitelist
    Blacklisted,
    /// Device not requested in this run
    Unselected,
}

impl DeviceResult {
    /// Whether any recorded status is `Fail`
    pub fn has_fail(&self) -> bool {
        match self {
            Self::Ran(variants) => variants.values().any(|s| *s == Status::Fail),
            Self::Status(status) => *status == Status::Fail,
            _ => false,
        }
    }

    /// Whether any recorded status is `Success`
    pub fn has_success(&self) -> bool {
        match self {
            Self::Ran(variants) => variants.values().any(|s| *s == Status::Success),
            Self::Status(status) => *status == Status::Success,
            _ => false,
        }
    }

    /// Whether this result belongs in a report. Unselected devices and
    /// devices with nothing to run are left out.
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Ran(variants) => !variants.is_empty(),
            Self::Status(_) | Self::Blacklisted => true,
            Self::Skipped | Self::Unselected => false,
        }
    }

    /// Names of failing variants, in key order
    pub fn failed_variants(&self) -> Vec<&str> {
        match self {
            Self::Ran(variants) => variants
                .iter()
                .filter(|(_, s)| **s == Status::Fail)
                .map(|(v, _)| v.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DeviceResultRepr {
    Variants(VariantResult),
    Word(ResultWord),
}

#[derive(Serialize, Deserialize)]
enum ResultWord {
    Success,
    Fail,
    Skipped,
    Blacklisted,
    Unselected,
}

impl From<DeviceResultRepr> for DeviceResult {
    fn from(repr: DeviceResultRepr) -> Self {
        match repr {
            DeviceResultRepr::Variants(v) => Self::Ran(v),
            DeviceResultRepr::Word(ResultWord::Success) => Self::Status(Status::Success),
            DeviceResultRepr::Word(ResultWord::Fail) => Self::Status(Status::Fail),
            DeviceResultRepr::Word(ResultWord::Skipped) => Self::Skipped,
            DeviceResultRepr::Word(ResultWord::Blacklisted) => Self::Blacklisted,
            DeviceResultRepr::Word(ResultWord::Unselected) => Self::Unselected,
        }
    }
}

impl From<DeviceResult> for DeviceResultRepr {
    fn from(result: DeviceResult) -> Self {
        match result {
            DeviceResult::Ran(v) => Self::Variants(v),
            DeviceResult::Status(Status::Success) => Self::Word(ResultWord::Success),
            DeviceResult::Status(Status::Fail) => Self::Word(ResultWord::Fail),
            DeviceResult::Skipped => Self::Word(ResultWord::Skipped),
            DeviceResult::Blacklisted => Self::Word(ResultWord::Blacklisted),
            DeviceResult::Unselected => Self::Word(ResultWord::Unselected),
        }
    }
}

/// Pipeline stage, also the key under which its results are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Build,
    Test,
    Scan,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Self::Build, Self::Test, Self::Scan];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Test => "test",
            Self::Scan => "scan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "build" => Some(Self::Build),
            "test" => Some(Self::Test),
            "scan" | "scan_build" | "scan-build" => Some(Self::Scan),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Everything one run learned about one application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppResult {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<DeviceResults>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<DeviceResults>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan: Option<DeviceResults>,
}

impl AppResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn stage(&self, stage: Stage) -> Option<&DeviceResults> {
        match stage {
            Stage::Build => self.build.as_ref(),
            Stage::Test => self.test.as_ref(),
            Stage::Scan => self.scan.as_ref(),
        }
    }

    /// Store a stage's results. An empty map leaves the stage absent.
    pub fn set_stage(&mut self, stage: Stage, results: DeviceResults) {
        let value = if results.is_empty() {
            None
        } else {
            Some(results)
        };

        match stage {
            Stage::Build => self.build = value,
            Stage::Test => self.test = value,
            Stage::Scan => self.scan = value,
        }
    }

    /// Whether any device of the stage recorded a failure
    pub fn has_failure(&self, stage: Stage) -> bool {
        self.stage(stage)
            .map(|devices| devices.values().any(DeviceResult::has_fail))
            .unwrap_or(false)
    }

    /// Number of failing device results across all stages
    pub fn failure_count(&self) -> usize {
        Stage::ALL
            .iter()
            .filter_map(|s| self.stage(*s))
            .flat_map(|devices| devices.values())
            .filter(|r| r.has_fail())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_result_wire_format() {
        let mut variants = VariantResult::new();
        variants.insert("v1".to_string(), Status::Success);
        variants.insert("v2".to_string(), Status::Fail);

        assert_eq!(
            serde_json::to_value(DeviceResult::Ran(variants)).unwrap(),
            json!({"v1": "Success", "v2": "Fail"})
        );
        assert_eq!(
            serde_json::to_value(DeviceResult::Status(Status::Fail)).unwrap(),
            json!("Fail")
        );
        assert_eq!(
            serde_json::to_value(DeviceResult::Blacklisted).unwrap(),
            json!("Blacklisted")
        );
    }

    #[test]
    fn test_device_result_parse() {
        let ran: DeviceResult = serde_json::from_value(json!({"v1": "Fail"})).unwrap();
        assert!(ran.has_fail());
        assert_eq!(ran.failed_variants(), vec!["v1"]);

        let scalar: DeviceResult = serde_json::from_value(json!("Success")).unwrap();
        assert_eq!(scalar, DeviceResult::Status(Status::Success));

        let skipped: DeviceResult = serde_json::from_value(json!("Skipped")).unwrap();
        assert_eq!(skipped, DeviceResult::Skipped);

        assert!(serde_json::from_value::<DeviceResult>(json!("Broken")).is_err());
    }

    #[test]
    fn test_reportable() {
        assert!(!DeviceResult::Unselected.is_reportable());
        assert!(!DeviceResult::Skipped.is_reportable());
        assert!(!DeviceResult::Ran(VariantResult::new()).is_reportable());
        assert!(DeviceResult::Blacklisted.is_reportable());
        assert!(DeviceResult::Status(Status::Fail).is_reportable());
    }

    #[test]
    fn test_app_result_omits_empty_stages() {
        let mut app = AppResult::new("A");
        app.set_stage(Stage::Build, DeviceResults::new());

        let mut tests = DeviceResults::new();
        tests.insert("nanox".to_string(), DeviceResult::Status(Status::Fail));
        app.set_stage(Stage::Test, tests);

        assert_eq!(
            serde_json::to_value(&app).unwrap(),
            json!({"name": "A", "test": {"nanox": "Fail"}})
        );
        assert!(app.has_failure(Stage::Test));
        assert!(!app.has_failure(Stage::Build));
        assert_eq!(app.failure_count(), 1);
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!(Stage::parse("scan_build"), Some(Stage::Scan));
        assert_eq!(Stage::parse("BUILD"), Some(Stage::Build));
        assert_eq!(Stage::parse("deploy"), None);
    }
}
