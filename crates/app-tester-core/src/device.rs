//! Device registry
//!
//! Static table of the hardware targets an application can be built for,
//! plus the per-run selection of which of them are exercised.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A supported hardware model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceModel {
    /// Nano S
    Nanos,
    /// Nano S Plus (SDK target `nanos2`)
    Nanosp,
    /// Nano X
    Nanox,
    /// Stax
    Stax,
}

impl DeviceModel {
    /// Every model, in report column order
    pub const ALL: [DeviceModel; 4] = [Self::Nanos, Self::Nanosp, Self::Nanox, Self::Stax];

    /// Name used in application specs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nanos => "nanos",
            Self::Nanosp => "nanosp",
            Self::Nanox => "nanox",
            Self::Stax => "stax",
        }
    }

    /// Value passed as `TARGET=` to the build
    pub fn target_name(&self) -> &'static str {
        match self {
            Self::Nanos => "nanos",
            Self::Nanosp => "nanos2",
            Self::Nanox => "nanox",
            Self::Stax => "stax",
        }
    }

    /// Environment variable holding this model's SDK path
    pub fn sdk_env_var(&self) -> &'static str {
        match self {
            Self::Nanos => "$NANOS_SDK",
            Self::Nanosp => "$NANOSP_SDK",
            Self::Nanox => "$NANOX_SDK",
            Self::Stax => "$STAX_SDK",
        }
    }

    pub fn api_level(&self) -> u32 {
        match self {
            Self::Nanos => 1,
            Self::Nanosp => 1,
            Self::Nanox => 5,
            Self::Stax => 14,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nanos" => Some(Self::Nanos),
            "nanosp" | "nanos2" => Some(Self::Nanosp),
            "nanox" => Some(Self::Nanox),
            "stax" => Some(Self::Stax),
            _ => None,
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device together with whether this run exercises it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device {
    pub model: DeviceModel,
    pub selected: bool,
}

impl Device {
    pub fn new(model: DeviceModel, selected: bool) -> Self {
        Self { model, selected }
    }

    pub fn target_name(&self) -> &'static str {
        self.model.target_name()
    }

    pub fn model_name(&self) -> &'static str {
        self.model.as_str()
    }

    pub fn sdk_env_var(&self) -> &'static str {
        self.model.sdk_env_var()
    }

    pub fn api_level(&self) -> u32 {
        self.model.api_level()
    }
}

/// The full device table for one run, fixed once from CLI flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Devices {
    devices: [Device; 4],
}

impl Devices {
    /// Select exactly the given models
    pub fn select(models: &[DeviceModel]) -> Self {
        Self {
            devices: DeviceModel::ALL.map(|m| Device::new(m, models.contains(&m))),
        }
    }

    /// Select every model
    pub fn all() -> Self {
        Self::select(&DeviceModel::ALL)
    }

    /// Select nothing
    pub fn none() -> Self {
        Self::select(&[])
    }

    pub fn get(&self, model: DeviceModel) -> Device {
        self.devices[model as usize]
    }

    /// All devices in report order, selected or not
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// Only the selected devices
    pub fn selected(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.selected)
    }

    pub fn any_selected(&self) -> bool {
        self.devices.iter().any(|d| d.selected)
    }

    /// Space-separated list of selected model names
    pub fn selected_names(&self) -> String {
        self.selected()
            .map(|d| d.model_name())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Devices {
    fn default() -> Self {
        Self::none()
    }
}
