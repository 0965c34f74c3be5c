//! Variant discovery
//!
//! Applications declare their variants through the SDK's `listvariants`
//! Makefile target, which prints a line of the form
//! `VARIANTS <PARAM> <variant>...`.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::device::DeviceModel;
use crate::error::{Result, VariantError};
use crate::runner::CommandRunner;

/// Variant parameter and values declared by an application Makefile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    pub param: String,
    pub variants: Vec<String>,
}

/// Command listing the variants for a device
pub fn listvariants_command(model: DeviceModel) -> String {
    format!("make BOLOS_SDK={} listvariants", model.sdk_env_var())
}

/// Extract the variant declaration from `make listvariants` output.
/// Makefile chatter before the `VARIANTS` marker is ignored.
pub fn parse_listvariants(output: &str) -> Result<VariantInfo> {
    let (_, rest) = output
        .split_once("VARIANTS ")
        .ok_or_else(|| VariantError::Missing(output.trim().to_string()))?;

    let line = rest.lines().next().unwrap_or_default();
    let mut tokens = line.split_whitespace().map(str::to_string);

    let param = tokens
        .next()
        .ok_or_else(|| VariantError::Missing(output.trim().to_string()))?;
    let variants: Vec<String> = tokens.collect();
    if variants.is_empty() {
        return Err(VariantError::Empty(param).into());
    }

    Ok(VariantInfo { param, variants })
}

/// Run `listvariants` for one device in `build_path`
pub async fn discover_variants(
    runner: &dyn CommandRunner,
    model: DeviceModel,
    build_path: &Path,
) -> Result<VariantInfo> {
    let outcome = runner
        .run(&listvariants_command(model), build_path, true)
        .await?;
    if !outcome.is_success() {
        return Err(VariantError::Missing(outcome.output.trim().to_string()).into());
    }
    parse_listvariants(&outcome.output)
}

/// Build the `{name, variant_param, variants_<device>...}` fragment for one
/// application. Devices whose discovery fails are left out.
pub async fn variant_fragment(
    runner: &dyn CommandRunner,
    name: &str,
    build_path: &Path,
) -> Map<String, Value> {
    info!(app = name, "generating variants");

    let mut fragment = Map::new();
    fragment.insert("name".to_string(), Value::from(name));

    for model in DeviceModel::ALL {
        match discover_variants(runner, model, build_path).await {
            Ok(info) => {
                fragment.insert("variant_param".to_string(), Value::from(info.param));
                fragment.insert(format!("variants_{model}"), Value::from(info.variants));
            }
            Err(e) => {
                warn!(app = name, device = %model, error = %e, "skipping variant generation");
            }
        }
    }

    fragment
}
