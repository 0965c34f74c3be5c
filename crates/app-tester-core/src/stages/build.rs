//! Build stage

use std::path::Path;

use tracing::info;

use super::{gate, join_command, make_env, run_variants, AppPaths, DeviceOutcome};
use crate::application::ApplicationSpec;
use crate::device::Device;
use crate::result::Stage;
use crate::runner::CommandRunner;

/// `make clean` for a device, run before every build
pub fn clean_command(device: &Device, sdk: &Path) -> String {
    format!("{} make clean", make_env(device, sdk))
}

/// Build command for one variant. Without a variant parameter the default
/// build runs in parallel.
pub fn build_command(
    device: &Device,
    sdk: &Path,
    variant_param: Option<&str>,
    variant: &str,
    extra_flags: &str,
) -> String {
    let env = make_env(device, sdk);
    match variant_param {
        Some(param) => join_command(&[&env, "make", &format!("{param}={variant}"), extra_flags]),
        None => join_command(&[&env, "make", "-j", extra_flags]),
    }
}

/// Build every variant of the application for one device
pub async fn build_device(
    runner: &dyn CommandRunner,
    device: &Device,
    app: &ApplicationSpec,
    paths: &AppPaths,
) -> DeviceOutcome {
    if let Some(result) = gate(Stage::Build, device, app) {
        return DeviceOutcome::new(result);
    }

    info!(app = %app.name, device = %device.model, "building");
    run_variants(runner, device, app, paths, |variant| {
        build_command(device, &paths.sdk, app.variant_param(), variant, &app.extra_flags)
    })
    .await
}
