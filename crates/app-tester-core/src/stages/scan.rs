//! Static analysis stage
//!
//! Runs the SDK's `scan-build` target with warnings as errors. Only devices
//! on the application's scan whitelist are analysed.

use std::path::Path;

use tracing::info;

use super::{gate, join_command, make_env, run_variants, AppPaths, DeviceOutcome};
use crate::application::ApplicationSpec;
use crate::device::Device;
use crate::result::Stage;
use crate::runner::CommandRunner;

/// Analysis command for one variant
pub fn scan_command(device: &Device, sdk: &Path, variant_param: Option<&str>, variant: &str) -> String {
    let env = make_env(device, sdk);
    let selector = variant_param
        .map(|param| format!("{param}={variant}"))
        .unwrap_or_default();

    join_command(&[&env, "make", &selector, "-j", "ENABLE_SDK_WERROR=1", "scan-build"])
}

/// Analyse every variant of the application for one device
pub async fn scan_device(
    runner: &dyn CommandRunner,
    device: &Device,
    app: &ApplicationSpec,
    paths: &AppPaths,
) -> DeviceOutcome {
    if let Some(result) = gate(Stage::Scan, device, app) {
        return DeviceOutcome::new(result);
    }

    info!(app = %app.name, device = %device.model, "scanning");
    run_variants(runner, device, app, paths, |variant| {
        scan_command(device, &paths.sdk, app.variant_param(), variant)
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::device::DeviceModel;
    use crate::result::{DeviceResult, Status};
    use crate::runner::testing::ScriptedRunner;

    fn paths() -> AppPaths {
        AppPaths {
            sdk: PathBuf::from("/w/sdk"),
            build: PathBuf::from("/w/app"),
            test: PathBuf::from("/w/app"),
        }
    }

    #[test]
    fn test_scan_command() {
        let stax = Device::new(DeviceModel::Stax, true);
        assert_eq!(
            scan_command(&stax, Path::new("/w/sdk"), Some("CHAIN"), "eth"),
            "TARGET=stax BOLOS_SDK=/w/sdk make CHAIN=eth -j ENABLE_SDK_WERROR=1 scan-build"
        );
        assert_eq!(
            scan_command(&stax, Path::new("/w/sdk"), None, "eth"),
            "TARGET=stax BOLOS_SDK=/w/sdk make -j ENABLE_SDK_WERROR=1 scan-build"
        );
    }

    #[tokio::test]
    async fn test_scan_only_whitelisted_devices() {
        let mut app = ApplicationSpec::new("app");
        app.variants_nanox = vec!["a".to_string()];
        app.variants_stax = vec!["a".to_string()];
        app.scan_whitelist = vec!["stax".to_string()];
        app.extra_flags = "DEBUG=1".to_string();

        let runner = ScriptedRunner::new().failing_on("scan-build");

        let nanox = scan_device(&runner, &Device::new(DeviceModel::Nanox, true), &app, &paths()).await;
        assert_eq!(nanox.result, DeviceResult::Blacklisted);
        assert!(runner.calls().is_empty());

        let stax = scan_device(&runner, &Device::new(DeviceModel::Stax, true), &app, &paths()).await;
        let DeviceResult::Ran(variants) = stax.result else {
            panic!("expected variant results");
        };
        assert_eq!(variants["a"], Status::Fail);
        assert!(stax.log.contains("scan-build"));
        assert!(runner.commands().iter().all(|c| !c.contains("DEBUG=1")));
    }

    #[tokio::test]
    async fn test_no_variants_runs_nothing() {
        let mut app = ApplicationSpec::new("app");
        app.scan_whitelist = vec!["nanox".to_string()];

        let runner = ScriptedRunner::new();
        let outcome = scan_device(&runner, &Device::new(DeviceModel::Nanox, true), &app, &paths()).await;

        assert_eq!(outcome.result, DeviceResult::Skipped);
        assert!(runner.calls().is_empty());
    }
}
