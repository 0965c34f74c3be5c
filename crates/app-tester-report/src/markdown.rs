//! Markdown report table

use app_tester_core::{AppResult, DeviceModel, DeviceResult, Stage};

use crate::status::count_status;

const FAIL_ICON: &str = ":red_circle:";
const SUCCESS_ICON: &str = ":heavy_check_mark:";
const SKIP_ICON: &str = ":fast_forward:";

/// Cell icon for one device. Any failure wins over any success; devices
/// kept from running by policy or lack of variants show the skip icon.
pub fn status_icon(result: Option<&DeviceResult>) -> &'static str {
    match result {
        Some(r) if r.has_fail() => FAIL_ICON,
        Some(r) if r.has_success() => SUCCESS_ICON,
        Some(DeviceResult::Skipped | DeviceResult::Blacklisted) => SKIP_ICON,
        _ => "",
    }
}

/// One row per application, one column per device
pub fn render_table(apps: &[AppResult], stage: Stage) -> String {
    let mut table = String::from("| App Name |");
    let mut separator = String::from("|----------|");
    for model in DeviceModel::ALL {
        table.push_str(&format!(" {model} |"));
        separator.push_str(&format!("{}|", "-".repeat(model.as_str().len() + 2)));
    }
    table.push('\n');
    table.push_str(&separator);
    table.push('\n');

    for app in apps {
        let devices = app.stage(stage);
        let mut row = format!("| {} |", app.name);
        for model in DeviceModel::ALL {
            let result = devices.and_then(|d| d.get(model.as_str()));
            row.push_str(&format!(" {} |", status_icon(result)));
        }
        table.push_str(&row);
        table.push('\n');
    }

    table
}

/// Table followed by the status counts
pub fn render_markdown(apps: &[AppResult], stage: Stage) -> String {
    let mut markdown = render_table(apps, stage);
    markdown.push_str(&count_status(apps, stage).to_string());
    markdown
}
