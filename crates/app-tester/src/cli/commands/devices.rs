//! select-devices command

use clap::Args;
use tracing::info;

use app_tester_core::Devices;
use app_tester_report::github;

use crate::cli::{output, Cli, DeviceArgs};

/// Events that always exercise every device
const FULL_RUN_EVENTS: [&str; 2] = ["schedule", "pull_request"];

/// Compute the device list for a CI event and publish it as a step output
#[derive(Debug, Args)]
pub struct DevicesCommand {
    /// GitHub event name
    #[arg(short, long)]
    pub event: String,

    /// Output variable receiving the device list
    #[arg(short, long, default_value = "devices")]
    pub output: String,

    #[command(flatten)]
    pub devices: DeviceArgs,
}

impl DevicesCommand {
    /// Devices for the event: every device on scheduled and PR runs
    pub fn selection(&self) -> Devices {
        if FULL_RUN_EVENTS.contains(&self.event.as_str()) {
            Devices::all()
        } else {
            self.devices.devices()
        }
    }

    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let devices = self.selection().selected_names();
        info!(event = %self.event, devices = %devices, "devices selected");

        println!("{devices}");
        if !github::set_output(&self.output, &devices)? && cli.show_text() {
            output::info("GITHUB_OUTPUT is not set, device list only printed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(event: &str, devices: DeviceArgs) -> DevicesCommand {
        DevicesCommand {
            event: event.to_string(),
            output: "devices".to_string(),
            devices,
        }
    }

    #[test]
    fn test_full_run_events_select_everything() {
        for event in ["schedule", "pull_request"] {
            let cmd = command(event, DeviceArgs::default());
            assert_eq!(cmd.selection().selected_names(), "nanos nanosp nanox stax");
        }
    }

    #[test]
    fn test_manual_event_uses_flags() {
        let cmd = command(
            "workflow_dispatch",
            DeviceArgs {
                nanox: true,
                stax: true,
                ..Default::default()
            },
        );
        assert_eq!(cmd.selection().selected_names(), "nanox stax");
    }
}
