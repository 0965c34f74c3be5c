//! app-tester - build, test and scan embedded applications across devices

mod cli;
mod exit_codes;

use std::path::PathBuf;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::{output, Cli};

fn main() {
    let cli = Cli::parse();
    let _guard = init_tracing(console_level(cli.verbose, cli.quiet));

    if let Err(e) = cli.execute() {
        output::error(&format!("{e:#}"));
        std::process::exit(exit_codes::for_error(&e));
    }
}

fn console_level(verbose: bool, quiet: bool) -> &'static str {
    match (verbose, quiet) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => "info",
    }
}

/// Console logs go to stderr, filtered by RUST_LOG or `level`. Debug-level
/// JSON goes to a daily file under ~/.app-tester/logs/ when it can be created.
fn init_tracing(level: &str) -> Option<WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (file, guard) = match log_directory() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "app-tester.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}

fn log_directory() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(".app-tester").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_level() {
        assert_eq!(console_level(false, false), "info");
        assert_eq!(console_level(true, false), "debug");
        assert_eq!(console_level(false, true), "error");
        assert_eq!(console_level(true, true), "debug");
    }
}
