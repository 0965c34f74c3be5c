//! Terminal output helpers

use console::{style, Style};

use app_tester_report::StatusCounts;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Indented `key: value` line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Status counts, failures highlighted when there are any
pub fn counts(counts: &StatusCounts) -> String {
    let fail = if counts.fail > 0 {
        style(counts.fail).red().bold()
    } else {
        style(counts.fail).green()
    };
    [
        key_value("Success", &style(counts.success).green().to_string()),
        key_value("Failures", &fail.to_string()),
        key_value("Total", &counts.total.to_string()),
    ]
    .join("\n")
}
