//! Output formatting utilities

use console::style;

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

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line, with keys padded to `width`
pub fn key_value(key: &str, value: &str, width: usize) -> String {
    let label = format!("{}:", key);
    format!("  {} {}", style(format!("{:width$}", label, width = width + 1)).dim(), value)
}
