//! Terminal output helpers
//!
//! Coloured status lines for the interactive rippers. These go to stdout and
//! are what the user reads; tracing goes to the log file.

use console::{style, Style};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════
// Colours
// ═══════════════════════════════════════════════════════════════

pub fn success() -> Style {
    Style::new().green()
}

pub fn error() -> Style {
    Style::new().red()
}

pub fn warning() -> Style {
    Style::new().yellow()
}

pub fn info() -> Style {
    Style::new().cyan()
}

pub fn header() -> Style {
    Style::new().magenta().bold()
}

pub fn emphasis() -> Style {
    Style::new().bold()
}

// ═══════════════════════════════════════════════════════════════
// Messages
// ═══════════════════════════════════════════════════════════════

pub const HEADER_WIDTH: usize = 60;

/// Title centred inside a `=` rule, the same width as the rule.
pub fn header_lines(title: &str) -> [String; 3] {
    let rule = "=".repeat(HEADER_WIDTH);
    let centred = format!("{:^width$}", title, width = HEADER_WIDTH);
    [rule.clone(), centred, rule]
}

pub fn print_header(title: &str) {
    println!();
    for line in header_lines(title) {
        println!("{}", header().apply_to(line));
    }
    println!();
}

pub fn print_success(msg: &str) {
    println!("{}", success().apply_to(format!("✓ {}", msg)));
}

pub fn print_error(msg: &str) {
    println!("{}", error().apply_to(format!("✗ {}", msg)));
}

pub fn print_info(msg: &str) {
    println!("{}", info().apply_to(format!("ℹ {}", msg)));
}

pub fn print_warning(msg: &str) {
    println!("{}", warning().apply_to(format!("⚠ {}", msg)));
}

/// Raw tool output (track tables, directory listings) in the info colour.
pub fn print_block(text: &str) {
    println!("\n{}", info().apply_to(text.trim_end()));
}

/// Boxed banner shown once at start-up.
pub fn print_banner(title: &str, subtitle: &str) {
    let inner = HEADER_WIDTH - 1;
    let top = format!("╔{}╗", "═".repeat(inner));
    let bottom = format!("╚{}╝", "═".repeat(inner));
    println!();
    println!("{}", header().apply_to(top));
    println!("{}", header().apply_to(format!("║{:^width$}║", title, width = inner)));
    println!("{}", header().apply_to(format!("║{:^width$}║", subtitle, width = inner)));
    println!("{}", header().apply_to(bottom));
    println!();
}

pub fn fmt_title_number(n: u32) -> String {
    format!("{}", style(format!("{:2}", n)).bold())
}

/// Megabytes with one decimal, the unit used in every rip report line.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

// ═══════════════════════════════════════════════════════════════
// Spinner
// ═══════════════════════════════════════════════════════════════

pub const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ";

/// Spinner for probes that print nothing while they work (disc scans).
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} • ⏱️ {elapsed_precise}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

// ═══════════════════════════════════════════════════════════════
// Interrupt
// ═══════════════════════════════════════════════════════════════

/// Ctrl-C ends the program cleanly: restore the cursor a prompt or spinner
/// may have hidden, say so, exit 0.
pub fn install_interrupt_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        let _ = console::Term::stdout().show_cursor();
        println!();
        println!();
        println!("{}", warning().apply_to("Operation cancelled by user"));
        tracing::info!("Interrupted by user");
        std::process::exit(0);
    })?;
    Ok(())
}
