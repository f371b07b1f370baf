//! # Output Formatting
//!
//! Provides formatted output functions with colors, emojis, and consistent
//! styling for user-facing messages. Colors honour `--colors` through
//! owo-colors' global override, so every styled value goes through
//! `if_supports_color`.

use owo_colors::{OwoColorize, Stream, Style};

/// Enum representing different color modes for output
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
  /// Enable colored output
  Yes,
  /// Enable colored output (alias for Yes)
  Always,
  /// Automatically detect if colors should be used based on terminal
  /// capabilities
  Auto,
  /// Disable colored output
  No,
  /// Disable colored output (alias for No)
  Never,
}

impl ColorMode {
  /// Set the global color override for the rest of the process.
  pub fn apply(self) {
    match self {
      ColorMode::Always | ColorMode::Yes => owo_colors::set_override(true),
      ColorMode::Never | ColorMode::No => owo_colors::set_override(false),
      ColorMode::Auto => {
        // Let owo_colors detect the terminal itself
      }
    }
  }
}

/// Helper function to safely get an emoji or fallback to a default character
pub fn get_emoji_or_default(name: &str, default: &str) -> String {
  match emojis::get_by_shortcode(name) {
    Some(emoji) => emoji.to_string(),
    None => default.to_string(),
  }
}

fn styled(text: &str, stream: Stream, style: Style) -> String {
  text.if_supports_color(stream, |text| text.style(style)).to_string()
}

/// Print a success message
pub fn print_success(message: &str) {
  let check = get_emoji_or_default("white_check_mark", "✓");
  println!("{} {}", styled(&check, Stream::Stdout, Style::new().green().bold()), message);
}

/// Print an error message
pub fn print_error(message: &str) {
  let cross = get_emoji_or_default("x", "✗");
  eprintln!("{} {}", styled(&cross, Stream::Stderr, Style::new().red().bold()), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
  let warning = get_emoji_or_default("warning", "⚠");
  println!("{} {}", styled(&warning, Stream::Stdout, Style::new().yellow().bold()), message);
}

/// Print a notice: stale, but not where the user is working
pub fn print_notice(message: &str) {
  println!("{} {}", styled("•", Stream::Stdout, Style::new().yellow()), message);
}

/// Print an info message
pub fn print_info(message: &str) {
  let info = get_emoji_or_default("information_source", "ℹ");
  println!("{} {}", styled(&info, Stream::Stdout, Style::new().blue().bold()), message);
}

/// Print a section header
pub fn print_header(header: &str) {
  println!("\n{}", styled(header, Stream::Stdout, Style::new().blue().bold()));
}

/// Format a repository path
pub fn format_repo_path(path: &str) -> String {
  styled(path, Stream::Stdout, Style::new().bright_green())
}

/// Format a repository name
pub fn format_repo_name(name: &str) -> String {
  styled(name, Stream::Stdout, Style::new().bright_cyan().bold())
}

/// Format a branch name
pub fn format_branch(name: &str) -> String {
  styled(name, Stream::Stdout, Style::new().purple())
}

/// Format a commit count
pub fn format_count(count: u64) -> String {
  styled(&count.to_string(), Stream::Stdout, Style::new().bold())
}

/// "1 commit", "3 commits"
pub fn commits(count: u64) -> String {
  if count == 1 {
    format!("{} commit", format_count(count))
  } else {
    format!("{} commits", format_count(count))
  }
}
