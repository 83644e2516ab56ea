//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! Listing order is presentation order: most recent entry first, the
//! reverse of how the store keeps them.

use std::path::PathBuf;

use daybook_core::Entry;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Render-time state of an entry's attached image
#[derive(Debug)]
pub enum ImageStatus {
    /// Grant held and resource reachable
    Resolved(PathBuf),
    /// Reference present but no longer resolvable; shown degraded
    Unavailable(String),
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single entry in full
    pub fn print_entry(&self, entry: &Entry, image: Option<&ImageStatus>) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", entry.id);
                println!("Created: {}", entry.created_at);
                if !entry.text.is_empty() {
                    println!();
                    println!("{}", entry.text);
                }
                match image {
                    Some(ImageStatus::Resolved(path)) => {
                        println!();
                        println!("Image: {}", path.display());
                    }
                    Some(ImageStatus::Unavailable(reason)) => {
                        println!();
                        println!("Image: (unavailable: {})", reason);
                    }
                    None => {}
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(entry).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", entry.id);
            }
        }
    }

    /// Print the collection, most recent first
    pub fn print_entries(&self, entries: &[Entry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No entries yet.");
                    return;
                }
                for entry in entries.iter().rev() {
                    let image_indicator = if entry.image_ref.is_some() {
                        " [image]"
                    } else {
                        ""
                    };
                    println!(
                        "{} | {} | {}{}",
                        entry.id,
                        entry.created_at,
                        truncate_line(&entry.text, 50),
                        image_indicator
                    );
                }
                println!("\n{} entry(ies)", entries.len());
            }
            OutputFormat::Json => {
                let reversed: Vec<_> = entries.iter().rev().collect();
                println!("{}", serde_json::to_string_pretty(&reversed).unwrap());
            }
            OutputFormat::Quiet => {
                for entry in entries.iter().rev() {
                    println!("{}", entry.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning that must reach the user even in JSON mode
    pub fn warn(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("⚠ {}", message),
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({"status": "warning", "message": message}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
        assert_eq!(
            truncate_line("very long single line here", 10),
            "very lo..."
        );
    }

    #[test]
    fn test_truncate_is_char_safe() {
        // Multi-byte characters must not be split mid-codepoint
        assert_eq!(truncate("ééééééééééé", 10), "ééééééé...");
    }
}
