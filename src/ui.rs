//! Terminal formatting: check status icons, colors and quiet mode.

use colored::{ColoredString, Colorize};

/// Environment variable enabling quiet mode, set by `--quiet`
pub const QUIET_ENV: &str = "TOPOTEST_QUIET";

/// Check if quiet mode is enabled via environment variable or --quiet flag
pub fn is_quiet() -> bool {
    std::env::var(QUIET_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Icon for a check result: ✓ (green) when clean, ✗ (red) otherwise
pub fn check_icon(issues: usize) -> ColoredString {
    if issues == 0 {
        "✓".green()
    } else {
        "✗".red()
    }
}

/// Color scheme for report output
pub mod colors {
    use colored::{ColoredString, Colorize};

    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    /// Cyan for identifiers (dataset types, check names)
    pub fn identifier(text: &str) -> ColoredString {
        text.cyan()
    }

    /// Dimmed for secondary text such as file paths
    pub fn secondary(text: &str) -> ColoredString {
        text.dimmed()
    }

    pub fn heading(text: &str) -> ColoredString {
        text.bold()
    }
}

/// Common text formatting patterns
pub mod format {
    /// `1 issue` / `3 issues`
    pub fn issues(count: usize) -> String {
        if count == 1 {
            "1 issue".to_string()
        } else {
            format!("{} issues", count)
        }
    }

    /// Format a separator line for sections
    pub fn separator(width: usize) -> String {
        "─".repeat(width)
    }
}
