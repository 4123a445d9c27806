//! JSON Schema validation and validation issue reporting.
//!
//! Config files are checked against an embedded schema before their settings
//! are interpreted. Issues carry a severity so callers can decide between
//! failing and warning.

use anyhow::Result;
use colored::Colorize;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning - should be addressed but not critical
    Warning,
    /// Error - must be fixed
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A single validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Item being validated (config file path)
    pub item_id: String,
    pub message: String,
    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(severity: Severity, item_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            item_id: item_id.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion to this issue
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Display the issue with colored output
    pub fn display(&self) {
        let icon = match self.severity {
            Severity::Info => "ℹ".blue(),
            Severity::Warning => "⚠".yellow(),
            Severity::Error => "✗".red(),
        };

        println!("  {} [{}] {}", icon, self.severity, self.message);

        if let Some(ref suggestion) = self.suggestion {
            println!("      {} {}", "→".cyan(), suggestion);
        }
    }
}

/// Count issues of the given severity
pub fn count(issues: &[ValidationIssue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

fn compile_schema(schema: &serde_json::Value) -> Result<jsonschema::Validator> {
    jsonschema::validator_for(schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile JSON schema: {}", e))
}

/// Validate a JSON document against a schema, returning one message per error.
///
/// Messages are prefixed with the JSON pointer of the offending value.
pub fn validate_json(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Result<Vec<String>> {
    let validator = compile_schema(schema)?;

    let errors = validator
        .iter_errors(instance)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("at '{}': {}", path, e)
            }
        })
        .collect();

    Ok(errors)
}
