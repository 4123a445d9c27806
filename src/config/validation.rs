//! Validation logic for settings and whole config documents.

use anyhow::Result;
use serde_json::Value;

use super::{json_type_name, Config, DatasetSettings};
use crate::topology::CheckKind;
use crate::validation::{self, Severity, ValidationIssue};

impl DatasetSettings {
    /// Validate settings after merging
    pub fn validate(&self) -> Result<()> {
        check_non_negative("tolerances.gap", self.tolerances.gap)?;
        check_non_negative("tolerances.overlap", self.tolerances.overlap)?;
        check_non_negative("min_intersection_area", self.min_intersection_area)?;

        if self.id_attribute.trim().is_empty() {
            anyhow::bail!("id_attribute must not be empty");
        }
        if self.output_folder_name.trim().is_empty() {
            anyhow::bail!("output_folder_name must not be empty");
        }

        self.rules.validate()
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("{} must be a non-negative number, got {}", name, value);
    }
    Ok(())
}

/// JSON Schema for config files
pub const CONFIG_SCHEMA: &str = r##"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["global_settings", "dataset_rules"],
  "properties": {
    "global_settings": {
      "type": "object",
      "required": ["enabled_checks", "tolerances"],
      "allOf": [{ "$ref": "#/$defs/settings" }]
    },
    "dataset_rules": {
      "type": "object",
      "additionalProperties": { "$ref": "#/$defs/settings" }
    }
  },
  "$defs": {
    "non_negative": { "type": "number", "minimum": 0 },
    "condition": {
      "type": "object",
      "required": ["attribute", "values"],
      "properties": {
        "attribute": { "type": "string", "minLength": 1 },
        "values": { "type": "array" }
      }
    },
    "settings": {
      "type": "object",
      "properties": {
        "id_attribute": { "type": "string", "minLength": 1 },
        "output_folder_name": { "type": "string", "minLength": 1 },
        "min_intersection_area": { "$ref": "#/$defs/non_negative" },
        "measure": { "enum": ["planar", "geodesic"] },
        "enabled_checks": {
          "type": "object",
          "additionalProperties": { "type": "boolean" }
        },
        "tolerances": {
          "type": "object",
          "properties": {
            "gap": { "$ref": "#/$defs/non_negative" },
            "overlap": { "$ref": "#/$defs/non_negative" }
          }
        },
        "allow_intersection_if": { "type": "array", "items": { "$ref": "#/$defs/condition" } },
        "allow_overlap_if": { "type": "array", "items": { "$ref": "#/$defs/condition" } }
      }
    }
  }
}"##;

/// Validate a whole config document: structure first, then the effective
/// settings of every dataset type.
pub fn validate_config(config: &Config) -> Result<Vec<ValidationIssue>> {
    let item = config
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let mut issues = Vec::new();

    let schema: Value = serde_json::from_str(CONFIG_SCHEMA)?;
    for error in validation::validate_json(&schema, config.document())? {
        issues.push(ValidationIssue::new(Severity::Error, &item, error));
    }

    if let Some(global) = config.document().get("global_settings") {
        issues.extend(unknown_checks(&item, "global_settings", global));
    }

    let dataset_rules = config.document().get("dataset_rules");
    let types = config.dataset_types();
    if types.is_empty() {
        issues.push(
            ValidationIssue::new(Severity::Warning, &item, "No dataset types defined")
                .with_suggestion("Add an entry under dataset_rules, e.g. \"roads\": {}"),
        );
    }

    for dataset_type in &types {
        let location = format!("dataset_rules.{}", dataset_type);
        let entry = dataset_rules.and_then(|rules| rules.get(dataset_type));

        if let Some(entry) = entry {
            issues.extend(unknown_checks(&item, &location, entry));
        }

        match config.settings_for(dataset_type) {
            Ok(settings) => {
                if settings.rules.is_empty() {
                    issues.push(ValidationIssue::new(
                        Severity::Info,
                        &item,
                        format!(
                            "{}: no attribute rules, every intersection and overlap is reported",
                            location
                        ),
                    ));
                }
            }
            Err(e) => issues.push(ValidationIssue::new(
                Severity::Error,
                &item,
                format!("{}: {:#}", location, e),
            )),
        }
    }

    Ok(issues)
}

/// Warn about `enabled_checks` keys that name no check
fn unknown_checks(item: &str, location: &str, settings: &Value) -> Vec<ValidationIssue> {
    let Some(checks) = settings.get("enabled_checks") else {
        return Vec::new();
    };
    let Some(checks) = checks.as_object() else {
        return vec![ValidationIssue::new(
            Severity::Error,
            item,
            format!(
                "{}.enabled_checks must be an object, got {}",
                location,
                json_type_name(checks)
            ),
        )];
    };

    checks
        .keys()
        .filter(|name| name.parse::<CheckKind>().is_err())
        .map(|name| {
            ValidationIssue::new(
                Severity::Warning,
                item,
                format!("{}.enabled_checks: unknown check '{}'", location, name),
            )
            .with_suggestion(format!("Known checks: {}", CheckKind::names().join(", ")))
        })
        .collect()
}
