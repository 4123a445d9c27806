//! Configuration management for topology tests.
//!
//! A config file holds `global_settings` shared by every dataset type and
//! `dataset_rules` keyed by dataset type. The effective settings for a type
//! are the global settings with the dataset entry's keys laid over them.

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::{CONFIG_ENV, CONFIG_FILE};

pub mod defaults;
pub mod validation;

pub use defaults::*;
pub use validation::*;

/// Where a config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config file was found; built-in defaults apply to every dataset type
    Defaults,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: ConfigSource,
    document: Value,
}

impl Config {
    /// Config used when no file exists: default settings, no rules.
    pub fn defaults() -> Self {
        Self {
            source: ConfigSource::Defaults,
            document: json!({ "global_settings": {}, "dataset_rules": {} }),
        }
    }

    /// Locate and load the config.
    ///
    /// Lookup order:
    /// 1. `explicit` path (must exist)
    /// 2. `$TOPOTEST_CONFIG` (must exist)
    /// 3. `./topotest.json`
    /// 4. Global config (`<config dir>/topotest/config.json`)
    /// 5. Built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(&expand_path(path));
        }

        if let Ok(from_env) = std::env::var(CONFIG_ENV) {
            if !from_env.trim().is_empty() {
                let path = expand_path(Path::new(&from_env));
                if !path.exists() {
                    anyhow::bail!(
                        "Config file named by {} not found: {}",
                        CONFIG_ENV,
                        path.display()
                    );
                }
                return Self::load_from(&path);
            }
        }

        let candidates = std::iter::once(PathBuf::from(CONFIG_FILE)).chain(global_config_path());
        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from(&candidate);
            }
        }

        tracing::debug!("No config file found, using built-in defaults");
        Ok(Self::defaults())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config = Self::parse(&content, ConfigSource::File(path.to_path_buf()))
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str, source: ConfigSource) -> Result<Self> {
        let document: Value =
            serde_json::from_str(content).context("Failed to parse config as JSON")?;

        if !document.is_object() {
            anyhow::bail!("Config root must be a JSON object");
        }

        Ok(Self { source, document })
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            ConfigSource::File(path) => Some(path),
            ConfigSource::Defaults => None,
        }
    }

    /// Raw JSON document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Dataset types configured under `dataset_rules`, sorted
    pub fn dataset_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .document
            .get("dataset_rules")
            .and_then(Value::as_object)
            .map(|rules| rules.keys().cloned().collect())
            .unwrap_or_default();
        types.sort();
        types
    }

    /// Settings from `global_settings` alone
    pub fn global_settings(&self) -> Result<DatasetSettings> {
        let global = self.global_object()?;
        let settings: DatasetSettings = serde_json::from_value(Value::Object(global))
            .context("Failed to parse global_settings")?;
        Ok(settings)
    }

    /// Effective settings for a dataset type.
    ///
    /// The dataset type must exist under `dataset_rules` when the config comes
    /// from a file. With built-in defaults every dataset type is accepted.
    pub fn settings_for(&self, dataset_type: &str) -> Result<DatasetSettings> {
        let mut merged = self.global_object()?;

        match self
            .document
            .get("dataset_rules")
            .and_then(|rules| rules.get(dataset_type))
        {
            Some(Value::Object(rules)) => {
                for (key, value) in rules {
                    merged.insert(key.clone(), value.clone());
                }
            }
            Some(Value::Null) | None => {
                if let ConfigSource::File(path) = &self.source {
                    anyhow::bail!(
                        "Dataset type '{}' not found in config {}. Available types: {}",
                        dataset_type,
                        path.display(),
                        display_types(&self.dataset_types())
                    );
                }
            }
            Some(other) => anyhow::bail!(
                "dataset_rules.{} must be an object, got {}",
                dataset_type,
                json_type_name(other)
            ),
        }

        let settings: DatasetSettings = serde_json::from_value(Value::Object(merged))
            .with_context(|| format!("Failed to parse settings for dataset type '{}'", dataset_type))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Persist command-line overrides into `global_settings` and write the file.
    pub fn save_overrides(&mut self, overrides: &Overrides) -> Result<PathBuf> {
        let path = match &self.source {
            ConfigSource::File(path) => path.clone(),
            ConfigSource::Defaults => anyhow::bail!(
                "No config file to save settings to. Run `topotest config init` first."
            ),
        };

        let mut updated = self.global_settings()?;
        overrides.apply(&mut updated);
        updated.validate()?;

        let root = self
            .document
            .as_object_mut()
            .context("Config root must be a JSON object")?;
        let global = root
            .entry("global_settings")
            .or_insert_with(|| Value::Object(Map::new()));
        if !global.is_object() {
            *global = Value::Object(Map::new());
        }

        global["enabled_checks"] = serde_json::to_value(&updated.enabled_checks)?;
        global["tolerances"] = serde_json::to_value(&updated.tolerances)?;
        if overrides.min_intersection_area.is_some() {
            global["min_intersection_area"] = json!(updated.min_intersection_area);
        }
        if overrides.measure.is_some() {
            global["measure"] = serde_json::to_value(updated.measure)?;
        }

        write_document(&path, &self.document)?;
        tracing::info!(path = %path.display(), "Saved settings to config");
        Ok(path)
    }

    fn global_object(&self) -> Result<Map<String, Value>> {
        match self.document.get("global_settings") {
            Some(Value::Object(global)) => Ok(global.clone()),
            Some(Value::Null) | None => Ok(Map::new()),
            Some(other) => anyhow::bail!(
                "global_settings must be an object, got {}",
                json_type_name(other)
            ),
        }
    }
}

/// Starter config written by `topotest config init`
pub fn starter_document() -> Value {
    json!({
        "global_settings": {
            "id_attribute": "id",
            "output_folder_name": crate::paths::OUTPUT_FOLDER,
            "min_intersection_area": 0,
            "measure": "planar",
            "enabled_checks": {
                "intersections": true,
                "self_intersections": true,
                "gaps": true,
                "dangles": true,
                "overlaps": true,
                "containment": true
            },
            "tolerances": {
                "gap": 0.0,
                "overlap": 0.0
            }
        },
        "dataset_rules": {
            "roads": {
                "allow_intersection_if": [
                    { "attribute": "type", "values": ["bridge", "tunnel"] }
                ],
                "enabled_checks": {
                    "gaps": false,
                    "containment": false
                }
            },
            "buildings": {
                "allow_overlap_if": [],
                "enabled_checks": {
                    "dangles": false
                }
            }
        }
    })
}

/// Write a config document as pretty-printed JSON
pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut content = serde_json::to_string_pretty(document)?;
    content.push('\n');
    fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))
}

/// Returns the path to the global config file at `<config dir>/topotest/config.json`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("topotest").join("config.json"))
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn display_types(types: &[String]) -> String {
    if types.is_empty() {
        "(none)".to_string()
    } else {
        types.join(", ")
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
