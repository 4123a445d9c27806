//! Config commands: validate, init and show

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use topotest::config::{
    expand_path, global_config_path, starter_document, validate_config, write_document, Config,
    ConfigSource,
};
use topotest::validation::{self, Severity};

/// Validate config structure and settings and report issues
pub fn cmd_config_validate(explicit: Option<&Path>) -> Result<()> {
    let config = Config::load(explicit)?;

    let Some(path) = config.path() else {
        println!(
            "{} No config file found, built-in defaults apply to every dataset type",
            "ℹ".blue()
        );
        return Ok(());
    };

    println!("{} {}", "Validating".bold(), path.display());
    println!();

    let issues = validate_config(&config)?;
    for issue in &issues {
        issue.display();
    }

    let errors = validation::count(&issues, Severity::Error);
    let warnings = validation::count(&issues, Severity::Warning);

    if !issues.is_empty() {
        println!();
    }
    if errors == 0 && warnings == 0 {
        println!("{} Configuration is valid", "✓".green());
    } else if errors == 0 {
        println!(
            "{} Configuration valid with {} warning(s)",
            "✓".green(),
            warnings
        );
    } else {
        println!(
            "{} Found {} error(s) and {} warning(s)",
            "✗".red(),
            errors,
            warnings
        );
        std::process::exit(1);
    }

    Ok(())
}

/// Write a starter config, refusing to overwrite unless `force`
pub fn cmd_config_init(path: &Path, global: bool, force: bool) -> Result<()> {
    let target = if global {
        global_config_path().context("Could not determine the user config directory")?
    } else {
        expand_path(path)
    };

    if target.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            target.display()
        );
    }

    write_document(&target, &starter_document())?;
    println!("{} Wrote starter config to {}", "✓".green(), target.display());
    Ok(())
}

/// Print effective settings for a dataset type, or the global settings
pub fn cmd_config_show(dataset_type: Option<&str>, explicit: Option<&Path>) -> Result<()> {
    let config = Config::load(explicit)?;

    let source = match &config.source {
        ConfigSource::File(path) => path.display().to_string(),
        ConfigSource::Defaults => "built-in defaults".to_string(),
    };
    println!("{} {}", "Config:".bold(), source);

    let types = config.dataset_types();
    if !types.is_empty() {
        println!("{} {}", "Dataset types:".bold(), types.join(", ").cyan());
    }

    let (label, settings) = match dataset_type {
        Some(dataset_type) => (dataset_type.to_string(), config.settings_for(dataset_type)?),
        None => ("global".to_string(), config.global_settings()?),
    };

    println!("{} {}", "Effective settings:".bold(), label.cyan());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
