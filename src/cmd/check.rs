//! `topotest check`: run the topology checks over one or more files.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use topotest::config::{expand_path, Config, Overrides};
use topotest::dataset::Dataset;
use topotest::geometry::Measure;
use topotest::report::{self, JsonReport};
use topotest::topology::{CheckKind, TopologyResults, TopologyTest};
use topotest::ui::{self, colors};

use super::run_checks;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// GeoJSON files or glob patterns, tested as --type
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,
    /// Dataset type for FILES (a key of dataset_rules)
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub dataset_type: Option<String>,
    /// Additional input with its own dataset type (repeatable)
    #[arg(long = "input", value_name = "TYPE=PATH")]
    pub inputs: Vec<String>,
    /// Config file (default: discovered)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Directory for issue files (default: next to each input)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Run only these checks (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "CHECKS")]
    pub only: Vec<String>,
    /// Skip these checks (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "CHECKS")]
    pub skip: Vec<String>,
    /// Ignore gaps with an area at or below this
    #[arg(long, value_name = "X")]
    pub gap_tolerance: Option<f64>,
    /// Ignore overlaps measuring at or below this
    #[arg(long, value_name = "X")]
    pub overlap_tolerance: Option<f64>,
    /// Ignore intersections with an area below this
    #[arg(long, value_name = "X")]
    pub min_intersection_area: Option<f64>,
    /// Measure areas and lengths on the WGS84 ellipsoid
    #[arg(long)]
    pub geodesic: bool,
    /// Do not write issue files
    #[arg(long)]
    pub no_save: bool,
    /// Save check selection and tolerances to the config's global settings
    #[arg(long)]
    pub save_config: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Exit with status 1 when any issue is found
    #[arg(long)]
    pub fail_on_issues: bool,
}

/// One file to test and the dataset type to test it as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub dataset_type: String,
    pub path: PathBuf,
}

pub fn cmd_check(args: &CheckArgs) -> Result<()> {
    let overrides = build_overrides(args)?;
    let inputs = collect_inputs(args)?;
    let mut config = Config::load(args.config.as_deref())?;

    if args.save_config {
        if overrides.is_empty() {
            println!("{} No settings given to save", "⚠".yellow());
        } else {
            let path = config.save_overrides(&overrides)?;
            if !ui::is_quiet() {
                println!("{} Saved settings to {}", "✓".green(), path.display());
            }
        }
    }

    let mut reports = Vec::new();
    let mut any_issues = false;

    for input in &inputs {
        let mut settings = config.settings_for(&input.dataset_type)?;
        overrides.apply(&mut settings);
        settings
            .validate()
            .with_context(|| format!("Invalid settings for dataset type '{}'", input.dataset_type))?;

        let dataset = Dataset::load(&input.path)?;
        let test = TopologyTest::new(dataset, input.dataset_type.as_str(), settings);

        let results = run_checks(&test);
        any_issues |= results.has_issues();

        let written = if args.no_save {
            BTreeMap::new()
        } else {
            test.save_topology_results(&results, args.output_dir.as_deref())?
        };

        match args.format {
            OutputFormat::Json => reports.push(JsonReport::new(&test, &results, &written)),
            OutputFormat::Text => {
                if !ui::is_quiet() {
                    println!(
                        "{} {} as {}",
                        colors::heading("Testing"),
                        input.path.display(),
                        colors::identifier(&input.dataset_type)
                    );
                    println!("{}", ui::format::separator(60));
                }
                println!("{}", report::summary(&test, &results));
                print_written(&results, &written, args.no_save);
                println!();
            }
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if args.fail_on_issues && any_issues {
        std::process::exit(1);
    }

    Ok(())
}

fn print_written(
    results: &TopologyResults,
    written: &BTreeMap<CheckKind, PathBuf>,
    no_save: bool,
) {
    println!();
    if no_save {
        println!("{}", colors::secondary("Issue files not saved (--no-save)"));
        return;
    }
    if written.is_empty() {
        println!("{} No issues, no files written", "✓".green());
        return;
    }

    println!("{}", colors::heading("Output files:"));
    for (kind, path) in written {
        let count = results.count(*kind).unwrap_or(0);
        println!(
            "  {} {} ({}) {}",
            ui::check_icon(count),
            kind.title(),
            ui::format::issues(count),
            colors::secondary(&path.display().to_string())
        );
    }
}

/// Translate command-line flags into setting overrides
pub fn build_overrides(args: &CheckArgs) -> Result<Overrides> {
    let only = if args.only.is_empty() {
        None
    } else {
        Some(parse_checks(&args.only)?)
    };

    for (flag, value) in [
        ("--gap-tolerance", args.gap_tolerance),
        ("--overlap-tolerance", args.overlap_tolerance),
        ("--min-intersection-area", args.min_intersection_area),
    ] {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{} must be a non-negative number, got {}", flag, value);
            }
        }
    }

    Ok(Overrides {
        only,
        skip: parse_checks(&args.skip)?,
        gap_tolerance: args.gap_tolerance,
        overlap_tolerance: args.overlap_tolerance,
        min_intersection_area: args.min_intersection_area,
        measure: args.geodesic.then_some(Measure::Geodesic),
    })
}

fn parse_checks(names: &[String]) -> Result<Vec<CheckKind>> {
    names
        .iter()
        .filter(|name| !name.trim().is_empty())
        .map(|name| name.parse::<CheckKind>())
        .collect()
}

/// Positional files (tested as `--type`) followed by `--input TYPE=PATH` entries
pub fn collect_inputs(args: &CheckArgs) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();

    if !args.files.is_empty() {
        let dataset_type = args
            .dataset_type
            .as_deref()
            .context("--type is required when FILES are given")?;
        for pattern in &args.files {
            for path in expand_pattern(pattern)? {
                inputs.push(Input {
                    dataset_type: dataset_type.to_string(),
                    path,
                });
            }
        }
    }

    for entry in &args.inputs {
        let (dataset_type, pattern) = parse_input(entry)?;
        for path in expand_pattern(pattern)? {
            inputs.push(Input {
                dataset_type: dataset_type.to_string(),
                path,
            });
        }
    }

    if inputs.is_empty() {
        anyhow::bail!("No input files. Pass FILES with --type, or --input TYPE=PATH");
    }
    Ok(inputs)
}

fn parse_input(entry: &str) -> Result<(&str, &str)> {
    match entry.split_once('=') {
        Some((dataset_type, path)) if !dataset_type.trim().is_empty() && !path.trim().is_empty() => {
            Ok((dataset_type.trim(), path.trim()))
        }
        _ => anyhow::bail!("Invalid --input '{}': expected TYPE=PATH", entry),
    }
}

/// Expand a glob pattern into matching files, sorted. Plain paths pass through.
fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let expanded = expand_path(Path::new(pattern));
    let text = expanded.to_string_lossy();
    if !text.contains(&['*', '?', '['][..]) {
        return Ok(vec![expanded]);
    }

    let mut paths = glob::glob(&text)
        .with_context(|| format!("Invalid glob pattern '{}'", pattern))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read paths matching '{}'", pattern))?;
    paths.retain(|path| path.is_file());
    paths.sort();

    if paths.is_empty() {
        anyhow::bail!("No files match pattern '{}'", pattern);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args() -> CheckArgs {
        CheckArgs {
            files: vec![],
            dataset_type: None,
            inputs: vec![],
            config: None,
            output_dir: None,
            only: vec![],
            skip: vec![],
            gap_tolerance: None,
            overlap_tolerance: None,
            min_intersection_area: None,
            geodesic: false,
            no_save: false,
            save_config: false,
            format: OutputFormat::Text,
            fail_on_issues: false,
        }
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("roads=a/b.geojson").unwrap(), ("roads", "a/b.geojson"));
        assert!(parse_input("roads").is_err());
        assert!(parse_input("=x.geojson").is_err());
        assert!(parse_input("roads=").is_err());
    }

    #[test]
    fn test_files_require_type() {
        let mut a = args();
        a.files = vec!["roads.geojson".into()];
        let err = collect_inputs(&a).unwrap_err();
        assert!(err.to_string().contains("--type"));

        a.dataset_type = Some("roads".into());
        let inputs = collect_inputs(&a).unwrap();
        assert_eq!(inputs[0].dataset_type, "roads");
        assert_eq!(inputs[0].path, PathBuf::from("roads.geojson"));
    }

    #[test]
    fn test_no_inputs_is_an_error() {
        assert!(collect_inputs(&args()).is_err());
    }

    #[test]
    fn test_glob_expansion_sorted() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.geojson", "a.geojson", "notes.txt"] {
            fs::write(tmp.path().join(name), "{}").unwrap();
        }
        let pattern = tmp.path().join("*.geojson").to_string_lossy().into_owned();

        let paths = expand_pattern(&pattern).unwrap();
        assert_eq!(
            paths,
            vec![tmp.path().join("a.geojson"), tmp.path().join("b.geojson")]
        );

        let none = tmp.path().join("*.shp").to_string_lossy().into_owned();
        assert!(expand_pattern(&none).is_err());
    }

    #[test]
    fn test_build_overrides() {
        let mut a = args();
        a.only = vec!["intersections".into(), "gaps".into()];
        a.skip = vec!["gaps".into()];
        a.gap_tolerance = Some(0.5);
        a.geodesic = true;

        let overrides = build_overrides(&a).unwrap();
        assert_eq!(overrides.only, Some(vec![CheckKind::Intersections, CheckKind::Gaps]));
        assert_eq!(overrides.skip, vec![CheckKind::Gaps]);
        assert_eq!(overrides.gap_tolerance, Some(0.5));
        assert_eq!(overrides.measure, Some(Measure::Geodesic));
    }

    #[test]
    fn test_build_overrides_rejects_bad_values() {
        let mut a = args();
        a.skip = vec!["holes".into()];
        assert!(build_overrides(&a).is_err());

        let mut a = args();
        a.overlap_tolerance = Some(-1.0);
        let err = build_overrides(&a).unwrap_err();
        assert!(err.to_string().contains("--overlap-tolerance"));
    }
}
