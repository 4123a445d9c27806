//! `topotest summary`: print the topology summary without writing files.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

use topotest::config::Config;
use topotest::report::{self, JsonReport};
use topotest::topology::TopologyTest;

use super::check::OutputFormat;
use super::run_checks;

pub fn cmd_summary(
    file: &Path,
    dataset_type: &str,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = Config::load(config)?;
    let test = TopologyTest::open(file, dataset_type, &config)?;
    let results = run_checks(&test);

    match format {
        OutputFormat::Text => println!("{}", report::summary(&test, &results)),
        OutputFormat::Json => {
            let report = JsonReport::new(&test, &results, &BTreeMap::new());
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
