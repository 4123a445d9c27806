//! `topotest intersections`: the intersection-only report with its single
//! output file.

use anyhow::Result;
use std::path::Path;

use topotest::config::Config;
use topotest::topology::TopologyTest;

pub fn cmd_intersections(
    file: &Path,
    dataset_type: &str,
    config: Option<&Path>,
    output_dir: Option<&Path>,
) -> Result<()> {
    let config = Config::load(config)?;
    let test = TopologyTest::open(file, dataset_type, &config)?;

    let report = test.report_invalid_intersections(output_dir)?;
    println!("{}", report.trim_end());
    Ok(())
}
