//! Command module structure for the topotest CLI

use atty::Stream;
use indicatif::{ProgressBar, ProgressStyle};

use topotest::topology::{TopologyResults, TopologyTest};
use topotest::ui;

pub mod check;
pub mod config;
pub mod intersections;
pub mod summary;

/// Run the enabled checks with a progress bar over stderr.
///
/// The bar is hidden in quiet mode and when stderr is not a terminal.
pub fn run_checks(test: &TopologyTest) -> TopologyResults {
    let enabled = test.settings.enabled_checks.enabled();

    let pb = if ui::is_quiet() || !atty::is(Stream::Stderr) {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(enabled.len() as u64)
    };
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }

    let mut started = 0;
    let results = test.validate_topology_with(|kind| {
        pb.set_position(started);
        pb.set_message(kind.title());
        started += 1;
    });
    pb.finish_and_clear();

    results
}
