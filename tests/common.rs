//! Common test helpers for integration tests

use std::path::{Path, PathBuf};

use topotest::config::Config;

/// Path of a file under `tests/fixtures/`
pub fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

/// Config loaded from `tests/fixtures/topotest.json`
pub fn fixture_config() -> Config {
    Config::load_from(&fixture_path("topotest.json")).expect("Failed to load fixture config")
}

/// Copy a fixture into `dir`, returning the copy's path
pub fn copy_fixture(name: &str, dir: &Path) -> PathBuf {
    let target = dir.join(name);
    std::fs::copy(fixture_path(name), &target)
        .unwrap_or_else(|e| panic!("Failed to copy fixture '{}': {}", name, e));
    target
}
