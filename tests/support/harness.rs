use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use super::fixtures::load_fixture;

/// TestHarness provides an isolated working directory for running the
/// topotest binary. Fixture files are copied in on request.
pub struct TestHarness {
    pub dir: TempDir,
    pub topotest_binary: PathBuf,
}

impl TestHarness {
    /// Creates an empty harness directory (auto-cleaned on drop).
    pub fn new() -> Self {
        TestHarness {
            dir: TempDir::new().expect("Failed to create temp dir"),
            topotest_binary: PathBuf::from(env!("CARGO_BIN_EXE_topotest")),
        }
    }

    /// Creates a harness holding the fixture config as `topotest.json` and
    /// the given fixture datasets.
    pub fn with_fixtures(datasets: &[&str]) -> Self {
        let harness = Self::new();
        harness.write("topotest.json", &load_fixture("topotest.json"));
        for name in datasets {
            harness.write(name, &load_fixture(name));
        }
        harness
    }

    /// Returns the base directory path (the TempDir path).
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a file relative to the harness directory.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Reads a file relative to the harness directory.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).expect("Failed to read file")
    }

    /// Executes the topotest binary with the given arguments in the harness
    /// directory, isolated from any user or environment config.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.topotest_binary)
            .args(args)
            .current_dir(self.path())
            .env_remove("TOPOTEST_CONFIG")
            .env_remove("TOPOTEST_LOG")
            .env("TOPOTEST_QUIET", "1")
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("HOME", self.path())
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to run topotest")
    }
}

/// Stdout of a finished command as text
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a finished command as text
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
