// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

use suite_runner::core::config::RunnerConfig;

/// Stand-in interpreter: finds the patched `main = ...` line in the artifact
/// and runs its right-hand side as shell code.
pub const INTERPRETER: &str = r#"#!/bin/sh
line=$(grep '^main = ' "$1")
eval "${line#main = }"
"#;

/// Same as [`INTERPRETER`] but reads the artifact from stdin.
pub const STDIN_INTERPRETER: &str = r#"#!/bin/sh
line=$(grep '^main = ')
eval "${line#main = }"
"#;

/// Stand-in extractor: every `test <name> = <command>` line is one test case.
/// A line containing `syntax error` makes it fail like a parser would.
pub const EXTRACTOR: &str = r##"#!/bin/sh
awk '
BEGIN { printf "["; n = 0 }
/syntax error/ { bad = 1 }
/^test [A-Za-z0-9_]+ = / {
  cmd = substr($0, index($0, " = ") + 3)
  if (n++) printf ","
  printf "{\"name\":\"%s\",\"rowStart\":%d,\"rowStop\":%d,\"colStart\":0,\"colStop\":%d,\"command\":\"%s\"}", $2, NR, NR, length($0), cmd
}
END {
  printf "]\n"
  if (bad) { print "parse error on input" > "/dev/stderr"; exit 1 }
}'
"##;

/// A workspace with the fake tools installed under `bin/` and an empty
/// `artifacts/` directory for patched copies.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temporary directory");
        fs::create_dir_all(dir.path().join("bin")).unwrap();
        fs::create_dir_all(dir.path().join("artifacts")).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        let fixture = Self { dir };
        fixture.script("interpreter", INTERPRETER);
        fixture.script("stdin-interpreter", STDIN_INTERPRETER);
        fixture.script("extractor", EXTRACTOR);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn src(&self) -> PathBuf {
        self.root().join("src")
    }

    pub fn artifacts(&self) -> PathBuf {
        self.root().join("artifacts")
    }

    /// Writes an executable script into `bin/`.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.root().join("bin").join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Writes a source file under `src/`.
    pub fn source(&self, name: &str, body: &str) -> PathBuf {
        let path = self.src().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    /// Configuration wired to the fake tools, with the given timeout.
    pub fn config(&self, timeout_ms: u64) -> RunnerConfig {
        let mut config = RunnerConfig::default();
        config.interpreter.command = self.root().join("bin/interpreter").display().to_string();
        config.interpreter.timeout_ms = timeout_ms;
        config.extractor.command = self.root().join("bin/extractor").display().to_string();
        config.patch.harness = "{command}".to_string();
        config.workspace.artifact_dir = Some(self.artifacts());
        config
    }

    /// The same configuration rendered as `SuiteRunner.toml` in the root.
    pub fn write_config(&self, timeout_ms: u64) -> PathBuf {
        let path = self.root().join("SuiteRunner.toml");
        let body = toml::to_string(&self.config(timeout_ms)).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    /// Number of patched artifacts still on disk.
    pub fn leftover_artifacts(&self) -> usize {
        fs::read_dir(self.artifacts()).unwrap().count()
    }
}

/// A source file with a normal entry point and the given test lines.
pub fn source_with_tests(tests: &[&str]) -> String {
    let mut body = String::from("module Tests where\n\nmain = runTests\n\n");
    for test in tests {
        body.push_str(test);
        body.push('\n');
    }
    body
}

pub const PASSING: &str = "test addOne = echo 'addOne: 1 / 1'";
pub const FAILING: &str = "test addTwo = echo '> addTwo 1 = 2'; echo '  test case expected: 3'; echo 'addTwo: 0 / 1'";
pub const SLOW: &str = "test slow = exec sleep 10";
pub const CRASHING: &str = "test crash = echo 'interpreter exploded' >&2; exit 3";
