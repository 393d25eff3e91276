//! Fake Decaf toolchain used by the integration tests.
//!
//! The fake compiler prints the same two banner lines as the real one, echoes
//! every `WARNING:` line of its input to stdout, and writes the remaining
//! lines to `<stem>.tac`. The fake interpreter prints a two-line banner and
//! then the `.tac` file, so a fixture's source is simply its expected payload.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use decaf_harness::config::{HarnessConfig, SettleConfig, SettleMode};
use tempfile::TempDir;

const FAKE_COMPILER: &str = r#"
file="${2:-test.decaf}"
if [ ! -f "$file" ]; then
  echo "Could not open input file '$file'." >&2
  exit 255
fi
echo "====> PARSING FILE $file USING PARSER fake"
stem="${file%.*}"
echo "====> TAC --> $stem.tac"
grep '^WARNING:' "$file" || true
grep -v '^WARNING:' "$file" > "$stem.tac" || true
exit 0
"#;

const FAKE_INTERPRETER: &str = r#"
echo "TAC interpreter (fake)"
echo "executing $1"
cat "$1"
"#;

/// Parse failure: banner and a stderr message, exit 0, no IR written.
const BROKEN_COMPILER: &str = r#"
file="${2:-test.decaf}"
echo "====> PARSING FILE $file USING PARSER fake"
echo "====> TAC --> ${file%.*}.tac"
echo "syntax error at line 3" >&2
exit 0
"#;

const SLOW_INTERPRETER: &str = r#"
echo "TAC interpreter (fake)"
sleep 5
"#;

pub struct FakeToolchain {
    pub dir: TempDir,
}

impl FakeToolchain {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("compiler.sh"), FAKE_COMPILER).unwrap();
        fs::write(dir.path().join("interpreter.sh"), FAKE_INTERPRETER).unwrap();
        fs::write(dir.path().join("broken_compiler.sh"), BROKEN_COMPILER).unwrap();
        fs::write(dir.path().join("slow_interpreter.sh"), SLOW_INTERPRETER).unwrap();
        fs::create_dir_all(dir.path().join("test_files")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<stem>.decaf` with one line per payload item.
    pub fn source(&self, stem: &str, lines: &[&str]) -> PathBuf {
        let path = self.path().join(format!("{}.decaf", stem));
        let mut text = lines.join("\n");
        text.push('\n');
        fs::write(&path, text).unwrap();
        path
    }

    pub fn config(&self) -> HarnessConfig {
        let mut config = HarnessConfig {
            work_dir: self.path().to_path_buf(),
            settle: SettleConfig {
                mode: SettleMode::Stable,
                delay_ms: 0,
                poll_interval_ms: 5,
                stable_polls: 2,
                max_wait_ms: 1_000,
            },
            timeout_ms: 10_000,
            ..HarnessConfig::default()
        };
        config.compiler.program = "sh".to_string();
        config.compiler.args = vec!["compiler.sh".to_string()];
        config.interpreter.program = "sh".to_string();
        config.interpreter.args = vec!["interpreter.sh".to_string()];
        config
    }

    /// Config as YAML, for driving the binary.
    pub fn config_yaml(&self) -> String {
        format!(
            r#"work_dir: {}
compiler:
  program: sh
  args: [compiler.sh]
interpreter:
  program: sh
  args: [interpreter.sh]
settle:
  mode: stable
  poll_interval_ms: 5
  stable_polls: 2
  max_wait_ms: 1000
timeout_ms: 10000
"#,
            self.path().display()
        )
    }

    /// Files in the work dir whose name suggests a leftover capture.
    pub fn leftover_captures(&self) -> Vec<PathBuf> {
        walk(self.path())
            .into_iter()
            .filter(|p| {
                let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
                name.contains("capture") || name.starts_with("decaf-harness-") || name == "temp.txt"
            })
            .collect()
    }
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            found.extend(walk(&path));
        }
        found.push(path);
    }
    found
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
