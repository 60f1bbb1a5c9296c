//! Scratch toolchain checkouts with shell-script stand-ins for the real tools.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Style checker stand-in: `--html=` writes a report, `--fix` normalizes
/// `x=1`/`y=2` assignments. One fix pass reaches a fixed point.
pub const CONVERGENT_STYLE: &str = r#"
fix=0
for arg in "$@"; do
  case "$arg" in
    --fix) fix=1 ;;
    --html=*) echo "<html/>" > "${arg#--html=}" ;;
  esac
done
for f in $(find . -name '*.m' | sort); do
  echo "checking $f"
  if [ $fix = 1 ]; then
    sed -e 's/x=1/x = 1/' -e 's/y=2/y = 2/' "$f" > "$f.tmp" && mv "$f.tmp" "$f"
  fi
done
"#;

/// Coverage stand-in: `run --rcfile=.. --append <cmd...>` appends to the data
/// file in the working directory and execs the command; every other
/// subcommand is logged next to the script.
pub const FAKE_COVERAGE: &str = r#"
if [ "$1" = "run" ]; then
  shift 3
  echo sample >> .coverage
  exec "$@"
fi
echo "$@" >> "$(dirname "$0")/coverage.log"
echo "coverage $1 done"
"#;

pub fn write_script(path: &Path, body: &str) -> PathBuf {
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    path.to_path_buf()
}

/// `<scratch>/` is the toolchain root, `<scratch>/tests/` the test root.
pub struct Checkout {
    pub scratch: tempfile::TempDir,
}

impl Checkout {
    pub fn new() -> Self {
        let scratch = tempfile::tempdir().unwrap();
        let toolchain = scratch.path();
        fs::create_dir_all(toolchain.join("miss_hit_core")).unwrap();
        fs::create_dir_all(toolchain.join("miss_hit")).unwrap();
        write_script(&toolchain.join("mh_style"), CONVERGENT_STYLE);
        write_script(&toolchain.join("mh_lint"), r#"echo "lint: $@""#);
        write_script(&toolchain.join("mh_metric"), r#"echo "metric: $@""#);
        write_script(&toolchain.join("fake_coverage"), FAKE_COVERAGE);
        for kind in [
            "lexer",
            "parser",
            "simulink_parser",
            "config_parser",
            "style",
            "metrics",
            "lint",
            "sanity",
        ] {
            fs::create_dir_all(toolchain.join("tests").join(kind)).unwrap();
        }
        let checkout = Self { scratch };
        checkout.write_config(&serde_json::json!({
            "coverage": { "program": checkout.toolchain().join("fake_coverage") }
        }));
        checkout
    }

    pub fn toolchain(&self) -> &Path {
        self.scratch.path()
    }

    pub fn test_root(&self) -> PathBuf {
        self.scratch.path().join("tests")
    }

    pub fn case(&self, kind: &str, name: &str) -> PathBuf {
        let dir = self.test_root().join(kind).join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn write_config(&self, config: &serde_json::Value) {
        fs::write(
            self.test_root().join("regress.json"),
            serde_json::to_string_pretty(config).unwrap(),
        )
        .unwrap();
    }

    pub fn coverage_log(&self) -> Vec<String> {
        fs::read_to_string(self.toolchain().join("coverage.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
