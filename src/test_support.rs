//! Fake tool scripts and fixture trees for unit tests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{HarnessConfig, ToolTarget};

/// Write an executable `/bin/sh` script.
pub fn write_script(path: &Path, body: &str) -> PathBuf {
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).unwrap();
    }
    path.to_path_buf()
}

/// Harness config with coverage off and every tool pointing at `script`.
pub fn direct_config(script: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.coverage.enabled = false;
    let target = ToolTarget::script(script);
    config.tools.style = target.clone();
    config.tools.metrics = target.clone();
    config.tools.lint = target.clone();
    config.tools.lexer = target.clone();
    config.tools.parser = target.clone();
    config.tools.model_parser = target.clone();
    config.tools.config_parser = target;
    config
}

pub fn make_case_dir(root: &Path, kind: &str, name: &str) -> PathBuf {
    let dir = root.join(kind).join(name);
    fs::create_dir_all(&dir).unwrap();
    dir
}
