//! Configuration management for the regression harness
//!
//! Every command line the harness builds comes from here: the tool targets per
//! kind, the coverage wrapper, the child environment and the namespaces
//! searched for sanity modules. Defaults match the toolchain's checked-in
//! layout (the test root sits one level below the toolchain root); a JSON
//! file can override any subset of fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Config file picked up from the test root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "regress.json";

/// Complete harness configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Toolchain checkout; relative paths resolve against the test root
    pub toolchain_root: PathBuf,
    pub coverage: CoverageConfig,
    pub environment: EnvironmentConfig,
    pub tools: ToolsConfig,
    pub style: StyleConfig,
    pub sanity: SanityConfig,
}

/// Coverage wrapper around every tool invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoverageConfig {
    /// When false, tools run directly and no snapshots are renamed or combined
    pub enabled: bool,
    /// Coverage program (`<program> run --rcfile=... --append ...`)
    pub program: String,
    /// Coverage settings file, relative to the test root
    pub rcfile: String,
    /// Per-process data file the coverage program writes into the working directory
    pub data_file: String,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "coverage".to_string(),
            rcfile: "coverage.cfg".to_string(),
            data_file: ".coverage".to_string(),
        }
    }
}

/// Environment block handed to every child process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Start from the harness's own environment
    pub inherit: bool,
    /// Interpreter used for module targets when coverage is disabled
    pub interpreter: String,
    /// Extra variables; `{toolchain_root}` expands to the resolved toolchain root
    pub vars: BTreeMap<String, String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        let mut vars = BTreeMap::new();
        vars.insert("PYTHONIOENCODING".to_string(), "UTF-8".to_string());
        vars.insert("PYTHONPATH".to_string(), "{toolchain_root}".to_string());
        Self {
            inherit: true,
            interpreter: "python3".to_string(),
            vars,
        }
    }
}

/// What gets executed for a tool: a script file or an importable module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolTarget {
    /// Script path, relative to the toolchain root unless absolute
    Script { path: PathBuf },
    /// Module name run through `-m`
    Module { name: String },
}

impl ToolTarget {
    pub fn script(path: impl Into<PathBuf>) -> Self {
        ToolTarget::Script { path: path.into() }
    }

    pub fn module(name: impl Into<String>) -> Self {
        ToolTarget::Module { name: name.into() }
    }
}

/// Tool target per kind; sanity targets come from [`SanityConfig`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub style: ToolTarget,
    pub metrics: ToolTarget,
    pub lint: ToolTarget,
    pub lexer: ToolTarget,
    pub parser: ToolTarget,
    pub model_parser: ToolTarget,
    pub config_parser: ToolTarget,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            style: ToolTarget::script("mh_style"),
            metrics: ToolTarget::script("mh_metric"),
            lint: ToolTarget::script("mh_lint"),
            lexer: ToolTarget::module("miss_hit_core.m_lexer"),
            parser: ToolTarget::script("mh_debug_parser"),
            model_parser: ToolTarget::module("miss_hit_core.s_parser"),
            config_parser: ToolTarget::module("miss_hit_core.cfg_parser"),
        }
    }
}

/// Style checker specifics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    /// Extensions of tracked fixtures (searched recursively)
    pub fixture_extensions: Vec<String>,
    /// Flags passed to every style invocation after `--single`
    pub extra_args: Vec<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            fixture_extensions: vec!["m".to_string(), "slx".to_string()],
            extra_args: vec!["--process-slx".to_string()],
        }
    }
}

/// Sanity module lookup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SanityConfig {
    /// Package directories under the toolchain root, searched in order
    pub namespaces: Vec<String>,
    /// Source file extension identifying a module
    pub module_extension: String,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            namespaces: vec!["miss_hit_core".to_string(), "miss_hit".to_string()],
            module_extension: "py".to_string(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            toolchain_root: PathBuf::from(".."),
            coverage: CoverageConfig::default(),
            environment: EnvironmentConfig::default(),
            tools: ToolsConfig::default(),
            style: StyleConfig::default(),
            sanity: SanityConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a JSON file, falling back to defaults
    ///
    /// Missing or malformed files are logged and never fatal; use
    /// [`HarnessConfig::from_path`] when the caller named the file explicitly.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Strictly load a configuration file the user asked for.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Configuration for a test root: `regress.json` there if present, defaults otherwise.
    pub fn load(test_root: &Path) -> Self {
        let candidate = test_root.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load_from_file(candidate)
        } else {
            Self::default()
        }
    }

    /// Absolute toolchain root for a given test root.
    pub fn resolved_toolchain_root(&self, test_root: &Path) -> PathBuf {
        if self.toolchain_root.is_absolute() {
            self.toolchain_root.clone()
        } else {
            normalize(&test_root.join(&self.toolchain_root))
        }
    }
}

/// Lexically collapse `.` and `..` components without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
