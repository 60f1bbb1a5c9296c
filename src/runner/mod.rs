//! Child-process plumbing for external analysis tools.
//!
//! Every invocation gets its working directory and environment passed in
//! explicitly, so test cases running on sibling worker threads never observe
//! each other's state. Standard output and standard error are merged into one
//! pipe, matching what a user would see in a terminal.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::{CoverageConfig, EnvironmentConfig, HarnessConfig, ToolTarget};
use crate::error::ExecutionError;

/// Output flavour of one capture, used for artifact section titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Plain,
    Html,
    Json,
    FixPass1,
    FixPass2,
}

impl CaptureMode {
    pub fn section_title(self) -> &'static str {
        match self {
            CaptureMode::Plain | CaptureMode::FixPass1 | CaptureMode::FixPass2 => "PLAIN MODE",
            CaptureMode::Html => "HTML MODE",
            CaptureMode::Json => "JSON MODE",
        }
    }
}

/// Combined stdout+stderr of one finished invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub mode: CaptureMode,
    pub output: String,
    /// `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
}

/// Environment block applied to every child process.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolEnvironment {
    inherit: bool,
    vars: BTreeMap<String, String>,
}

impl ToolEnvironment {
    pub fn from_config(config: &EnvironmentConfig, toolchain_root: &Path) -> Self {
        let root = toolchain_root.display().to_string();
        let vars = config
            .vars
            .iter()
            .map(|(key, value)| (key.clone(), value.replace("{toolchain_root}", &root)))
            .collect();
        Self {
            inherit: config.inherit,
            vars,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn apply(&self, command: &mut Command) {
        if !self.inherit {
            command.env_clear();
        }
        command.envs(&self.vars);
    }
}

/// Fully resolved program + argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Builds and runs tool command lines for one harness run.
///
/// Shared by reference across worker threads; holds no mutable state.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    test_root: PathBuf,
    toolchain_root: PathBuf,
    coverage: CoverageConfig,
    interpreter: String,
    environment: ToolEnvironment,
}

impl ToolRunner {
    pub fn new(config: &HarnessConfig, test_root: &Path) -> Self {
        let toolchain_root = config.resolved_toolchain_root(test_root);
        let environment = ToolEnvironment::from_config(&config.environment, &toolchain_root);
        Self {
            test_root: test_root.to_path_buf(),
            toolchain_root,
            coverage: config.coverage.clone(),
            interpreter: config.environment.interpreter.clone(),
            environment,
        }
    }

    pub fn test_root(&self) -> &Path {
        &self.test_root
    }

    pub fn coverage(&self) -> &CoverageConfig {
        &self.coverage
    }

    pub fn environment(&self) -> &ToolEnvironment {
        &self.environment
    }

    /// Command line for `target` with `args`, wrapped in the coverage program when enabled.
    pub fn command_line<S: AsRef<str>>(&self, target: &ToolTarget, args: &[S]) -> CommandLine {
        let mut target_args: Vec<OsString> = Vec::new();
        let script = match target {
            ToolTarget::Script { path } => Some(self.toolchain_root.join(path)),
            ToolTarget::Module { name } => {
                target_args.push("-m".into());
                target_args.push(name.into());
                None
            }
        };

        let (program, mut full_args) = if self.coverage.enabled {
            let rcfile = self.test_root.join(&self.coverage.rcfile);
            let mut wrapper: Vec<OsString> = vec![
                "run".into(),
                format!("--rcfile={}", rcfile.display()).into(),
                "--append".into(),
            ];
            if let Some(script) = script {
                wrapper.push(script.into_os_string());
            }
            wrapper.extend(target_args);
            (OsString::from(&self.coverage.program), wrapper)
        } else {
            match script {
                Some(script) => (script.into_os_string(), Vec::new()),
                None => (OsString::from(&self.interpreter), target_args),
            }
        };

        full_args.extend(args.iter().map(|arg| OsString::from(arg.as_ref())));
        CommandLine {
            program,
            args: full_args,
        }
    }

    /// Run `target` in `cwd` and capture its combined output.
    pub fn run<S: AsRef<str>>(
        &self,
        cwd: &Path,
        mode: CaptureMode,
        target: &ToolTarget,
        args: &[S],
    ) -> Result<Capture, ExecutionError> {
        let line = self.command_line(target, args);
        self.run_command_line(cwd, mode, &line)
    }

    /// Run the coverage program itself (`erase`, `combine`, `html`, ...) in the test root.
    pub fn run_coverage<S: AsRef<str>>(&self, args: &[S]) -> Result<Capture, ExecutionError> {
        let line = CommandLine {
            program: OsString::from(&self.coverage.program),
            args: args.iter().map(|arg| OsString::from(arg.as_ref())).collect(),
        };
        self.run_command_line(&self.test_root, CaptureMode::Plain, &line)
    }

    pub fn run_command_line(
        &self,
        cwd: &Path,
        mode: CaptureMode,
        line: &CommandLine,
    ) -> Result<Capture, ExecutionError> {
        debug!(cwd = %cwd.display(), command = %line, "invoking tool");
        let spawn_error = |err: std::io::Error| ExecutionError::SpawnFailed {
            program: line.program.to_string_lossy().into_owned(),
            reason: err.to_string(),
        };

        let (mut reader, writer) = std::io::pipe().map_err(spawn_error)?;
        let mut child = {
            let mut command = Command::new(&line.program);
            command
                .args(&line.args)
                .current_dir(cwd)
                .stdin(std::process::Stdio::null())
                .stdout(writer.try_clone().map_err(spawn_error)?)
                .stderr(writer);
            self.environment.apply(&mut command);
            // The command owns the write ends; it must be gone before reading to EOF.
            command.spawn().map_err(spawn_error)?
        };

        let mut bytes = Vec::new();
        let read = reader.read_to_end(&mut bytes);
        let status = child.wait().map_err(spawn_error)?;
        read.map_err(spawn_error)?;

        if !status.success() {
            debug!(command = %line, status = ?status.code(), "tool exited unsuccessfully");
        }

        Ok(Capture {
            mode,
            output: String::from_utf8_lossy(&bytes).into_owned(),
            exit_code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests;
