// Execution error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Execution error code constants
///
/// Error code range: 3001-3005
pub struct ExecutionErrorCodes {}

impl ExecutionErrorCodes {
    /// The external tool could not be started
    pub const SPAWN_FAILED: i32 = 3001;

    /// Reading or writing a file under the test case directory failed
    pub const IO_FAILED: i32 = 3002;

    /// No sanity module matches the test case name in any namespace
    pub const UNRESOLVED_MODULE: i32 = 3003;

    /// Tool invocations ran but left no coverage data file behind
    pub const COVERAGE_SNAPSHOT_MISSING: i32 = 3004;

    /// A tracked fixture could not be written back to its original bytes
    pub const FIXTURE_RESTORE_FAILED: i32 = 3005;
}

/// Log an execution error with structured context
///
/// The context is usually the `<kind>/<name>` identity of the test case.
pub fn log_execution_error(err: &ExecutionError, context: &str) {
    error!(
        "Execution error in {}: code={}, component=Executor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while driving the external tools for one test case
///
/// None of these escape the scheduler: they are rendered into a failed
/// status for the affected test case only.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// The child process could not be spawned or waited on
    SpawnFailed { program: String, reason: String },

    /// File system access failed
    Io { path: String, reason: String },

    /// Sanity test name did not resolve in any known namespace
    UnresolvedModule {
        name: String,
        namespaces: Vec<String>,
    },

    /// Expected `.coverage` data file was not produced
    CoverageSnapshotMissing { path: String },

    /// Fixture restoration failed
    FixtureRestoreFailed { path: String, reason: String },
}

impl ExecutionError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        ExecutionError::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl ErrorCode for ExecutionError {
    fn code(&self) -> i32 {
        match self {
            ExecutionError::SpawnFailed { .. } => ExecutionErrorCodes::SPAWN_FAILED,
            ExecutionError::Io { .. } => ExecutionErrorCodes::IO_FAILED,
            ExecutionError::UnresolvedModule { .. } => ExecutionErrorCodes::UNRESOLVED_MODULE,
            ExecutionError::CoverageSnapshotMissing { .. } => {
                ExecutionErrorCodes::COVERAGE_SNAPSHOT_MISSING
            }
            ExecutionError::FixtureRestoreFailed { .. } => {
                ExecutionErrorCodes::FIXTURE_RESTORE_FAILED
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ExecutionError::SpawnFailed { program, reason } => {
                format!("failed to run {}: {}", program, reason)
            }
            ExecutionError::Io { path, reason } => {
                format!("I/O error on {}: {}", path, reason)
            }
            ExecutionError::UnresolvedModule { name, namespaces } => {
                format!(
                    "cannot find module {} in namespaces [{}]",
                    name,
                    namespaces.join(", ")
                )
            }
            ExecutionError::CoverageSnapshotMissing { path } => {
                format!("coverage data file {} was not produced", path)
            }
            ExecutionError::FixtureRestoreFailed { path, reason } => {
                format!("failed to restore fixture {}: {}", path, reason)
            }
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message(), self.code())
    }
}

impl std::error::Error for ExecutionError {}

impl From<std::io::Error> for ExecutionError {
    fn from(err: std::io::Error) -> Self {
        ExecutionError::Io {
            path: "<unknown>".to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_codes() {
        assert_eq!(
            ExecutionError::SpawnFailed {
                program: "coverage".to_string(),
                reason: "test".to_string()
            }
            .code(),
            ExecutionErrorCodes::SPAWN_FAILED
        );
        assert_eq!(
            ExecutionError::UnresolvedModule {
                name: "m_ast".to_string(),
                namespaces: vec![]
            }
            .code(),
            ExecutionErrorCodes::UNRESOLVED_MODULE
        );
        assert_eq!(
            ExecutionError::CoverageSnapshotMissing {
                path: ".coverage".to_string()
            }
            .code(),
            3004
        );
    }

    #[test]
    fn test_unresolved_module_message_lists_namespaces() {
        let err = ExecutionError::UnresolvedModule {
            name: "nope".to_string(),
            namespaces: vec!["core".to_string(), "frontend".to_string()],
        };
        assert_eq!(
            err.message(),
            "cannot find module nope in namespaces [core, frontend]"
        );
        assert!(format!("{}", err).contains("code 3003"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("disk full");
        let err: ExecutionError = io_err.into();
        match err {
            ExecutionError::Io { reason, .. } => assert!(reason.contains("disk full")),
            other => panic!("Expected Io, got {other:?}"),
        }
    }
}
