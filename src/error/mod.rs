// Error types for the regression harness
//
// This module defines typed errors for fixture discovery and test case execution,
// each carrying a stable numeric code so status lines and run reports can be
// grouped without parsing messages.

mod discovery;
mod execution;

pub use discovery::{log_discovery_error, DiscoveryError, DiscoveryErrorCodes};
pub use execution::{log_execution_error, ExecutionError, ExecutionErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent reporting across
/// status lines, logs and the JSON run report.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
