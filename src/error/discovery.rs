// Discovery error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Discovery error code constants
///
/// Error code range: 2001-2004
pub struct DiscoveryErrorCodes {}

impl DiscoveryErrorCodes {
    /// A requested kind has no fixture root directory
    pub const KIND_ROOT_MISSING: i32 = 2001;

    /// Listing a fixture directory failed
    pub const LISTING_FAILED: i32 = 2002;

    /// The toolchain under test is not where the harness expects it
    pub const TOOLCHAIN_MISSING: i32 = 2003;

    /// A fixture directory name cannot be used as a test case name
    pub const INVALID_CASE_NAME: i32 = 2004;
}

/// Log a discovery error with structured context
pub fn log_discovery_error(err: &DiscoveryError, context: &str) {
    error!(
        "Discovery error in {}: code={}, component=Discovery, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised before any test case runs
///
/// Unlike [`crate::error::ExecutionError`], these abort the whole run.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    /// `<root>/<kind-dir>` does not exist or is not a directory
    KindRootMissing { path: String },

    /// Directory listing failed
    ListingFailed { path: String, reason: String },

    /// Preflight did not find the toolchain layout
    ToolchainMissing { path: String },

    /// Fixture directory name is not valid UTF-8
    InvalidCaseName { path: String },
}

impl ErrorCode for DiscoveryError {
    fn code(&self) -> i32 {
        match self {
            DiscoveryError::KindRootMissing { .. } => DiscoveryErrorCodes::KIND_ROOT_MISSING,
            DiscoveryError::ListingFailed { .. } => DiscoveryErrorCodes::LISTING_FAILED,
            DiscoveryError::ToolchainMissing { .. } => DiscoveryErrorCodes::TOOLCHAIN_MISSING,
            DiscoveryError::InvalidCaseName { .. } => DiscoveryErrorCodes::INVALID_CASE_NAME,
        }
    }

    fn message(&self) -> String {
        match self {
            DiscoveryError::KindRootMissing { path } => {
                format!("fixture root {} does not exist", path)
            }
            DiscoveryError::ListingFailed { path, reason } => {
                format!("failed to list {}: {}", path, reason)
            }
            DiscoveryError::ToolchainMissing { path } => {
                format!(
                    "toolchain not found at {} (run from the toolchain's test directory)",
                    path
                )
            }
            DiscoveryError::InvalidCaseName { path } => {
                format!("fixture directory {} has a non UTF-8 name", path)
            }
        }
    }
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DiscoveryError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DiscoveryError {}
