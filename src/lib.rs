// Analysis toolchain regression harness
// Drives lexer/parser/style/lint/metrics tools over fixture trees and captures their output

// Module declarations
pub mod config;
pub mod coverage;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod fixture;
pub mod kind;
pub mod runner;
pub mod scheduler;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use config::HarnessConfig;
pub use discovery::{TestCase, TestCatalog, TestPlan};
pub use executor::{run_test, ExecutionContext};
pub use kind::TestKind;
pub use runner::ToolRunner;
pub use scheduler::{ScheduleMode, Scheduler};
pub use status::{RunReport, RunSummary, TestStatus};

use tracing::Level;

/// Install the fmt subscriber; `verbosity` counts `-v` flags.
///
/// Records emitted through the `log` facade are forwarded as well. Returns
/// `false` when a subscriber or logger was already installed.
pub fn init_logging(verbosity: u8) -> bool {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    match tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        Ok(()) => true,
        Err(err) => {
            log::warn!("[Logging] keeping the existing subscriber: {}", err);
            false
        }
    }
}
