//! Kind executors.
//!
//! [`run_test`] is the single entry point the scheduler calls. It applies the
//! platform guard, dispatches on the case's kind, moves the coverage snapshot
//! into place and turns every outcome, including errors, into a
//! [`TestStatus`].

use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::coverage::CoverageAggregator;
use crate::discovery::{Platform, SanityRegistry, TestCase};
use crate::error::{log_execution_error, ExecutionError};
use crate::kind::TestKind;
use crate::runner::ToolRunner;
use crate::status::TestStatus;

pub mod artifact;
pub mod per_file;
mod report;
mod sanity;
pub mod style;

pub use per_file::PerFileTool;

/// Read-only state shared by every executor in a run.
#[derive(Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub config: &'a HarnessConfig,
    pub runner: &'a ToolRunner,
    pub sanity: &'a SanityRegistry,
    pub host: Platform,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        config: &'a HarnessConfig,
        runner: &'a ToolRunner,
        sanity: &'a SanityRegistry,
    ) -> Self {
        Self {
            config,
            runner,
            sanity,
            host: Platform::host(),
        }
    }

    /// Pretend to run on another host; used to exercise platform markers.
    pub fn with_host(mut self, host: Platform) -> Self {
        self.host = host;
        self
    }
}

/// What an executor did for one case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseRun {
    pub invocations: usize,
    pub broken_fixes: Vec<String>,
}

impl CaseRun {
    pub fn with_invocations(invocations: usize) -> Self {
        Self {
            invocations,
            broken_fixes: Vec::new(),
        }
    }
}

/// Run one test case to completion and report its status. Never fails.
pub fn run_test(case: &TestCase, ctx: &ExecutionContext<'_>) -> TestStatus {
    if let Some(platform) = case.excluded_on(ctx.host) {
        info!(case = %case.id(), %platform, "skipping platform-restricted test");
        return TestStatus::skipped(case, platform);
    }

    match execute(case, ctx) {
        Ok(run) => TestStatus::completed(case, run),
        Err(err) => {
            log_execution_error(&err, &case.id());
            TestStatus::failed(case, &err)
        }
    }
}

fn execute(case: &TestCase, ctx: &ExecutionContext<'_>) -> Result<CaseRun, ExecutionError> {
    let coverage = CoverageAggregator::new(ctx.runner);
    coverage.clear_stale(case)?;
    debug!(case = %case.id(), dir = %case.dir.display(), "executing");

    match dispatch(case, ctx) {
        Ok(run) => {
            coverage.collect_snapshot(case, run.invocations)?;
            Ok(run)
        }
        Err(err) => {
            // Invocations made before the failure still count toward coverage.
            if let Err(salvage) = coverage.salvage_snapshot(case) {
                warn!(case = %case.id(), "could not move partial coverage data: {salvage}");
            }
            Err(err)
        }
    }
}

fn dispatch(case: &TestCase, ctx: &ExecutionContext<'_>) -> Result<CaseRun, ExecutionError> {
    if let Some(tool) = PerFileTool::for_kind(case.kind, &ctx.config.tools) {
        return per_file::execute(case, ctx, &tool);
    }
    match case.kind {
        TestKind::Style => style::execute(case, ctx),
        TestKind::Metrics => report::execute_metrics(case, ctx),
        TestKind::Lint => report::execute_lint(case, ctx),
        TestKind::Sanity => sanity::execute(case, ctx),
        TestKind::Lexer | TestKind::Parser | TestKind::ModelParser | TestKind::ConfigParser => {
            unreachable!("{} has a per-file tool", case.kind)
        }
    }
}
