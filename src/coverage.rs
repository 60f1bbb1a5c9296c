//! Coverage snapshot bookkeeping.
//!
//! Every tool invocation appends to the coverage data file in its working
//! directory, i.e. the test case directory. Before an executor returns, that
//! file is moved to `<test-root>/<data-file>.<kind>.<name>`, so concurrent
//! cases can never collide. Once all workers have joined the snapshots are
//! combined and rendered by the coverage program itself.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::discovery::TestCase;
use crate::error::ExecutionError;
use crate::runner::{Capture, ToolRunner};

pub struct CoverageAggregator<'a> {
    runner: &'a ToolRunner,
}

impl<'a> CoverageAggregator<'a> {
    pub fn new(runner: &'a ToolRunner) -> Self {
        Self { runner }
    }

    pub fn enabled(&self) -> bool {
        self.runner.coverage().enabled
    }

    /// Drop data from previous runs (`coverage erase`).
    pub fn erase(&self) -> Result<Option<Capture>, ExecutionError> {
        if !self.enabled() {
            return Ok(None);
        }
        let capture = self.runner.run_coverage(&["erase"])?;
        debug!(output = %capture.output.trim_end(), "coverage erase");
        Ok(Some(capture))
    }

    /// Remove a leftover data file in the case directory so `--append` starts clean.
    pub fn clear_stale(&self, case: &TestCase) -> Result<(), ExecutionError> {
        if !self.enabled() {
            return Ok(());
        }
        let stale = case.dir.join(&self.runner.coverage().data_file);
        if stale.is_file() {
            warn!(case = %case.id(), "removing stale coverage data");
            fs::remove_file(&stale).map_err(|err| ExecutionError::io(&stale, err))?;
        }
        Ok(())
    }

    /// Destination of a case's snapshot in the test root.
    pub fn snapshot_path(&self, case: &TestCase) -> PathBuf {
        self.runner
            .test_root()
            .join(case.coverage_snapshot_name(&self.runner.coverage().data_file))
    }

    /// Move the case's data file into its `(kind, name)`-keyed slot.
    ///
    /// Cases that issued no invocation have nothing to move.
    pub fn collect_snapshot(
        &self,
        case: &TestCase,
        invocations: usize,
    ) -> Result<Option<PathBuf>, ExecutionError> {
        if !self.enabled() || invocations == 0 {
            return Ok(None);
        }
        match self.move_snapshot(case)? {
            Some(target) => Ok(Some(target)),
            None => Err(ExecutionError::CoverageSnapshotMissing {
                path: case
                    .dir
                    .join(&self.runner.coverage().data_file)
                    .display()
                    .to_string(),
            }),
        }
    }

    /// Move whatever data a failed case left behind. Unlike
    /// [`CoverageAggregator::collect_snapshot`], a missing data file is fine.
    pub fn salvage_snapshot(&self, case: &TestCase) -> Result<Option<PathBuf>, ExecutionError> {
        if !self.enabled() {
            return Ok(None);
        }
        self.move_snapshot(case)
    }

    fn move_snapshot(&self, case: &TestCase) -> Result<Option<PathBuf>, ExecutionError> {
        let source = case.dir.join(&self.runner.coverage().data_file);
        if !source.is_file() {
            return Ok(None);
        }
        let target = self.snapshot_path(case);
        fs::rename(&source, &target).map_err(|err| ExecutionError::io(&target, err))?;
        debug!(case = %case.id(), snapshot = %target.display(), "coverage snapshot collected");
        Ok(Some(target))
    }

    /// Fold every snapshot in the test root into the aggregate database.
    pub fn combine(&self) -> Result<Option<Capture>, ExecutionError> {
        if !self.enabled() {
            return Ok(None);
        }
        info!("combining coverage snapshots");
        self.runner.run_coverage(&["combine"]).map(Some)
    }

    /// Render the aggregate as HTML and as a plain-text summary.
    pub fn render(&self) -> Result<Vec<Capture>, ExecutionError> {
        if !self.enabled() {
            return Ok(Vec::new());
        }
        let rcfile = format!("--rcfile={}", self.runner.coverage().rcfile);
        let html = self.runner.run_coverage(&["html", rcfile.as_str()])?;
        let report = self.runner.run_coverage(&["report", rcfile.as_str()])?;
        Ok(vec![html, report])
    }
}
