//! Metrics and lint executors: whole-directory runs, one combined artifact.

use tracing::info;

use super::artifact::{render_sections, write_artifact, EXPECTED_OUT};
use super::{CaseRun, ExecutionContext};
use crate::discovery::TestCase;
use crate::error::ExecutionError;
use crate::runner::CaptureMode;

pub const METRICS_HTML: &str = "metrics.html";
pub const METRICS_JSON: &str = "metrics.json";

/// Plain, HTML and JSON metrics reports over the case directory.
pub(super) fn execute_metrics(
    case: &TestCase,
    ctx: &ExecutionContext<'_>,
) -> Result<CaseRun, ExecutionError> {
    let target = &ctx.config.tools.metrics;
    let html_flag = format!("--html={METRICS_HTML}");
    let json_flag = format!("--json={METRICS_JSON}");

    let plain = ctx
        .runner
        .run(&case.dir, CaptureMode::Plain, target, &["--single", "."])?;
    let html = ctx.runner.run(
        &case.dir,
        CaptureMode::Html,
        target,
        &["--single", html_flag.as_str(), "."],
    )?;
    let json = ctx.runner.run(
        &case.dir,
        CaptureMode::Json,
        target,
        &["--single", json_flag.as_str(), "."],
    )?;

    write_artifact(
        &case.dir.join(EXPECTED_OUT),
        &render_sections(&[&plain, &html, &json], "\n\n"),
    )?;
    info!(case = %case.id(), "metrics test complete");
    Ok(CaseRun::with_invocations(3))
}

/// Plain-text lint diagnostics over the case directory.
pub(super) fn execute_lint(
    case: &TestCase,
    ctx: &ExecutionContext<'_>,
) -> Result<CaseRun, ExecutionError> {
    let plain = ctx.runner.run(
        &case.dir,
        CaptureMode::Plain,
        &ctx.config.tools.lint,
        &["--single", "."],
    )?;

    write_artifact(&case.dir.join(EXPECTED_OUT), &render_sections(&[&plain], ""))?;
    info!(case = %case.id(), "lint test complete");
    Ok(CaseRun::with_invocations(1))
}
