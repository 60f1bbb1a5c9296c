//! Style checker executor with fix-pass convergence check.
//!
//! The checker runs three times over the case directory: once read-only to
//! produce the HTML report, then twice with `--fix`. An autofixer must reach
//! a fixed point after one pass, so any fixture whose bytes change during the
//! second pass is listed in the artifact's BROKEN FIXES section. Fixtures
//! are always written back to their original bytes.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::artifact::{render_broken_fixes, render_sections, write_artifact, EXPECTED_OUT};
use super::{CaseRun, ExecutionContext};
use crate::discovery::TestCase;
use crate::error::ExecutionError;
use crate::fixture::FixtureGuard;
use crate::runner::{Capture, CaptureMode};

/// HTML report written by the read-only pass.
pub const HTML_REPORT: &str = "expected_out.html";

struct StylePasses {
    html: Capture,
    fix_one: Capture,
    broken: BTreeSet<String>,
}

pub(super) fn execute(
    case: &TestCase,
    ctx: &ExecutionContext<'_>,
) -> Result<CaseRun, ExecutionError> {
    let mut guard = FixtureGuard::snapshot(&case.dir, &ctx.config.style.fixture_extensions)?;
    if guard.is_empty() {
        debug!(case = %case.id(), "no tracked fixtures");
    } else {
        debug!(case = %case.id(), fixtures = guard.len(), "fixtures snapshotted");
    }

    let passes = run_passes(case, ctx, &mut guard);
    let restored = guard.restore();
    let passes = passes?;
    restored?;

    let mut artifact = render_sections(&[&passes.fix_one, &passes.html], "\n");
    artifact.push_str(&render_broken_fixes(&passes.broken));
    write_artifact(&case.dir.join(EXPECTED_OUT), &artifact)?;

    if !passes.broken.is_empty() {
        warn!(
            case = %case.id(),
            broken = ?passes.broken,
            "autofix did not reach a fixed point"
        );
    }
    info!(case = %case.id(), "style test complete");

    Ok(CaseRun {
        invocations: 3,
        broken_fixes: passes.broken.into_iter().collect(),
    })
}

fn run_passes(
    case: &TestCase,
    ctx: &ExecutionContext<'_>,
    guard: &mut FixtureGuard,
) -> Result<StylePasses, ExecutionError> {
    let target = &ctx.config.tools.style;
    let extra = &ctx.config.style.extra_args;
    let html_flag = format!("--html={HTML_REPORT}");

    let html = ctx.runner.run(
        &case.dir,
        CaptureMode::Html,
        target,
        &style_args(&[], extra, &html_flag),
    )?;

    let fix_one = ctx.runner.run(
        &case.dir,
        CaptureMode::FixPass1,
        target,
        &style_args(&["--debug-validate-links"], extra, "--fix"),
    )?;
    guard.record_pass_one()?;

    let fix_two = ctx.runner.run(
        &case.dir,
        CaptureMode::FixPass2,
        target,
        &style_args(&[], extra, "--fix"),
    )?;
    debug!(case = %case.id(), output = %fix_two.output, "second fix pass");

    let broken = guard.changed_since_pass_one()?;
    Ok(StylePasses {
        html,
        fix_one,
        broken,
    })
}

/// `<leading...> . --single <extra...> <mode_flag>`
fn style_args(leading: &[&str], extra: &[String], mode_flag: &str) -> Vec<String> {
    let mut args: Vec<String> = leading.iter().map(|arg| arg.to_string()).collect();
    args.push(".".to_string());
    args.push("--single".to_string());
    args.extend(extra.iter().cloned());
    args.push(mode_flag.to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_order_matches_tool_contract() {
        let extra = vec!["--process-slx".to_string()];
        assert_eq!(
            style_args(&[], &extra, "--html=expected_out.html"),
            vec![".", "--single", "--process-slx", "--html=expected_out.html"]
        );
        assert_eq!(
            style_args(&["--debug-validate-links"], &extra, "--fix"),
            vec!["--debug-validate-links", ".", "--single", "--process-slx", "--fix"]
        );
    }
}
