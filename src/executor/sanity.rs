//! Sanity executor: runs a toolchain module's own self-test entry point.

use tracing::info;

use super::artifact::write_artifact;
use super::{CaseRun, ExecutionContext};
use crate::discovery::TestCase;
use crate::error::ExecutionError;
use crate::runner::CaptureMode;

pub(super) fn execute(
    case: &TestCase,
    ctx: &ExecutionContext<'_>,
) -> Result<CaseRun, ExecutionError> {
    // Unresolved names fail before any invocation or artifact.
    let target = ctx.sanity.resolve(&case.name)?.tool_target();
    let no_args: [&str; 0] = [];
    let capture = ctx
        .runner
        .run(&case.dir, CaptureMode::Plain, &target, &no_args)?;

    let artifact = case.dir.join(format!("{}.out", case.name));
    write_artifact(&artifact, &format!("{}\n", capture.output.trim_end()))?;
    info!(case = %case.id(), target = ?target, "sanity test complete");
    Ok(CaseRun::with_invocations(1))
}
