//! Executors that run a front-end tool once per source file.
//!
//! Lexer, parser, model parser and configuration parser cases all work the
//! same way: every matching file directly inside the case directory is handed
//! to the tool on its own, and the output lands next to it as `<file>.out`.

use tracing::{debug, info};

use super::artifact::write_artifact;
use super::{CaseRun, ExecutionContext};
use crate::config::{ToolTarget, ToolsConfig};
use crate::discovery::{files_with_extension, TestCase};
use crate::error::ExecutionError;
use crate::kind::TestKind;
use crate::runner::CaptureMode;

/// Suffix of per-file artifacts.
pub const OUTPUT_SUFFIX: &str = ".out";

/// Which files a per-file kind consumes and how its tool is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerFileTool<'a> {
    pub extension: &'static str,
    pub target: &'a ToolTarget,
    /// Flags placed before the file argument
    pub flags: &'static [&'static str],
}

impl<'a> PerFileTool<'a> {
    fn lexer(tools: &'a ToolsConfig) -> Self {
        PerFileTool {
            extension: "m",
            target: &tools.lexer,
            flags: &[],
        }
    }

    fn parser(tools: &'a ToolsConfig) -> Self {
        PerFileTool {
            extension: "m",
            target: &tools.parser,
            flags: &["--no-tb", "--tree"],
        }
    }

    fn model_parser(tools: &'a ToolsConfig) -> Self {
        PerFileTool {
            extension: "slx",
            target: &tools.model_parser,
            flags: &[],
        }
    }

    fn config_parser(tools: &'a ToolsConfig) -> Self {
        PerFileTool {
            extension: "cfg",
            target: &tools.config_parser,
            flags: &["--no-tb"],
        }
    }

    /// Tool description for a per-file kind; `None` for directory-level kinds.
    /// This is the only place that decides which kinds run per file.
    pub fn for_kind(kind: TestKind, tools: &'a ToolsConfig) -> Option<Self> {
        match kind {
            TestKind::Lexer => Some(Self::lexer(tools)),
            TestKind::Parser => Some(Self::parser(tools)),
            TestKind::ModelParser => Some(Self::model_parser(tools)),
            TestKind::ConfigParser => Some(Self::config_parser(tools)),
            TestKind::Style | TestKind::Metrics | TestKind::Lint | TestKind::Sanity => None,
        }
    }
}

pub(super) fn execute(
    case: &TestCase,
    ctx: &ExecutionContext<'_>,
    tool: &PerFileTool<'_>,
) -> Result<CaseRun, ExecutionError> {
    let files = files_with_extension(&case.dir, tool.extension)
        .map_err(|err| ExecutionError::io(&case.dir, err))?;
    if files.is_empty() {
        debug!(case = %case.id(), extension = tool.extension, "no input files");
    }

    for file in &files {
        let mut args: Vec<&str> = tool.flags.to_vec();
        args.push(file.as_str());
        let capture = ctx
            .runner
            .run(&case.dir, CaptureMode::Plain, tool.target, &args)?;
        let artifact = case.dir.join(format!("{file}{OUTPUT_SUFFIX}"));
        write_artifact(&artifact, &capture.output)?;
    }

    info!(case = %case.id(), files = files.len(), "{} test complete", case.kind.label());
    Ok(CaseRun::with_invocations(files.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_kinds_have_no_per_file_tool() {
        let tools = ToolsConfig::default();
        for kind in [
            TestKind::Style,
            TestKind::Metrics,
            TestKind::Lint,
            TestKind::Sanity,
        ] {
            assert!(PerFileTool::for_kind(kind, &tools).is_none());
        }
    }

    #[test]
    fn per_file_kinds_pick_their_inputs() {
        let tools = ToolsConfig::default();
        let parser = PerFileTool::for_kind(TestKind::Parser, &tools).unwrap();
        assert_eq!(parser.extension, "m");
        assert_eq!(parser.flags, &["--no-tb", "--tree"]);
        let model = PerFileTool::for_kind(TestKind::ModelParser, &tools).unwrap();
        assert_eq!(model.extension, "slx");
        let cfg = PerFileTool::for_kind(TestKind::ConfigParser, &tools).unwrap();
        assert_eq!(cfg.extension, "cfg");
        assert_eq!(cfg.target, &tools.config_parser);
    }
}
