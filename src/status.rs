//! Per-test outcomes and the run report built from them.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::discovery::{Platform, TestCase};
use crate::error::{ErrorCode, ExecutionError};
use crate::executor::CaseRun;
use crate::kind::TestKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Tools ran and artifacts were written; tool diagnostics are not judged here
    Ran {
        invocations: usize,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        broken_fixes: Vec<String>,
    },
    /// Restricted to another platform; nothing was invoked
    Skipped { platform: Platform },
    Failed { code: i32, reason: String },
}

/// Status of one test case, rendered as the line the scheduler prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestStatus {
    pub kind: TestKind,
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl TestStatus {
    /// A case whose executor finished; broken fixes travel with it.
    pub fn completed(case: &TestCase, run: CaseRun) -> Self {
        Self::new(
            case,
            Outcome::Ran {
                invocations: run.invocations,
                broken_fixes: run.broken_fixes,
            },
        )
    }

    pub fn skipped(case: &TestCase, platform: Platform) -> Self {
        Self::new(case, Outcome::Skipped { platform })
    }

    pub fn failed(case: &TestCase, err: &ExecutionError) -> Self {
        Self::new(
            case,
            Outcome::Failed {
                code: err.code(),
                reason: err.message(),
            },
        )
    }

    /// A case whose executor panicked.
    pub fn panicked(case: &TestCase, detail: &str) -> Self {
        Self::new(
            case,
            Outcome::Failed {
                code: 0,
                reason: format!("panicked: {detail}"),
            },
        )
    }

    fn new(case: &TestCase, outcome: Outcome) -> Self {
        Self {
            kind: case.kind,
            name: case.name.clone(),
            outcome,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind.label();
        match &self.outcome {
            Outcome::Ran { broken_fixes, .. } if !broken_fixes.is_empty() => write!(
                f,
                "Ran {} test {} ({} broken fixes)",
                label,
                self.name,
                broken_fixes.len()
            ),
            Outcome::Ran { .. } => write!(f, "Ran {} test {}", label, self.name),
            Outcome::Skipped { platform } => {
                write!(f, "SKIPPED {}-only test {}", platform, self.name)
            }
            Outcome::Failed { reason, .. } => {
                write!(f, "FAILED {} test {} ({})", label, self.name, reason)
            }
        }
    }
}

/// Counts over a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub ran: usize,
    pub skipped: usize,
    pub failed: usize,
    pub invocations: usize,
    pub broken_fixes: usize,
}

impl RunSummary {
    pub fn from_statuses(statuses: &[TestStatus]) -> Self {
        let mut summary = RunSummary {
            total: statuses.len(),
            ..Default::default()
        };
        for status in statuses {
            match &status.outcome {
                Outcome::Ran {
                    invocations,
                    broken_fixes,
                } => {
                    summary.ran += 1;
                    summary.invocations += invocations;
                    summary.broken_fixes += broken_fixes.len();
                }
                Outcome::Skipped { .. } => summary.skipped += 1,
                Outcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tests: {} ran, {} skipped, {} failed ({} tool invocations, {} broken fixes)",
            self.total, self.ran, self.skipped, self.failed, self.invocations, self.broken_fixes
        )
    }
}

/// JSON document written by `--report`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub summary: RunSummary,
    pub results: &'a [TestStatus],
}

impl<'a> RunReport<'a> {
    pub fn new(results: &'a [TestStatus]) -> Self {
        Self {
            summary: RunSummary::from_statuses(results),
            results,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("creating report directory")?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing run report")?;
        std::fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn case(kind: TestKind, name: &str) -> TestCase {
        TestCase {
            kind,
            name: name.to_string(),
            dir: PathBuf::from(name),
            restricted_to: None,
        }
    }

    #[test]
    fn status_lines() {
        assert_eq!(
            TestStatus::completed(
                &case(TestKind::ModelParser, "m1"),
                CaseRun::with_invocations(2)
            )
            .to_string(),
            "Ran simulink parser test m1"
        );
        assert_eq!(
            TestStatus::skipped(&case(TestKind::Lint, "l1"), Platform::Linux).to_string(),
            "SKIPPED linux-only test l1"
        );
        let err = ExecutionError::UnresolvedModule {
            name: "ghost".to_string(),
            namespaces: vec!["core".to_string()],
        };
        let line = TestStatus::failed(&case(TestKind::Sanity, "ghost"), &err).to_string();
        assert!(line.starts_with("FAILED sanity test ghost (cannot find module ghost"));
    }

    #[test]
    fn broken_fixes_are_visible_in_status() {
        let status = TestStatus::completed(
            &case(TestKind::Style, "s"),
            CaseRun {
                invocations: 3,
                broken_fixes: vec!["./a.m".to_string()],
            },
        );
        assert_eq!(status.to_string(), "Ran style test s (1 broken fixes)");
    }

    #[test]
    fn summary_counts_outcomes() {
        let statuses = vec![
            TestStatus::completed(&case(TestKind::Lexer, "a"), CaseRun::with_invocations(2)),
            TestStatus::completed(
                &case(TestKind::Metrics, "b"),
                CaseRun::with_invocations(3),
            ),
            TestStatus::skipped(&case(TestKind::Parser, "c"), Platform::Windows),
            TestStatus::panicked(&case(TestKind::Lint, "d"), "boom"),
        ];
        let summary = RunSummary::from_statuses(&statuses);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.ran, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.invocations, 5);
    }

    #[test]
    fn report_serializes_flat_results() {
        let statuses = vec![TestStatus::skipped(
            &case(TestKind::Parser, "c"),
            Platform::Linux,
        )];
        let json = serde_json::to_value(RunReport::new(&statuses)).unwrap();
        assert_eq!(json["summary"]["skipped"], 1);
        assert_eq!(json["results"][0]["kind"], "parser");
        assert_eq!(json["results"][0]["outcome"], "skipped");
        assert_eq!(json["results"][0]["platform"], "linux");
    }
}
