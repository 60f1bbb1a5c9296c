#![cfg(unix)]

use std::fs;
use std::path::Path;

use super::*;
use crate::config::{HarnessConfig, ToolTarget};
use crate::discovery::{SanityRegistry, TestCatalog};
use crate::kind::TestKind;
use crate::runner::ToolRunner;
use crate::status::Outcome;
use crate::test_support::{direct_config, make_case_dir, write_script};

fn populate(root: &Path, count: usize) {
    for idx in 0..count {
        let dir = make_case_dir(root, "lexer", &format!("case_{idx:02}"));
        fs::write(dir.join("input.m"), format!("token {idx}\n")).unwrap();
    }
    make_case_dir(root, "lint", "basic");
}

fn run_all(config: &HarnessConfig, root: &Path, mode: ScheduleMode) -> Vec<TestStatus> {
    let catalog = TestCatalog::new(root);
    let cases = catalog.discover(&[TestKind::Lexer, TestKind::Lint]).unwrap();
    let runner = ToolRunner::new(config, root);
    let registry = SanityRegistry::default();
    let ctx = ExecutionContext::new(config, &runner, &registry);
    Scheduler::new(ctx, mode).run(&cases, |_| {})
}

#[test]
fn serial_mode_follows_discovery_order() {
    let root = tempfile::tempdir().unwrap();
    let tool = write_script(&root.path().join("tool"), r#"cat "$@" 2>/dev/null; true"#);
    populate(root.path(), 3);

    let statuses = run_all(&direct_config(&tool), root.path(), ScheduleMode::Serial);
    let names: Vec<String> = statuses
        .iter()
        .map(|status| format!("{}/{}", status.kind, status.name))
        .collect();
    assert_eq!(
        names,
        vec!["lexer/case_00", "lexer/case_01", "lexer/case_02", "lint/basic"]
    );
}

#[test]
fn pooled_mode_reports_every_case_once() {
    let root = tempfile::tempdir().unwrap();
    let tool = write_script(&root.path().join("tool"), r#"cat "$@" 2>/dev/null; true"#);
    populate(root.path(), 12);

    let mut streamed = 0;
    let catalog = TestCatalog::new(root.path());
    let cases = catalog.discover(&[TestKind::Lexer, TestKind::Lint]).unwrap();
    let config = direct_config(&tool);
    let runner = ToolRunner::new(&config, root.path());
    let registry = SanityRegistry::default();
    let ctx = ExecutionContext::new(&config, &runner, &registry);
    let statuses = Scheduler::new(ctx, ScheduleMode::pooled_with(4)).run(&cases, |_| streamed += 1);

    assert_eq!(statuses.len(), 13);
    assert_eq!(streamed, 13);
    let mut names: Vec<&str> = statuses.iter().map(|status| status.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 13);
    assert!(statuses.iter().all(|status| !status.is_failure()));

    for idx in 0..12 {
        let out = root
            .path()
            .join(format!("lexer/case_{idx:02}/input.m.out"));
        assert_eq!(fs::read_to_string(out).unwrap(), format!("token {idx}\n"));
    }
}

#[test]
fn failing_case_does_not_abort_siblings() {
    let root = tempfile::tempdir().unwrap();
    let tool = write_script(&root.path().join("tool"), r#"echo ok"#);
    populate(root.path(), 2);

    let mut config = direct_config(&tool);
    config.tools.lint = ToolTarget::script("/nonexistent/lint");

    for mode in [ScheduleMode::Serial, ScheduleMode::pooled_with(2)] {
        let statuses = run_all(&config, root.path(), mode);
        assert_eq!(statuses.len(), 3);
        let failed: Vec<&TestStatus> = statuses.iter().filter(|s| s.is_failure()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "basic");
        assert!(statuses
            .iter()
            .filter(|s| s.kind == TestKind::Lexer)
            .all(|s| matches!(s.outcome, Outcome::Ran { invocations: 1, .. })));
    }
}

#[test]
fn zero_workers_falls_back_to_host_parallelism() {
    match ScheduleMode::pooled_with(0) {
        ScheduleMode::Pooled { workers } => assert!(workers.get() >= 1),
        ScheduleMode::Serial => panic!("expected pooled mode"),
    }
}

#[test]
fn panic_payloads_become_details() {
    let payload: Box<dyn Any + Send> = Box::new("boom");
    assert_eq!(panic_detail(payload.as_ref()), "boom");
    let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
    assert_eq!(panic_detail(payload.as_ref()), "bang");
    let payload: Box<dyn Any + Send> = Box::new(7u8);
    assert_eq!(panic_detail(payload.as_ref()), "unknown panic payload");
}
