use super::*;

fn config_without_coverage() -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.coverage.enabled = false;
    config
}

#[test]
fn coverage_wraps_script_targets() {
    let runner = ToolRunner::new(&HarnessConfig::default(), Path::new("/work/toolchain/tests"));
    let line = runner.command_line(&ToolTarget::script("mh_lint"), &["--single", "."]);
    assert_eq!(line.program, OsString::from("coverage"));
    assert_eq!(
        line.to_string(),
        "coverage run --rcfile=/work/toolchain/tests/coverage.cfg --append \
         /work/toolchain/mh_lint --single ."
    );
}

#[test]
fn coverage_wraps_module_targets() {
    let runner = ToolRunner::new(&HarnessConfig::default(), Path::new("/work/toolchain/tests"));
    let line = runner.command_line(&ToolTarget::module("pkg.lexer"), &["a.m"]);
    assert_eq!(
        line.args,
        vec![
            OsString::from("run"),
            OsString::from("--rcfile=/work/toolchain/tests/coverage.cfg"),
            OsString::from("--append"),
            OsString::from("-m"),
            OsString::from("pkg.lexer"),
            OsString::from("a.m"),
        ]
    );
}

#[test]
fn without_coverage_modules_use_interpreter() {
    let runner = ToolRunner::new(&config_without_coverage(), Path::new("/t/tests"));
    let line = runner.command_line(&ToolTarget::module("pkg.cfg"), &["--no-tb", "x.cfg"]);
    assert_eq!(line.to_string(), "python3 -m pkg.cfg --no-tb x.cfg");

    let line = runner.command_line(&ToolTarget::script("mh_style"), &["."]);
    assert_eq!(line.to_string(), "/t/mh_style .");
}

#[test]
fn environment_expands_toolchain_root() {
    let runner = ToolRunner::new(&HarnessConfig::default(), Path::new("/work/toolchain/tests"));
    assert_eq!(runner.environment().get("PYTHONPATH"), Some("/work/toolchain"));
    assert_eq!(runner.environment().get("PYTHONIOENCODING"), Some("UTF-8"));
}

#[cfg(unix)]
#[test]
fn run_merges_streams_and_uses_explicit_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_without_coverage();
    config
        .environment
        .vars
        .insert("REGRESS_PROBE".to_string(), "probe-value".to_string());
    let runner = ToolRunner::new(&config, dir.path());
    let cwd = dir.path().canonicalize().unwrap();

    let capture = runner
        .run(
            &cwd,
            CaptureMode::Plain,
            &ToolTarget::script("/bin/sh"),
            &["-c", "echo out; echo err 1>&2; pwd; echo $REGRESS_PROBE; exit 3"],
        )
        .unwrap();

    let lines: Vec<&str> = capture.output.lines().collect();
    assert_eq!(lines[0], "out");
    assert_eq!(lines[1], "err");
    assert_eq!(lines[2], cwd.display().to_string());
    assert_eq!(lines[3], "probe-value");
    assert_eq!(capture.exit_code, Some(3));
    assert_eq!(capture.mode, CaptureMode::Plain);
}

#[test]
fn missing_program_is_a_spawn_error() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ToolRunner::new(&config_without_coverage(), dir.path());
    let err = runner
        .run(
            dir.path(),
            CaptureMode::Plain,
            &ToolTarget::script("/nonexistent/tool"),
            &["."],
        )
        .unwrap_err();
    assert!(matches!(err, ExecutionError::SpawnFailed { .. }));
}
