use std::path::PathBuf;
use std::process::ExitCode;

use analysis_regress::coverage::CoverageAggregator;
use analysis_regress::discovery::TestPlan;
use analysis_regress::error::log_discovery_error;
use analysis_regress::runner::Capture;
use analysis_regress::{
    init_logging, ExecutionContext, HarnessConfig, RunReport, RunSummary, ScheduleMode, Scheduler,
    TestCatalog, TestKind, ToolRunner,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "regress",
    about = "Regression harness for the MATLAB/Simulink analysis toolchain"
)]
struct Cli {
    /// Run test cases one at a time, in discovery order
    #[arg(long)]
    single: bool,
    /// Only run one kind of test
    #[arg(long, value_enum)]
    suite: Option<SuiteArg>,
    /// Combine coverage data but skip the HTML and text reports
    #[arg(long)]
    no_summary: bool,
    /// Test root holding one directory per kind (defaults to the current directory)
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// JSON configuration file; `<root>/regress.json` is used when present
    #[arg(long)]
    config: Option<PathBuf>,
    /// Worker count for pooled mode (defaults to available parallelism)
    #[arg(long)]
    jobs: Option<usize>,
    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SuiteArg {
    Lexer,
    Parser,
    #[value(name = "simulink_parser")]
    SimulinkParser,
    #[value(name = "config_parser")]
    ConfigParser,
    Style,
    Metrics,
    Lint,
    Sanity,
}

impl From<SuiteArg> for TestKind {
    fn from(value: SuiteArg) -> Self {
        match value {
            SuiteArg::Lexer => TestKind::Lexer,
            SuiteArg::Parser => TestKind::Parser,
            SuiteArg::SimulinkParser => TestKind::ModelParser,
            SuiteArg::ConfigParser => TestKind::ConfigParser,
            SuiteArg::Style => TestKind::Style,
            SuiteArg::Metrics => TestKind::Metrics,
            SuiteArg::Lint => TestKind::Lint,
            SuiteArg::Sanity => TestKind::Sanity,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("regress error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("resolving test root {}", cli.root.display()))?;
    let config = match &cli.config {
        Some(path) => HarnessConfig::from_path(path)?,
        None => HarnessConfig::load(&root),
    };

    let catalog = TestCatalog::new(&root);
    catalog
        .preflight(&config)
        .inspect_err(|err| log_discovery_error(err, "preflight"))
        .context("toolchain preflight")?;

    let runner = ToolRunner::new(&config, &root);
    let coverage = CoverageAggregator::new(&runner);
    coverage.erase().context("erasing previous coverage data")?;

    let kinds: Vec<TestKind> = match cli.suite {
        Some(suite) => vec![suite.into()],
        None => TestKind::ALL.to_vec(),
    };
    let TestPlan { cases, sanity } = catalog
        .plan(&kinds, &config)
        .inspect_err(|err| log_discovery_error(err, "discovery"))
        .context("discovering test cases")?;

    let mode = if cli.single {
        ScheduleMode::Serial
    } else {
        cli.jobs
            .map(ScheduleMode::pooled_with)
            .unwrap_or_else(ScheduleMode::pooled)
    };
    log::info!("[Regress] {} test cases, mode {:?}", cases.len(), mode);

    let ctx = ExecutionContext::new(&config, &runner, &sanity);
    let statuses = Scheduler::new(ctx, mode).run(&cases, |status| println!("{status}"));

    if let Some(capture) = coverage.combine().context("combining coverage data")? {
        print_capture(&capture);
    }
    if !cli.no_summary {
        for capture in coverage.render().context("rendering coverage report")? {
            print_capture(&capture);
        }
    }

    println!("{}", RunSummary::from_statuses(&statuses));
    if let Some(path) = &cli.report {
        RunReport::new(&statuses).write_to(path)?;
    }
    Ok(())
}

fn print_capture(capture: &Capture) {
    let output = capture.output.trim_end();
    if !output.is_empty() {
        println!("{output}");
    }
}
