#![forbid(unsafe_code)]

//! # microtest
//!
//! Runs the bundled self-check suite through the microtest engine.
//!
//! ## Usage
//!
//! ```bash
//! microtest                          # run the passing fixtures
//! microtest --include-failing        # show what failures look like
//! microtest --format json            # JSON lines on stdout
//! microtest --report summary.json    # also write the suite summary
//! ```
//!
//! Exit status is 0 when every fixture passes, 1 when any fails and 2 for
//! invalid configuration.

use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use microtest::cli::{Cli, OutputFormat};
use microtest::{selfcheck, ConfigError, Console, RunConfig, SuiteSummary};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let config = RunConfig::from_cli(&cli);
    tracing::debug!(?config, "resolved configuration");
    if let Err(err) = config.validate() {
        eprintln!("microtest: {err}");
        return Ok(ExitCode::from(2));
    }

    let suite = config.apply_filters(selfcheck::suite(config.include_failing));
    let mut ctx = config.context(Console::stdout());
    let summary = suite.run(&mut ctx);

    if let Some(ref path) = config.report_path {
        let json = serde_json::to_string_pretty(&summary)?;
        fs::write(path, json).map_err(|source| ConfigError::ReportWrite {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "summary written");
    }

    print_summary(&config, &summary)?;

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs go to stderr so stdout only carries test output.
fn init_logging(level: tracing::Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// One summary line; on stderr in JSON mode.
fn print_summary(config: &RunConfig, summary: &SuiteSummary) -> io::Result<()> {
    let choice = if config.color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stream = match config.format {
        OutputFormat::Human => StandardStream::stdout(choice),
        OutputFormat::Json => StandardStream::stderr(choice),
    };

    let (label, color) = if summary.is_success() {
        ("ok", Color::Green)
    } else {
        ("FAILED", Color::Red)
    };
    write!(stream, "test result: ")?;
    stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stream, "{label}")?;
    stream.reset()?;
    writeln!(
        stream,
        ". {} run; {} passed; {} failed; {} fixtures; finished in {:.2}ms",
        summary.totals.run,
        summary.totals.passed,
        summary.totals.failed,
        summary.fixtures.len(),
        summary.duration.as_secs_f64() * 1000.0
    )?;
    stream.flush()
}
