//! Runtime configuration for the `microtest` binary.
//!
//! [`RunConfig`] is the resolved form of the command line: tests can build
//! one directly without going through clap.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};
use crate::context::RunContext;
use crate::report::{Console, JsonReporter};
use crate::suite::Suite;

/// Resolved settings for one run of the self-check suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Result output format
    pub format: OutputFormat,
    /// Fixture name filter
    pub fixture_filter: Option<String>,
    /// Test name filter
    pub test_filter: Option<String>,
    /// Run the deliberately failing fixture too
    pub include_failing: bool,
    /// Failure message capacity in bytes
    pub message_capacity: usize,
    /// Where to write the JSON summary
    pub report_path: Option<PathBuf>,
    /// Colour the summary line
    pub color: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            fixture_filter: None,
            test_filter: None,
            include_failing: false,
            message_capacity: crate::DEFAULT_MESSAGE_CAPACITY,
            report_path: None,
            color: true,
        }
    }
}

impl RunConfig {
    /// Resolve a configuration from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            fixture_filter: cli.fixture.clone(),
            test_filter: cli.test.clone(),
            include_failing: cli.include_failing,
            message_capacity: cli.message_capacity,
            report_path: cli.report.clone(),
            color: !cli.no_color,
        }
    }

    /// Check the configuration before anything runs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a zero message capacity or a report path
    /// whose directory does not exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.message_capacity == 0 {
            return Err(ConfigError::ZeroMessageCapacity);
        }

        let parent = self.report_path.as_deref().and_then(Path::parent);
        if let Some(parent) = parent {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(ConfigError::ReportDirNotFound(parent.to_path_buf()));
            }
        }

        Ok(())
    }

    /// Build a run context that reports in the configured format to `console`.
    pub fn context(&self, console: Console) -> RunContext {
        let mut ctx = RunContext::new()
            .with_console(console.clone())
            .with_message_capacity(self.message_capacity);
        if self.format == OutputFormat::Json {
            ctx.set_result_handler(JsonReporter::new(console.clone()));
            ctx.set_print_handler(JsonReporter::new(console));
        }
        ctx
    }

    /// Apply the name filters to `suite`.
    pub fn apply_filters(&self, mut suite: Suite) -> Suite {
        if let Some(ref pattern) = self.fixture_filter {
            suite = suite.filter_fixture(pattern);
        }
        if let Some(ref pattern) = self.test_filter {
            suite = suite.filter_test(pattern);
        }
        suite
    }
}

/// Configuration and host-side errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Message capacity of zero would drop every failure message.
    #[error("message capacity must be at least 1 byte")]
    ZeroMessageCapacity,

    /// Report directory does not exist.
    #[error("report directory not found: {0}")]
    ReportDirNotFound(PathBuf),

    /// Writing the report failed.
    #[error("failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Fixture, TestEntry};
    use crate::report::SharedBuffer;
    use crate::TestOutcome;

    #[test]
    fn default_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn from_cli_maps_every_flag() {
        let cli = Cli::try_parse_from([
            "microtest",
            "--format",
            "json",
            "--fixture",
            "ints",
            "--message-capacity",
            "32",
        ])
        .unwrap();
        let config = RunConfig::from_cli(&cli);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.fixture_filter.as_deref(), Some("ints"));
        assert_eq!(config.message_capacity, 32);
        assert!(config.test_filter.is_none());
    }

    #[test]
    fn rejects_zero_capacity() {
        let config = RunConfig {
            message_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroMessageCapacity)));
    }

    #[test]
    fn rejects_missing_report_dir() {
        let config = RunConfig {
            report_path: Some(PathBuf::from("/definitely/not/a/real/dir/out.json")),
            ..Default::default()
        };
        match config.validate() {
            Err(ConfigError::ReportDirNotFound(dir)) => {
                assert_eq!(dir, PathBuf::from("/definitely/not/a/real/dir"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn accepts_bare_report_file_name() {
        let config = RunConfig {
            report_path: Some(PathBuf::from("summary.json")),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_context_reports_passes() {
        let buffer = SharedBuffer::new();
        let config = RunConfig {
            format: OutputFormat::Json,
            ..Default::default()
        };
        let mut ctx = config.context(Console::new(buffer.clone()));
        let fixture = Fixture::new("f").with_test(TestEntry::new(
            "ok",
            |_: &mut RunContext| -> TestOutcome { Ok(()) },
            "c.rs",
            1,
        ));
        ctx.run_fixture(&fixture);
        assert!(buffer.contents().contains("\"result\":\"success\""));
    }

    #[test]
    fn human_context_is_silent_on_success() {
        let buffer = SharedBuffer::new();
        let mut ctx = RunConfig::default().context(Console::new(buffer.clone()));
        let fixture = Fixture::new("f").with_test(TestEntry::new(
            "ok",
            |_: &mut RunContext| -> TestOutcome { Ok(()) },
            "c.rs",
            1,
        ));
        ctx.run_fixture(&fixture);
        assert_eq!(buffer.contents(), "");
    }

    #[test]
    fn error_display() {
        let err = ConfigError::ReportDirNotFound(PathBuf::from("/x"));
        assert_eq!(err.to_string(), "report directory not found: /x");
    }
}
