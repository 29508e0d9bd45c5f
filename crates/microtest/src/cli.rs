//! Command-line interface for the `microtest` binary.
//!
//! # Examples
//!
//! ```bash
//! # Run the bundled self-check suite
//! microtest
//!
//! # Machine-readable output, one JSON object per test
//! microtest --format json
//!
//! # Only fixtures whose name contains "string", with debug logging
//! microtest --fixture string -vv
//!
//! # Include the deliberately failing demonstration fixture
//! microtest --include-failing --report summary.json
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

/// Run the microtest self-check suite.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "microtest",
    version,
    about = "Minimal unit-testing runtime: runs the bundled self-check suite",
    long_about = "Runs the bundled self-check fixtures through the microtest engine \
                  and reports failures in the classic `file(line): Test failed` format."
)]
pub struct Cli {
    /// Output format for test results
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Only run fixtures whose name contains PATTERN
    #[arg(long, value_name = "PATTERN")]
    pub fixture: Option<String>,

    /// Only run tests whose name contains PATTERN
    #[arg(long, value_name = "PATTERN")]
    pub test: Option<String>,

    /// Also run the fixture whose tests fail on purpose
    #[arg(long)]
    pub include_failing: bool,

    /// Maximum failure message length in bytes
    #[arg(long, default_value_t = crate::DEFAULT_MESSAGE_CAPACITY)]
    pub message_capacity: usize,

    /// Write the suite summary as JSON to PATH
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Disable the coloured summary line
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// How test results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Classic console lines, failures only
    #[default]
    Human,
    /// One JSON object per event
    Json,
}

impl Cli {
    /// Create CLI from iterator (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if argument parsing fails.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Log level selected by the verbosity count.
    pub const fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
