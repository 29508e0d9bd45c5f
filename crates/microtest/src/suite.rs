//! Suite - Running several fixtures in one go
//!
//! Provides:
//! - Ordered fixture registration
//! - Filtering by fixture name and test name
//! - Per-fixture reports and aggregate totals

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::context::{RunContext, RunCounts};
use crate::entry::Fixture;
use crate::outcome::ResultKind;

/// Outcome of one fixture within a suite run
#[derive(Debug, Clone, Serialize)]
pub struct FixtureReport {
    /// Fixture name
    pub name: String,
    /// Fixture verdict
    pub verdict: ResultKind,
    /// Counters after the fixture finished
    pub counts: RunCounts,
    /// Wall-clock time spent in the fixture
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Failure message left by the last failure, if the fixture failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

/// Summary of a suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Total execution time
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
    /// Sum of all fixture counters
    pub totals: RunCounts,
    /// Per-fixture results, in run order
    pub fixtures: Vec<FixtureReport>,
}

impl SuiteSummary {
    /// Returns true if every fixture succeeded
    pub fn is_success(&self) -> bool {
        self.fixtures.iter().all(|report| report.verdict.is_success())
    }

    /// Overall verdict
    pub fn verdict(&self) -> ResultKind {
        if self.is_success() {
            ResultKind::Success
        } else {
            ResultKind::Failed
        }
    }

    /// Number of failed fixtures
    pub fn failed_fixtures(&self) -> usize {
        self.fixtures
            .iter()
            .filter(|report| report.verdict.is_failed())
            .count()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Ordered collection of fixtures
#[derive(Debug, Clone, Default)]
pub struct Suite {
    fixtures: Vec<Fixture>,
    fixture_filter: Option<String>,
    test_filter: Option<String>,
}

impl Suite {
    /// Create an empty suite
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fixture to the suite
    pub fn add_fixture(&mut self, fixture: Fixture) {
        self.fixtures.push(fixture);
    }

    /// Add a fixture, builder style
    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixtures.push(fixture);
        self
    }

    /// Only run fixtures whose name contains `pattern`
    pub fn filter_fixture(mut self, pattern: &str) -> Self {
        self.fixture_filter = Some(pattern.to_string());
        self
    }

    /// Only run tests whose name contains `pattern`
    pub fn filter_test(mut self, pattern: &str) -> Self {
        self.test_filter = Some(pattern.to_string());
        self
    }

    /// Number of registered fixtures
    pub fn fixture_count(&self) -> usize {
        self.fixtures.len()
    }

    /// Number of tests across all registered fixtures
    pub fn test_count(&self) -> usize {
        self.fixtures.iter().map(Fixture::test_count).sum()
    }

    /// Fixtures that survive the filters, in registration order
    pub fn selected(&self) -> Vec<Fixture> {
        self.fixtures
            .iter()
            .filter(|fixture| {
                self.fixture_filter
                    .as_deref()
                    .is_none_or(|pattern| fixture.name().contains(pattern))
            })
            .map(|fixture| match self.test_filter.as_deref() {
                Some(pattern) => fixture.filtered(pattern),
                None => fixture.clone(),
            })
            .filter(|fixture| self.test_filter.is_none() || fixture.test_count() > 0)
            .collect()
    }

    /// Run the selected fixtures one after another on `ctx`
    pub fn run(&self, ctx: &mut RunContext) -> SuiteSummary {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut summary = SuiteSummary {
            started_at,
            duration: Duration::ZERO,
            totals: RunCounts::default(),
            fixtures: Vec::new(),
        };

        for fixture in self.selected() {
            let fixture_start = Instant::now();
            let verdict = ctx.run_fixture(&fixture);
            let counts = ctx.counts();
            summary.totals += counts;
            summary.fixtures.push(FixtureReport {
                name: fixture.name().to_string(),
                verdict,
                counts,
                duration: fixture_start.elapsed(),
                last_message: verdict
                    .is_failed()
                    .then(|| ctx.last_message().to_string()),
            });
        }

        summary.duration = start.elapsed();
        info!(
            fixtures = summary.fixtures.len(),
            run = summary.totals.run,
            passed = summary.totals.passed,
            failed = summary.totals.failed,
            "suite finished"
        );
        summary
    }
}
