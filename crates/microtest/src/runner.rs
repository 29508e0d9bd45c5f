//! Test and fixture runners.
//!
//! [`RunContext::run_test`] is the boundary where a propagated [`Failure`]
//! turns into a [`ResultKind::Failed`] verdict. [`RunContext::run_fixture`]
//! drives the hooks around it, keeps the counters and calls the result
//! handler once per test, in declaration order.

use tracing::{debug, trace, warn};

use crate::context::{RunContext, RunnerState};
use crate::entry::{Fixture, TestEntry, TestFn};
use crate::outcome::{Failure, ResultKind, TestOutcome};

/// Message recorded when `run_test` or `run_fixture` is called from inside a
/// running test.
pub const NESTED_RUN_MESSAGE: &str = "nested test execution is not supported";

impl RunContext {
    /// Run a single test body.
    ///
    /// Returns [`ResultKind::Success`] if the body returns `Ok`, and
    /// [`ResultKind::Failed`] if it returns a [`Failure`]; in that case the
    /// failure message is left in [`last_message`](Self::last_message).
    pub fn run_test(&mut self, entry: &TestEntry) -> ResultKind {
        if self.state == RunnerState::Executing {
            warn!(test = entry.name(), "nested run_test rejected");
            let _ = self.fail(NESTED_RUN_MESSAGE);
            return ResultKind::Failed;
        }

        self.current_test = Some(entry.clone());
        self.state = RunnerState::Executing;
        trace!(test = entry.name(), "executing");
        let outcome = entry.invoke(self);
        self.state = RunnerState::Ready;

        match outcome {
            Ok(()) => ResultKind::Success,
            Err(failure) => {
                self.record(&failure);
                ResultKind::Failed
            }
        }
    }

    /// Run every test of `fixture` with its hooks.
    ///
    /// Counters are reset first. The fixture succeeds when no test failed
    /// and the fixture teardown did not fail.
    ///
    /// Hook failures:
    /// - fixture setup: no test body or per-test hook runs, the fixture
    ///   teardown is skipped, and every test is reported as failed
    /// - test setup: the body and its test teardown are skipped and the
    ///   test is reported as failed
    /// - test teardown: a passing test becomes failed; a failing test keeps
    ///   its own message
    /// - fixture teardown: the fixture verdict becomes failed
    ///
    /// Called from inside a running test, it records
    /// [`NESTED_RUN_MESSAGE`] and returns Failed without touching the
    /// counters, the current fixture or the handlers.
    pub fn run_fixture(&mut self, fixture: &Fixture) -> ResultKind {
        if self.state == RunnerState::Executing {
            warn!(fixture = fixture.name(), "nested run_fixture rejected");
            let _ = self.fail(NESTED_RUN_MESSAGE);
            return ResultKind::Failed;
        }

        self.reset_for_fixture();
        self.current_fixture = Some(fixture.name().to_string());
        debug!(
            fixture = fixture.name(),
            tests = fixture.test_count(),
            "running fixture"
        );

        if let Err(failure) = self.run_hook(fixture.fixture_setup(), "fixture setup") {
            let failure = failure.context("fixture setup failed");
            warn!(fixture = fixture.name(), message = failure.message(), "fixture setup failed");
            for entry in fixture.tests() {
                self.current_test = Some(entry.clone());
                self.counts.run += 1;
                self.record(&failure);
                self.finish_test(fixture, entry, ResultKind::Failed);
            }
            return ResultKind::Failed;
        }

        for entry in fixture.tests() {
            let result = self.run_fixture_test(fixture, entry);
            self.finish_test(fixture, entry, result);
        }

        let teardown = self.run_hook(fixture.fixture_teardown(), "fixture teardown");
        let verdict = match teardown {
            Ok(()) => self.counts.verdict(),
            Err(failure) => {
                let failure = failure.context("fixture teardown failed");
                warn!(fixture = fixture.name(), message = failure.message(), "fixture teardown failed");
                self.record(&failure);
                ResultKind::Failed
            }
        };

        debug!(
            fixture = fixture.name(),
            run = self.counts.run,
            passed = self.counts.passed,
            failed = self.counts.failed,
            verdict = %verdict,
            "fixture finished"
        );
        verdict
    }

    /// Setup, body and teardown of one test inside a fixture.
    fn run_fixture_test(&mut self, fixture: &Fixture, entry: &TestEntry) -> ResultKind {
        // Setup, body and teardown all see this entry as the current test.
        self.current_test = Some(entry.clone());
        if let Err(failure) = self.run_hook(fixture.test_setup(), "test setup") {
            self.counts.run += 1;
            self.record(&failure.context("test setup failed"));
            return ResultKind::Failed;
        }

        self.counts.run += 1;
        let result = self.run_test(entry);

        // The test's own message must survive the teardown.
        let retained = result.is_failed().then(|| self.message.as_str().to_string());
        let teardown = self.run_hook(fixture.test_teardown(), "test teardown");

        match (result, teardown) {
            (ResultKind::Success, Ok(())) => ResultKind::Success,
            (ResultKind::Success, Err(failure)) => {
                self.record(&failure.context("test teardown failed"));
                ResultKind::Failed
            }
            (ResultKind::Failed, teardown) => {
                if let Err(failure) = teardown {
                    warn!(
                        test = entry.name(),
                        message = failure.message(),
                        "test teardown failed after test failure"
                    );
                }
                if let Some(message) = retained {
                    self.message.set(message);
                }
                ResultKind::Failed
            }
        }
    }

    /// Update the counters and notify the result handler.
    fn finish_test(&mut self, fixture: &Fixture, entry: &TestEntry, result: ResultKind) {
        match result {
            ResultKind::Success => {
                self.counts.passed += 1;
                debug!(test = entry.name(), "passed");
                self.reporting.result(fixture, entry, result, None);
            }
            ResultKind::Failed => {
                self.counts.failed += 1;
                debug!(test = entry.name(), message = self.message.as_str(), "failed");
                self.reporting
                    .result(fixture, entry, result, Some(self.message.as_str()));
            }
        }
    }

    fn run_hook(&mut self, hook: Option<&TestFn>, label: &'static str) -> TestOutcome {
        match hook {
            Some(hook) => {
                trace!(hook = label, "running hook");
                hook(self)
            }
            None => Ok(()),
        }
    }

    /// Put the failure's message in the buffer.
    fn record(&mut self, failure: &Failure) {
        self.message.set(failure.message());
    }
}
