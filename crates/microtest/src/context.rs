//! RunContext - Execution state for test and fixture runs
//!
//! Holds the counters, the current fixture and test, the bounded failure
//! message, the runner state, the reporting slots and an opaque user value.
//! One context drives one run at a time; every operation borrows it mutably.

use std::any::Any;
use std::fmt::{self, Display};
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::entry::{Fixture, TestEntry};
use crate::outcome::{Failure, MessageBuffer, ResultKind, DEFAULT_MESSAGE_CAPACITY};
use crate::report::{Console, PrintFn, PrintHandler, ReportingConfig, ResultFn, ResultHandler};

/// Whether a test body is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunnerState {
    #[default]
    Ready,
    Executing,
}

/// Snapshot of the per-fixture counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunCounts {
    /// Tests attempted
    pub run: usize,
    /// Tests that completed without failure
    pub passed: usize,
    /// Tests that failed
    pub failed: usize,
}

impl RunCounts {
    /// Fixture verdict implied by the counters
    pub fn verdict(&self) -> ResultKind {
        if self.failed == 0 {
            ResultKind::Success
        } else {
            ResultKind::Failed
        }
    }
}

impl std::ops::AddAssign for RunCounts {
    fn add_assign(&mut self, other: Self) {
        self.run += other.run;
        self.passed += other.passed;
        self.failed += other.failed;
    }
}

/// Mutable execution state shared by the runners and the assertions.
pub struct RunContext {
    pub(crate) counts: RunCounts,
    pub(crate) current_fixture: Option<String>,
    pub(crate) current_test: Option<TestEntry>,
    pub(crate) message: MessageBuffer,
    pub(crate) state: RunnerState,
    pub(crate) reporting: ReportingConfig,
    user_state: Option<Box<dyn Any>>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("counts", &self.counts)
            .field("current_fixture", &self.current_fixture)
            .field("current_test", &self.current_test)
            .field("message", &self.message.as_str())
            .field("state", &self.state)
            .field("user_state", &self.user_state.is_some())
            .finish_non_exhaustive()
    }
}

impl RunContext {
    /// Fresh context: zero counters, default console hooks on stdout.
    pub fn new() -> Self {
        Self::with_parts(Console::stdout(), DEFAULT_MESSAGE_CAPACITY)
    }

    fn with_parts(console: Console, message_capacity: usize) -> Self {
        Self {
            counts: RunCounts::default(),
            current_fixture: None,
            current_test: None,
            message: MessageBuffer::with_capacity(message_capacity),
            state: RunnerState::Ready,
            reporting: ReportingConfig::new(console),
            user_state: None,
        }
    }

    /// Set the maximum length of the failure message, in bytes.
    pub fn with_message_capacity(mut self, capacity: usize) -> Self {
        self.message = MessageBuffer::with_capacity(capacity);
        self
    }

    /// Send default console output to `writer` instead of stdout.
    ///
    /// Reinstalls both default handlers.
    pub fn with_output<W: Write + Send + 'static>(self, writer: W) -> Self {
        self.with_console(Console::new(writer))
    }

    /// Send default console output to an existing console.
    ///
    /// Reinstalls both default handlers.
    pub fn with_console(mut self, console: Console) -> Self {
        self.reporting = ReportingConfig::new(console);
        self
    }

    /// Return to the freshly-initialised state.
    ///
    /// Counters, references, message and user state are cleared and both
    /// default handlers are reinstalled. Console and message capacity are kept.
    pub fn reset(&mut self) {
        let console = self.reporting.console().clone();
        *self = Self::with_parts(console, self.message.capacity());
    }

    /// Zero the run/pass/fail counters.
    pub fn reset_for_fixture(&mut self) {
        self.counts = RunCounts::default();
    }

    /// Record `message` and return the signal that aborts the current test.
    ///
    /// The caller must return the result as `Err`, usually via [`fail!`]:
    ///
    /// ```rust
    /// # use microtest::{RunContext, TestOutcome};
    /// fn body(ctx: &mut RunContext) -> TestOutcome {
    ///     if 2 + 2 != 4 {
    ///         return Err(ctx.fail("arithmetic is broken"));
    ///     }
    ///     Ok(())
    /// }
    /// ```
    ///
    /// [`fail!`]: crate::fail
    pub fn fail(&mut self, message: impl Display) -> Failure {
        self.message.set(message);
        Failure::new(self.message.as_str())
    }

    /// Route a diagnostic through the print handler.
    ///
    /// Dropped with a warning when no test is current.
    pub fn print(&mut self, message: impl Display) {
        let message = message.to_string();
        match self.current_test.as_ref() {
            Some(test) => self.reporting.print(test, &message),
            None => tracing::warn!(message = %message, "print outside of a test ignored"),
        }
    }

    /// Counters of the fixture being (or last) run
    pub fn counts(&self) -> RunCounts {
        self.counts
    }

    pub fn run_count(&self) -> usize {
        self.counts.run
    }

    pub fn pass_count(&self) -> usize {
        self.counts.passed
    }

    pub fn fail_count(&self) -> usize {
        self.counts.failed
    }

    /// Name of the fixture being (or last) run
    pub fn current_fixture(&self) -> Option<&str> {
        self.current_fixture.as_deref()
    }

    /// Test being (or last) run
    pub fn current_test(&self) -> Option<&TestEntry> {
        self.current_test.as_ref()
    }

    /// Contents of the failure message buffer
    pub fn last_message(&self) -> &str {
        self.message.as_str()
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Borrow the user value, if one of type `T` is set.
    pub fn user<T: Any>(&self) -> Option<&T> {
        self.user_state.as_deref()?.downcast_ref()
    }

    /// Mutably borrow the user value, if one of type `T` is set.
    pub fn user_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.user_state.as_deref_mut()?.downcast_mut()
    }

    /// Store a user value, replacing any previous one.
    pub fn set_user<T: Any>(&mut self, value: T) {
        self.user_state = Some(Box::new(value));
    }

    /// Remove and return the user value if it has type `T`.
    ///
    /// A value of another type is left in place.
    pub fn take_user<T: Any>(&mut self) -> Option<T> {
        match self.user_state.take()?.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(other) => {
                self.user_state = Some(other);
                None
            }
        }
    }

    pub fn clear_user(&mut self) {
        self.user_state = None;
    }

    /// Replace the result handler.
    pub fn set_result_handler<H: ResultHandler + 'static>(&mut self, handler: H) {
        self.reporting.set_result_handler(Box::new(handler));
    }

    /// Replace the result handler with a closure.
    pub fn set_result_fn<F>(&mut self, handler: F)
    where
        F: FnMut(&Fixture, &TestEntry, ResultKind, Option<&str>) + 'static,
    {
        self.set_result_handler(ResultFn(handler));
    }

    /// Replace the print handler.
    pub fn set_print_handler<H: PrintHandler + 'static>(&mut self, handler: H) {
        self.reporting.set_print_handler(Box::new(handler));
    }

    /// Replace the print handler with a closure.
    pub fn set_print_fn<F>(&mut self, handler: F)
    where
        F: FnMut(&TestEntry, &str) + 'static,
    {
        self.set_print_handler(PrintFn(handler));
    }

    /// Restore the console result handler.
    pub fn reset_result_handler(&mut self) {
        self.reporting.reset_result_handler();
    }

    /// Restore the console print handler.
    pub fn reset_print_handler(&mut self) {
        self.reporting.reset_print_handler();
    }

    /// Console used by the default handlers
    pub fn console(&self) -> &Console {
        self.reporting.console()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Recorder, ReportEvent, SharedBuffer};

    #[test]
    fn new_context_is_zeroed() {
        let ctx = RunContext::new();
        assert_eq!(ctx.counts(), RunCounts::default());
        assert!(ctx.current_fixture().is_none());
        assert!(ctx.current_test().is_none());
        assert_eq!(ctx.last_message(), "");
        assert_eq!(ctx.state(), RunnerState::Ready);
        assert!(ctx.user::<u32>().is_none());
    }

    #[test]
    fn fail_records_message() {
        let mut ctx = RunContext::new();
        let failure = ctx.fail(format_args!("bad value {}", 7));
        assert_eq!(failure.message(), "bad value 7");
        assert_eq!(ctx.last_message(), "bad value 7");
    }

    #[test]
    fn fail_respects_message_capacity() {
        let mut ctx = RunContext::new().with_message_capacity(5);
        let failure = ctx.fail("0123456789");
        assert_eq!(ctx.last_message(), "01234");
        assert_eq!(failure.message(), "01234");
    }

    #[test]
    fn formatted_fail_truncates_to_a_prefix() {
        fn body(ctx: &mut RunContext) -> crate::TestOutcome {
            crate::fail!(ctx, "a{}{}", String::from("é"), String::from("b"));
        }

        let mut ctx = RunContext::new().with_message_capacity(2);
        let failure = body(&mut ctx).unwrap_err();
        assert_eq!(ctx.last_message(), "a");
        assert_eq!(failure.message(), "a");
    }

    #[test]
    fn user_state_round_trip() {
        let mut ctx = RunContext::new();
        ctx.set_user(vec![1, 2]);
        assert_eq!(ctx.user::<Vec<i32>>(), Some(&vec![1, 2]));
        assert!(ctx.user::<String>().is_none());

        ctx.user_mut::<Vec<i32>>().unwrap().push(3);
        assert_eq!(ctx.take_user::<String>(), None);
        assert_eq!(ctx.take_user::<Vec<i32>>(), Some(vec![1, 2, 3]));
        assert!(ctx.user::<Vec<i32>>().is_none());
    }

    #[test]
    fn reset_clears_state_but_keeps_console() {
        let buffer = SharedBuffer::new();
        let mut ctx = RunContext::new()
            .with_output(buffer.clone())
            .with_message_capacity(8);
        ctx.set_user(5_u8);
        ctx.counts.run = 3;
        let _ = ctx.fail("message");
        ctx.set_result_handler(Recorder::new());

        ctx.reset();

        assert_eq!(ctx.counts(), RunCounts::default());
        assert!(ctx.user::<u8>().is_none());
        assert_eq!(ctx.last_message(), "");
        let _ = ctx.fail("0123456789");
        assert_eq!(ctx.last_message(), "01234567");

        ctx.current_test = Some(TestEntry::new("t", |_| Ok(()), "a.rs", 1));
        ctx.print("still here");
        assert_eq!(buffer.contents(), "a.rs(1): 't': still here\r\n");
    }

    #[test]
    fn reset_for_fixture_only_touches_counters() {
        let mut ctx = RunContext::new();
        ctx.set_user("keep");
        ctx.counts = RunCounts {
            run: 2,
            passed: 1,
            failed: 1,
        };
        ctx.reset_for_fixture();
        assert_eq!(ctx.counts(), RunCounts::default());
        assert_eq!(ctx.user::<&str>(), Some(&"keep"));
    }

    #[test]
    fn print_without_current_test_is_dropped() {
        let recorder = Recorder::new();
        let mut ctx = RunContext::new();
        ctx.set_print_handler(recorder.clone());
        ctx.print("nobody listens");
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn print_goes_to_custom_handler() {
        let recorder = Recorder::new();
        let mut ctx = RunContext::new();
        ctx.set_print_handler(recorder.clone());
        ctx.current_test = Some(TestEntry::new("t", |_| Ok(()), "a.rs", 1));
        ctx.print(42);
        assert_eq!(
            recorder.events(),
            vec![ReportEvent::Print {
                test: "t".to_string(),
                message: "42".to_string(),
            }]
        );
    }

    #[test]
    fn counts_verdict_and_sum() {
        let mut total = RunCounts::default();
        total += RunCounts {
            run: 2,
            passed: 2,
            failed: 0,
        };
        assert_eq!(total.verdict(), ResultKind::Success);
        total += RunCounts {
            run: 1,
            passed: 0,
            failed: 1,
        };
        assert_eq!(
            total,
            RunCounts {
                run: 3,
                passed: 2,
                failed: 1,
            }
        );
        assert_eq!(total.verdict(), ResultKind::Failed);
    }
}
