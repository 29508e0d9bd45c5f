#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Microtest
//!
//! A minimal unit-testing runtime: named test functions grouped into
//! fixtures, setup/teardown hooks, typed assertions and pluggable reporting.
//!
//! A failing assertion aborts only the test it belongs to. It records a
//! message and returns a [`Failure`], which the test body forwards with `?`;
//! the runner turns it into a [`ResultKind::Failed`] verdict, still runs the
//! test's teardown and moves on to the next test.
//!
//! ## Example
//!
//! ```rust
//! use microtest::{fixture, RunContext, ResultKind, SharedBuffer, TestOutcome};
//!
//! fn adds(ctx: &mut RunContext) -> TestOutcome {
//!     ctx.assert_int_eq(4, 2 + 2, None)
//! }
//!
//! fn compares(ctx: &mut RunContext) -> TestOutcome {
//!     ctx.assert_str_eq("Foo", "foo", None)?;
//!     unreachable!("the assertion above aborts the test");
//! }
//!
//! let output = SharedBuffer::new();
//! let mut ctx = RunContext::new().with_output(output.clone());
//! let verdict = ctx.run_fixture(&fixture!("basics" => [adds, compares]));
//!
//! assert_eq!(verdict, ResultKind::Failed);
//! assert_eq!((ctx.run_count(), ctx.pass_count(), ctx.fail_count()), (2, 1, 1));
//! assert!(output
//!     .contents()
//!     .ends_with("Test failed: 'compares': Strings not equal. Expected [Foo], Actual [foo]\r\n"));
//! ```
//!
//! ## Reporting
//!
//! - [`ConsoleReporter`]: default, failures and prints as console lines
//! - [`JsonReporter`]: one JSON object per event
//! - [`Recorder`]: keeps events in memory
//!
//! Replace either slot with [`RunContext::set_result_handler`] or
//! [`RunContext::set_print_handler`] and restore the console default with
//! the matching `reset_*` method.

pub mod assert;
pub mod cli;
pub mod config;
mod context;
mod entry;
mod macros;
mod outcome;
pub mod report;
mod runner;
pub mod selfcheck;
mod suite;

pub use assert::{Integer, Nullable};
pub use config::{ConfigError, RunConfig};
pub use context::{RunContext, RunCounts, RunnerState};
pub use entry::{Fixture, TestEntry, TestFn};
pub use outcome::{DEFAULT_MESSAGE_CAPACITY, Failure, MessageBuffer, ResultKind, TestOutcome};
pub use report::{
    Console, ConsoleReporter, JsonReporter, PrintHandler, Recorder, ReportEvent, ResultHandler,
    SharedBuffer,
};
pub use runner::NESTED_RUN_MESSAGE;
pub use suite::{FixtureReport, Suite, SuiteSummary};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Fixture, PrintHandler, ResultHandler, ResultKind, RunContext, Suite, TestEntry,
        TestOutcome, assert_int_eq_as, ensure, fail, fixture, test_entry,
    };
}
