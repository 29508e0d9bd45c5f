//! Failure signal and verdict types.
//!
//! A failing assertion produces a [`Failure`] and returns it as the `Err`
//! side of a [`TestOutcome`]. Test bodies and helpers forward it with `?`,
//! so the rest of the test body is skipped and the failure arrives at
//! [`RunContext::run_test`](crate::RunContext::run_test) no matter how deep
//! the assertion sits in the call stack.

use std::fmt::{self, Display, Write as _};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default capacity of the message buffer, in bytes.
pub const DEFAULT_MESSAGE_CAPACITY: usize = 512;

/// Signal that aborts the test currently in flight.
///
/// Obtain one from [`RunContext::fail`](crate::RunContext::fail) (which also
/// records the message in the run context) or from [`Failure::new`] in code
/// that has no context at hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Failure {
    message: String,
}

impl Failure {
    /// Create a failure carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefix the message, e.g. to say which hook produced it.
    pub(crate) fn context(self, prefix: &str) -> Self {
        Self {
            message: format!("{prefix}: {}", self.message),
        }
    }
}

/// Return type of test bodies, hooks and assertions.
pub type TestOutcome = Result<(), Failure>;

/// Verdict of a single test or of a whole fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Completed without a failure signal.
    Success,
    /// Aborted by a failure signal.
    Failed,
}

impl ResultKind {
    /// Get the string name of the verdict
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Success => "success",
            ResultKind::Failed => "failed",
        }
    }

    /// Returns true for [`ResultKind::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, ResultKind::Success)
    }

    /// Returns true for [`ResultKind::Failed`]
    pub fn is_failed(&self) -> bool {
        matches!(self, ResultKind::Failed)
    }
}

impl Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&TestOutcome> for ResultKind {
    fn from(outcome: &TestOutcome) -> Self {
        match outcome {
            Ok(()) => ResultKind::Success,
            Err(_) => ResultKind::Failed,
        }
    }
}

/// Bounded text buffer holding the last failure message.
///
/// Writes past the capacity are silently truncated at a character boundary.
#[derive(Debug, Clone)]
pub struct MessageBuffer {
    text: String,
    capacity: usize,
    truncated: bool,
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MESSAGE_CAPACITY)
    }
}

impl MessageBuffer {
    /// Create an empty buffer holding at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            capacity,
            truncated: false,
        }
    }

    /// Maximum number of bytes retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current contents.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if nothing has been written since the last clear.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the contents with the rendering of `message`.
    pub fn set(&mut self, message: impl Display) {
        self.clear();
        // Bounded::write_str never errors.
        let _ = write!(Bounded(self), "{message}");
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
        self.truncated = false;
    }

    /// Returns true if the last message did not fit.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// `fmt::Write` adapter that stops at the buffer capacity.
///
/// Once a piece has been cut, later pieces are dropped so the contents stay
/// a prefix of the full message.
struct Bounded<'a>(&'a mut MessageBuffer);

impl fmt::Write for Bounded<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let buffer = &mut *self.0;
        if buffer.truncated {
            return Ok(());
        }
        let room = buffer.capacity.saturating_sub(buffer.text.len());
        if s.len() <= room {
            buffer.text.push_str(s);
            return Ok(());
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        buffer.text.push_str(&s[..end]);
        buffer.truncated = true;
        Ok(())
    }
}

impl Display for MessageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
