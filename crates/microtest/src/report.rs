//! Reporting hooks
//!
//! Two observer slots receive events from the runner:
//! - [`ResultHandler`]: called once per completed test
//! - [`PrintHandler`]: called for explicit diagnostics from a test body
//!
//! Both default to [`ConsoleReporter`], whose output format is fixed:
//!
//! ```text
//! <file>(<line>): Test failed: '<name>': <message>
//! <file>(<line>): '<name>': <message>
//! ```
//!
//! Each slot can be replaced and reset to the console default on its own.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::entry::{Fixture, TestEntry};
use crate::outcome::ResultKind;

/// Receives the verdict of every test run by the fixture runner.
pub trait ResultHandler {
    /// `message` is `Some` only for failed tests.
    fn on_result(
        &mut self,
        fixture: &Fixture,
        test: &TestEntry,
        result: ResultKind,
        message: Option<&str>,
    );
}

/// Receives diagnostics printed from inside a test.
pub trait PrintHandler {
    fn on_print(&mut self, test: &TestEntry, message: &str);
}

/// Adapter turning a closure into a [`ResultHandler`].
pub struct ResultFn<F>(pub F);

impl<F> ResultHandler for ResultFn<F>
where
    F: FnMut(&Fixture, &TestEntry, ResultKind, Option<&str>),
{
    fn on_result(
        &mut self,
        fixture: &Fixture,
        test: &TestEntry,
        result: ResultKind,
        message: Option<&str>,
    ) {
        (self.0)(fixture, test, result, message);
    }
}

/// Adapter turning a closure into a [`PrintHandler`].
pub struct PrintFn<F>(pub F);

impl<F> PrintHandler for PrintFn<F>
where
    F: FnMut(&TestEntry, &str),
{
    fn on_print(&mut self, test: &TestEntry, message: &str) {
        (self.0)(test, message);
    }
}

/// Shared, thread-safe output destination for the built-in reporters.
#[derive(Clone)]
pub struct Console {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl Console {
    /// Console writing to the process stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Console writing to an arbitrary sink.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write `text` verbatim and flush.
    ///
    /// I/O errors are dropped: reporting never aborts a run.
    pub fn write_str(&self, text: &str) {
        let mut writer = self.writer.lock();
        let _ = writer.write_all(text.as_bytes());
        let _ = writer.flush();
    }
}

/// In-memory sink that can be read back while a console still holds it.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Discard everything written so far.
    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Line emitted by the default result handler for a failed test.
pub fn failure_line(test: &TestEntry, message: &str) -> String {
    format!(
        "{}({}): Test failed: '{}': {}\r\n",
        test.file(),
        test.line(),
        test.name(),
        message
    )
}

/// Line emitted by the default print handler.
pub fn print_line(test: &TestEntry, message: &str) -> String {
    format!(
        "{}({}): '{}': {}\r\n",
        test.file(),
        test.line(),
        test.name(),
        message
    )
}

/// Default reporter: failures and prints as plain console lines.
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    console: Console,
}

impl ConsoleReporter {
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

impl ResultHandler for ConsoleReporter {
    fn on_result(
        &mut self,
        _fixture: &Fixture,
        test: &TestEntry,
        result: ResultKind,
        message: Option<&str>,
    ) {
        if result.is_failed() {
            self.console
                .write_str(&failure_line(test, message.unwrap_or_default()));
        }
    }
}

impl PrintHandler for ConsoleReporter {
    fn on_print(&mut self, test: &TestEntry, message: &str) {
        self.console.write_str(&print_line(test, message));
    }
}

/// A single reporting event, as seen by [`Recorder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReportEvent {
    /// A test completed.
    Result {
        fixture: String,
        test: String,
        result: ResultKind,
        message: Option<String>,
    },
    /// A test printed a diagnostic.
    Print { test: String, message: String },
}

/// Handler pair that keeps every event in call order.
///
/// Clones share the same event list, so one clone can be installed in each
/// slot while the host keeps another to inspect.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<ReportEvent>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().clone()
    }

    /// Only the result events, as `(test, result)` pairs
    pub fn results(&self) -> Vec<(String, ResultKind)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Result { test, result, .. } => Some((test.clone(), *result)),
                ReportEvent::Print { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ResultHandler for Recorder {
    fn on_result(
        &mut self,
        fixture: &Fixture,
        test: &TestEntry,
        result: ResultKind,
        message: Option<&str>,
    ) {
        self.events.lock().push(ReportEvent::Result {
            fixture: fixture.name().to_string(),
            test: test.name().to_string(),
            result,
            message: message.map(str::to_string),
        });
    }
}

impl PrintHandler for Recorder {
    fn on_print(&mut self, test: &TestEntry, message: &str) {
        self.events.lock().push(ReportEvent::Print {
            test: test.name().to_string(),
            message: message.to_string(),
        });
    }
}

/// JSON line written by [`JsonReporter`]
#[derive(Debug, Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fixture: Option<&'a str>,
    test: &'a str,
    file: &'a str,
    line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ResultKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl<'a> JsonEvent<'a> {
    fn new(event: &'a str, test: &'a TestEntry) -> Self {
        Self {
            event,
            fixture: None,
            test: test.name(),
            file: test.file(),
            line: test.line(),
            result: None,
            message: None,
        }
    }
}

/// Machine-readable reporter: one JSON object per event, passes included.
#[derive(Debug, Clone, Default)]
pub struct JsonReporter {
    console: Console,
}

impl JsonReporter {
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    fn emit(&self, event: &JsonEvent<'_>) {
        if let Ok(json) = serde_json::to_string(event) {
            self.console.write_str(&json);
            self.console.write_str("\n");
        }
    }
}

impl ResultHandler for JsonReporter {
    fn on_result(
        &mut self,
        fixture: &Fixture,
        test: &TestEntry,
        result: ResultKind,
        message: Option<&str>,
    ) {
        let mut event = JsonEvent::new("result", test);
        event.fixture = Some(fixture.name());
        event.result = Some(result);
        event.message = message;
        self.emit(&event);
    }
}

impl PrintHandler for JsonReporter {
    fn on_print(&mut self, test: &TestEntry, message: &str) {
        let mut event = JsonEvent::new("print", test);
        event.message = Some(message);
        self.emit(&event);
    }
}

/// The two handler slots plus the console the defaults write to.
pub struct ReportingConfig {
    result_handler: Box<dyn ResultHandler>,
    print_handler: Box<dyn PrintHandler>,
    console: Console,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self::new(Console::stdout())
    }
}

impl fmt::Debug for ReportingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportingConfig")
            .field("console", &self.console)
            .finish_non_exhaustive()
    }
}

impl ReportingConfig {
    /// Defaults installed, writing to `console`.
    pub fn new(console: Console) -> Self {
        Self {
            result_handler: Box::new(ConsoleReporter::new(console.clone())),
            print_handler: Box::new(ConsoleReporter::new(console.clone())),
            console,
        }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn set_result_handler(&mut self, handler: Box<dyn ResultHandler>) {
        self.result_handler = handler;
    }

    pub fn set_print_handler(&mut self, handler: Box<dyn PrintHandler>) {
        self.print_handler = handler;
    }

    pub fn reset_result_handler(&mut self) {
        self.result_handler = Box::new(ConsoleReporter::new(self.console.clone()));
    }

    pub fn reset_print_handler(&mut self) {
        self.print_handler = Box::new(ConsoleReporter::new(self.console.clone()));
    }

    pub(crate) fn result(
        &mut self,
        fixture: &Fixture,
        test: &TestEntry,
        result: ResultKind,
        message: Option<&str>,
    ) {
        self.result_handler.on_result(fixture, test, result, message);
    }

    pub(crate) fn print(&mut self, test: &TestEntry, message: &str) {
        self.print_handler.on_print(test, message);
    }
}
