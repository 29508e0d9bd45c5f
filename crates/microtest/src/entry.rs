//! Test and fixture definitions.
//!
//! A [`TestEntry`] pairs a test body with the name and source location used
//! in reports. A [`Fixture`] is an ordered list of entries plus up to four
//! optional hooks. Both are plain values: build them once, run them as many
//! times as needed.

use std::fmt;
use std::sync::Arc;

use crate::context::RunContext;
use crate::outcome::TestOutcome;

/// Shared callable used for test bodies and hooks.
pub type TestFn = Arc<dyn Fn(&mut RunContext) -> TestOutcome + Send + Sync>;

/// A named unit of test logic plus its source location.
#[derive(Clone)]
pub struct TestEntry {
    name: String,
    function: TestFn,
    file: String,
    line: u32,
}

impl TestEntry {
    /// Create an entry. Usually called through [`test_entry!`](crate::test_entry).
    pub fn new<F>(name: impl Into<String>, function: F, file: impl Into<String>, line: u32) -> Self
    where
        F: Fn(&mut RunContext) -> TestOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            function: Arc::new(function),
            file: file.into(),
            line,
        }
    }

    /// Test name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source file the test was registered from
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Source line the test was registered from
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Invoke the test body.
    pub(crate) fn invoke(&self, ctx: &mut RunContext) -> TestOutcome {
        (self.function)(ctx)
    }

    /// Returns true if both entries share the same body, name and location.
    pub fn same_as(&self, other: &TestEntry) -> bool {
        Arc::ptr_eq(&self.function, &other.function)
            && self.name == other.name
            && self.file == other.file
            && self.line == other.line
    }
}

impl fmt::Debug for TestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestEntry")
            .field("name", &self.name)
            .field("file", &self.file)
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

/// Named, ordered group of tests sharing setup/teardown hooks.
#[derive(Clone, Default)]
pub struct Fixture {
    name: String,
    fixture_setup: Option<TestFn>,
    fixture_teardown: Option<TestFn>,
    test_setup: Option<TestFn>,
    test_teardown: Option<TestFn>,
    tests: Vec<TestEntry>,
}

impl Fixture {
    /// Create an empty fixture with no hooks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Hook run once before the first test.
    pub fn with_fixture_setup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RunContext) -> TestOutcome + Send + Sync + 'static,
    {
        self.fixture_setup = Some(Arc::new(hook));
        self
    }

    /// Hook run once after the last test.
    pub fn with_fixture_teardown<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RunContext) -> TestOutcome + Send + Sync + 'static,
    {
        self.fixture_teardown = Some(Arc::new(hook));
        self
    }

    /// Hook run before every test.
    pub fn with_test_setup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RunContext) -> TestOutcome + Send + Sync + 'static,
    {
        self.test_setup = Some(Arc::new(hook));
        self
    }

    /// Hook run after every test, including failed ones.
    pub fn with_test_teardown<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut RunContext) -> TestOutcome + Send + Sync + 'static,
    {
        self.test_teardown = Some(Arc::new(hook));
        self
    }

    /// Append a test; declaration order is run order.
    pub fn with_test(mut self, entry: TestEntry) -> Self {
        self.tests.push(entry);
        self
    }

    /// Append several tests in order.
    pub fn with_tests(mut self, entries: impl IntoIterator<Item = TestEntry>) -> Self {
        self.tests.extend(entries);
        self
    }

    /// Append a test in place.
    pub fn add_test(&mut self, entry: TestEntry) {
        self.tests.push(entry);
    }

    /// Fixture name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tests in declaration order
    pub fn tests(&self) -> &[TestEntry] {
        &self.tests
    }

    /// Number of registered tests
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Copy of this fixture keeping only tests whose name contains `pattern`.
    pub fn filtered(&self, pattern: &str) -> Self {
        Self {
            tests: self
                .tests
                .iter()
                .filter(|entry| entry.name.contains(pattern))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    pub(crate) fn fixture_setup(&self) -> Option<&TestFn> {
        self.fixture_setup.as_ref()
    }

    pub(crate) fn fixture_teardown(&self) -> Option<&TestFn> {
        self.fixture_teardown.as_ref()
    }

    pub(crate) fn test_setup(&self) -> Option<&TestFn> {
        self.test_setup.as_ref()
    }

    pub(crate) fn test_teardown(&self) -> Option<&TestFn> {
        self.test_teardown.as_ref()
    }
}

impl fmt::Debug for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixture")
            .field("name", &self.name)
            .field("fixture_setup", &self.fixture_setup.is_some())
            .field("fixture_teardown", &self.fixture_teardown.is_some())
            .field("test_setup", &self.test_setup.is_some())
            .field("test_teardown", &self.test_teardown.is_some())
            .field("tests", &self.tests)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut RunContext) -> TestOutcome {
        Ok(())
    }

    #[test]
    fn entry_accessors() {
        let entry = TestEntry::new("adds", noop, "math.rs", 12);
        assert_eq!(entry.name(), "adds");
        assert_eq!(entry.file(), "math.rs");
        assert_eq!(entry.line(), 12);
    }

    #[test]
    fn entry_clone_is_same() {
        let entry = TestEntry::new("adds", noop, "math.rs", 12);
        let copy = entry.clone();
        assert!(entry.same_as(&copy));

        let other = TestEntry::new("adds", noop, "math.rs", 12);
        assert!(!entry.same_as(&other));
    }

    #[test]
    fn fixture_preserves_declaration_order() {
        let fixture = Fixture::new("order")
            .with_test(TestEntry::new("c", noop, "f.rs", 3))
            .with_test(TestEntry::new("a", noop, "f.rs", 1))
            .with_tests([TestEntry::new("b", noop, "f.rs", 2)]);

        let names: Vec<_> = fixture.tests().iter().map(TestEntry::name).collect();
        assert_eq!(names, ["c", "a", "b"]);
        assert_eq!(fixture.test_count(), 3);
    }

    #[test]
    fn fixture_has_no_capacity_limit() {
        let mut fixture = Fixture::new("big");
        for i in 0..1000 {
            fixture.add_test(TestEntry::new(format!("t{i}"), noop, "f.rs", i));
        }
        assert_eq!(fixture.test_count(), 1000);
    }

    #[test]
    fn filtered_keeps_hooks_and_matching_tests() {
        let fixture = Fixture::new("filter")
            .with_test_setup(noop)
            .with_test(TestEntry::new("parse_ok", noop, "f.rs", 1))
            .with_test(TestEntry::new("render", noop, "f.rs", 2))
            .with_test(TestEntry::new("parse_err", noop, "f.rs", 3));

        let filtered = fixture.filtered("parse");
        let names: Vec<_> = filtered.tests().iter().map(TestEntry::name).collect();
        assert_eq!(names, ["parse_ok", "parse_err"]);
        assert!(filtered.test_setup().is_some());
        assert_eq!(filtered.name(), "filter");
    }
}
