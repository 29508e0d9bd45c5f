//! Registration and assertion shorthands.

/// Build a [`TestEntry`](crate::TestEntry) named after a function, with the
/// call site as its source location.
///
/// ```rust
/// use microtest::{test_entry, RunContext, TestOutcome};
///
/// fn adds_up(ctx: &mut RunContext) -> TestOutcome {
///     ctx.assert_int_eq(4, 2 + 2, None)
/// }
///
/// let entry = test_entry!(adds_up);
/// assert_eq!(entry.name(), "adds_up");
/// ```
#[macro_export]
macro_rules! test_entry {
    ($function:path) => {
        $crate::TestEntry::new(stringify!($function), $function, file!(), line!())
    };
    ($name:expr, $function:expr) => {
        $crate::TestEntry::new($name, $function, file!(), line!())
    };
}

/// Build a [`Fixture`](crate::Fixture) from a name and a list of test
/// functions, each registered with [`test_entry!`].
///
/// ```rust
/// use microtest::{fixture, RunContext, TestOutcome};
///
/// fn first(_: &mut RunContext) -> TestOutcome { Ok(()) }
/// fn second(_: &mut RunContext) -> TestOutcome { Ok(()) }
///
/// let fixture = fixture!("basics" => [first, second]);
/// assert_eq!(fixture.test_count(), 2);
/// ```
#[macro_export]
macro_rules! fixture {
    ($name:expr => [$($function:path),* $(,)?]) => {
        $crate::Fixture::new($name)$(.with_test($crate::test_entry!($function)))*
    };
}

/// Record a formatted failure message and return from the enclosing test.
///
/// ```rust
/// use microtest::{fail, RunContext, TestOutcome};
///
/// fn body(ctx: &mut RunContext) -> TestOutcome {
///     let parsed: Result<u8, _> = "300".parse();
///     if parsed.is_ok() {
///         fail!(ctx, "expected overflow, got {:?}", parsed);
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! fail {
    ($ctx:expr) => {
        return ::core::result::Result::Err($ctx.fail($crate::assert::TEST_FAILED))
    };
    ($ctx:expr, $($arg:tt)+) => {
        return ::core::result::Result::Err($ctx.fail(format_args!($($arg)+)))
    };
}

/// Fail the enclosing test unless the condition holds.
#[macro_export]
macro_rules! ensure {
    ($ctx:expr, $cond:expr $(,)?) => {
        if !$cond {
            $crate::fail!($ctx, "{}", $crate::assert::EXPRESSION_IS_FALSE);
        }
    };
    ($ctx:expr, $cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::fail!($ctx, $($arg)+);
        }
    };
}

/// Integer equality after narrowing both operands to `$ty` with `as`.
///
/// ```rust
/// use microtest::{assert_int_eq_as, RunContext, TestOutcome};
///
/// fn low_byte(ctx: &mut RunContext) -> TestOutcome {
///     assert_int_eq_as!(ctx, u8, 0x1ff_u32, 0xff_u32);
///     Ok(())
/// }
/// # let mut ctx = RunContext::new();
/// # assert!(low_byte(&mut ctx).is_ok());
/// ```
#[macro_export]
macro_rules! assert_int_eq_as {
    ($ctx:expr, $ty:ty, $expected:expr, $actual:expr $(,)?) => {
        $ctx.assert_int_eq::<$ty>(($expected) as $ty, ($actual) as $ty, None)?
    };
    ($ctx:expr, $ty:ty, $expected:expr, $actual:expr, $message:expr $(,)?) => {
        $ctx.assert_int_eq::<$ty>(($expected) as $ty, ($actual) as $ty, Some($message))?
    };
}
