//! Typed assertions.
//!
//! Every assertion returns `Ok(())` with no side effect on a match. On a
//! mismatch it records a descriptive message through [`RunContext::fail`]
//! and returns the failure, which the test body forwards with `?`.

use std::fmt::{Debug, Display};

use crate::context::RunContext;
use crate::outcome::TestOutcome;

/// Default message for a false boolean assertion.
pub const EXPRESSION_IS_FALSE: &str = "Expression is false";

/// Default message for an unconditional failure.
pub const TEST_FAILED: &str = "Test failed";

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width integer types accepted by [`RunContext::assert_int_eq`].
pub trait Integer: sealed::Sealed + Copy + Eq + Display + Debug {}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Integer for $ty {}
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Values with a notion of "null" for [`RunContext::assert_null`].
pub trait Nullable {
    fn is_null_value(&self) -> bool;
}

impl<T> Nullable for Option<T> {
    fn is_null_value(&self) -> bool {
        self.is_none()
    }
}

impl<T: ?Sized> Nullable for *const T {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> Nullable for *mut T {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl<N: Nullable + ?Sized> Nullable for &N {
    fn is_null_value(&self) -> bool {
        (**self).is_null_value()
    }
}

/// Append ` - <message>` when the caller supplied one.
fn with_suffix(base: String, message: Option<&str>) -> String {
    match message {
        Some(message) => format!("{base} - {message}"),
        None => base,
    }
}

/// Case folding used by the case-insensitive string assertion.
///
/// Plain Unicode lowercase mapping; no locale tailoring.
fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

impl RunContext {
    /// Fail unless two integers of the same width are equal.
    ///
    /// Narrow mixed operands first, e.g. with [`assert_int_eq_as!`](crate::assert_int_eq_as).
    pub fn assert_int_eq<T: Integer>(
        &mut self,
        expected: T,
        actual: T,
        message: Option<&str>,
    ) -> TestOutcome {
        if expected == actual {
            return Ok(());
        }
        let text = with_suffix(
            format!("Values not equal. Expected [{expected}], Actual [{actual}]"),
            message,
        );
        Err(self.fail(text))
    }

    /// Fail unless both pointers hold the same address.
    ///
    /// Slice lengths and vtables are ignored; only the address is compared.
    pub fn assert_ptr_eq<T: ?Sized, U: ?Sized>(
        &mut self,
        expected: *const T,
        actual: *const U,
        message: Option<&str>,
    ) -> TestOutcome {
        let expected = expected.cast::<()>() as usize;
        let actual = actual.cast::<()>() as usize;
        if expected == actual {
            return Ok(());
        }
        let text = with_suffix(
            format!("Pointers not equal. Expected [0x{expected:016x}], Actual [0x{actual:016x}]"),
            message,
        );
        Err(self.fail(text))
    }

    /// Fail unless the nullity of `actual` matches `expect_null`.
    pub fn assert_null<N: Nullable + ?Sized>(
        &mut self,
        actual: &N,
        expect_null: bool,
        message: Option<&str>,
    ) -> TestOutcome {
        let is_null = actual.is_null_value();
        if is_null == expect_null {
            return Ok(());
        }
        let base = if expect_null {
            "Value non-null. Expected null."
        } else {
            "Value null. Expected non-null."
        };
        let text = match message {
            Some(message) => format!("{base} {message}"),
            None => base.to_string(),
        };
        Err(self.fail(text))
    }

    /// Shorthand for `assert_null(actual, true, message)`.
    pub fn assert_is_null<N: Nullable + ?Sized>(
        &mut self,
        actual: &N,
        message: Option<&str>,
    ) -> TestOutcome {
        self.assert_null(actual, true, message)
    }

    /// Shorthand for `assert_null(actual, false, message)`.
    pub fn assert_not_null<N: Nullable + ?Sized>(
        &mut self,
        actual: &N,
        message: Option<&str>,
    ) -> TestOutcome {
        self.assert_null(actual, false, message)
    }

    /// Fail unless `|expected - actual| < epsilon`.
    ///
    /// NaN on either side always fails.
    pub fn assert_float_eq(
        &mut self,
        expected: f64,
        actual: f64,
        epsilon: f64,
        message: Option<&str>,
    ) -> TestOutcome {
        if (expected - actual).abs() < epsilon {
            return Ok(());
        }
        let text = with_suffix(
            format!("Values not equal. Expected [{expected:.6}], Actual [{actual:.6}]"),
            message,
        );
        Err(self.fail(text))
    }

    /// Single-precision variant of [`assert_float_eq`](Self::assert_float_eq).
    pub fn assert_f32_eq(
        &mut self,
        expected: f32,
        actual: f32,
        epsilon: f32,
        message: Option<&str>,
    ) -> TestOutcome {
        self.assert_float_eq(
            f64::from(expected),
            f64::from(actual),
            f64::from(epsilon),
            message,
        )
    }

    /// Fail unless the strings are byte-for-byte equal.
    pub fn assert_str_eq(
        &mut self,
        expected: &str,
        actual: &str,
        message: Option<&str>,
    ) -> TestOutcome {
        if expected == actual {
            return Ok(());
        }
        Err(self.string_mismatch(expected, actual, message))
    }

    /// Fail unless the strings are equal after case folding.
    pub fn assert_str_eq_ignore_case(
        &mut self,
        expected: &str,
        actual: &str,
        message: Option<&str>,
    ) -> TestOutcome {
        if fold(expected).eq(fold(actual)) {
            return Ok(());
        }
        Err(self.string_mismatch(expected, actual, message))
    }

    fn string_mismatch(
        &mut self,
        expected: &str,
        actual: &str,
        message: Option<&str>,
    ) -> crate::Failure {
        let text = with_suffix(
            format!("Strings not equal. Expected [{expected}], Actual [{actual}]"),
            message,
        );
        self.fail(text)
    }

    /// Fail unless `condition` holds.
    pub fn assert_true(&mut self, condition: bool, message: Option<&str>) -> TestOutcome {
        if condition {
            return Ok(());
        }
        Err(self.fail(message.unwrap_or(EXPRESSION_IS_FALSE)))
    }

    /// Fail if `condition` holds.
    pub fn assert_false(&mut self, condition: bool, message: Option<&str>) -> TestOutcome {
        self.assert_true(!condition, message)
    }

    /// Fail unconditionally.
    pub fn fail_with(&mut self, message: Option<&str>) -> TestOutcome {
        Err(self.fail(message.unwrap_or(TEST_FAILED)))
    }
}
