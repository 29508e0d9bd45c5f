//! Bundled self-check suite run by the `microtest` binary.
//!
//! Every fixture except [`failing`] is expected to pass. [`failing`] holds
//! one deliberately failing test per assertion kind, to show the failure
//! output format.

use crate::context::RunContext;
use crate::entry::Fixture;
use crate::outcome::TestOutcome;
use crate::suite::Suite;
use crate::{assert_int_eq_as, ensure, fail, fixture};

/// The passing fixtures, plus [`failing`] when `include_failing` is set.
pub fn suite(include_failing: bool) -> Suite {
    let mut suite = Suite::new()
        .with_fixture(integers())
        .with_fixture(floats())
        .with_fixture(strings())
        .with_fixture(pointers())
        .with_fixture(lifecycle());
    if include_failing {
        suite.add_fixture(failing());
    }
    suite
}

// =============================================================================
// integers
// =============================================================================

pub fn integers() -> Fixture {
    fixture!("integers" => [int_equal_widths, int_narrowing, int_extremes])
}

fn int_equal_widths(ctx: &mut RunContext) -> TestOutcome {
    ctx.assert_int_eq(-5_i8, -5, None)?;
    ctx.assert_int_eq(40_000_u16, 40_000, None)?;
    ctx.assert_int_eq(1_i32 << 20, 1_048_576, None)?;
    ctx.assert_int_eq(u64::MAX, u64::MAX, Some("u64 max"))
}

fn int_narrowing(ctx: &mut RunContext) -> TestOutcome {
    assert_int_eq_as!(ctx, u8, 0x1_23_u32, 0x23_u32);
    assert_int_eq_as!(ctx, i16, 0x1_0000_i64 - 1, -1_i64, "wraps at 16 bits");
    Ok(())
}

fn int_extremes(ctx: &mut RunContext) -> TestOutcome {
    ctx.assert_int_eq(i128::MIN, i128::MIN, None)?;
    ctx.assert_int_eq(usize::MAX.wrapping_add(1), 0, None)
}

// =============================================================================
// floats
// =============================================================================

pub fn floats() -> Fixture {
    fixture!("floats" => [float_within_epsilon, float_single_precision])
}

fn float_within_epsilon(ctx: &mut RunContext) -> TestOutcome {
    ctx.assert_float_eq(1.0, 1.000_000_000_1, 1e-6, None)?;
    ctx.assert_float_eq(0.1 + 0.2, 0.3, 1e-12, Some("classic rounding"))
}

fn float_single_precision(ctx: &mut RunContext) -> TestOutcome {
    ctx.assert_f32_eq(1.0 / 3.0, 0.333_333_34, 1e-6, None)
}

// =============================================================================
// strings
// =============================================================================

pub fn strings() -> Fixture {
    fixture!("strings" => [string_exact, string_ignore_case])
}

fn string_exact(ctx: &mut RunContext) -> TestOutcome {
    let greeting = format!("{}, {}!", "Hello", "world");
    ctx.assert_str_eq("Hello, world!", &greeting, None)
}

fn string_ignore_case(ctx: &mut RunContext) -> TestOutcome {
    ctx.assert_str_eq_ignore_case("Foo", "foo", None)?;
    ctx.assert_str_eq_ignore_case("STRASSE", "strasse", None)?;
    ensure!(ctx, "Foo" != "foo", "case-sensitive compare must differ");
    Ok(())
}

// =============================================================================
// pointers
// =============================================================================

pub fn pointers() -> Fixture {
    fixture!("pointers" => [pointer_identity, null_checks])
}

fn pointer_identity(ctx: &mut RunContext) -> TestOutcome {
    let values = [10_u32, 20, 30];
    let first = &values[0];
    ctx.assert_ptr_eq(values.as_ptr(), first, None)?;
    ctx.assert_ptr_eq(&values, first, Some("array starts at its first element"))
}

fn null_checks(ctx: &mut RunContext) -> TestOutcome {
    let words = ["alpha", "beta"];
    let found = words.iter().find(|w| w.starts_with('b'));
    let missing = words.iter().find(|w| w.starts_with('z'));
    ctx.assert_not_null(&found, None)?;
    ctx.assert_is_null(&missing, Some("no word starts with z"))?;
    ctx.assert_null(&std::ptr::null::<u8>(), true, None)
}

// =============================================================================
// lifecycle
// =============================================================================

/// Hook and test calls, in order, kept in the user state.
#[derive(Debug, Default)]
struct Trace(Vec<&'static str>);

fn trace(ctx: &mut RunContext, step: &'static str) -> TestOutcome {
    match ctx.user_mut::<Trace>() {
        Some(log) => {
            log.0.push(step);
            Ok(())
        }
        None => fail!(ctx, "trace missing before {}", step),
    }
}

pub fn lifecycle() -> Fixture {
    fixture!("lifecycle" => [lifecycle_first, lifecycle_second])
        .with_fixture_setup(|ctx| {
            ctx.set_user(Trace::default());
            trace(ctx, "fixture_setup")
        })
        .with_test_setup(|ctx| trace(ctx, "test_setup"))
        .with_test_teardown(|ctx| trace(ctx, "test_teardown"))
        .with_fixture_teardown(|ctx| {
            trace(ctx, "fixture_teardown")?;
            let Some(Trace(steps)) = ctx.take_user::<Trace>() else {
                fail!(ctx, "trace lost");
            };
            let expected = [
                "fixture_setup",
                "test_setup",
                "first",
                "test_teardown",
                "test_setup",
                "second",
                "test_teardown",
                "fixture_teardown",
            ];
            let (actual, expected) = (steps.join(","), expected.join(","));
            ctx.assert_str_eq(&expected, &actual, Some("hook order"))
        })
}

fn lifecycle_first(ctx: &mut RunContext) -> TestOutcome {
    trace(ctx, "first")?;
    ctx.assert_true(ctx.current_fixture() == Some("lifecycle"), None)
}

fn lifecycle_second(ctx: &mut RunContext) -> TestOutcome {
    trace(ctx, "second")?;
    let run = ctx.run_count();
    ctx.assert_int_eq(2, run, Some("second test is the second run"))
}

// =============================================================================
// failing
// =============================================================================

/// Deliberately failing tests, one per assertion kind.
pub fn failing() -> Fixture {
    fixture!("failing" => [
        fails_int,
        fails_float,
        fails_string,
        fails_string_case,
        fails_null,
        fails_pointer,
        fails_condition,
        fails_explicitly,
    ])
}

fn fails_int(ctx: &mut RunContext) -> TestOutcome {
    ctx.print("comparing 1 and 2");
    ctx.assert_int_eq(1, 2, None)
}

fn fails_float(ctx: &mut RunContext) -> TestOutcome {
    ctx.assert_float_eq(1.0, 1.1, 1e-6, None)
}

fn fails_string(ctx: &mut RunContext) -> TestOutcome {
    ctx.assert_str_eq("Foo", "foo", None)
}

fn fails_string_case(ctx: &mut RunContext) -> TestOutcome {
    ctx.assert_str_eq_ignore_case("Foo", "Bar", Some("different words"))
}

fn fails_null(ctx: &mut RunContext) -> TestOutcome {
    ctx.assert_is_null(&Some(1), None)
}

fn fails_pointer(ctx: &mut RunContext) -> TestOutcome {
    let (a, b) = (1, 1);
    ctx.assert_ptr_eq(&a, &b, None)
}

fn fails_condition(ctx: &mut RunContext) -> TestOutcome {
    ensure!(ctx, 1 > 2);
    Ok(())
}

fn fails_explicitly(ctx: &mut RunContext) -> TestOutcome {
    fail!(ctx)
}
