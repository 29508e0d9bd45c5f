//! Property-based tests for the runner and assertions.

use microtest::{
    Fixture, MessageBuffer, Recorder, ReportEvent, ResultKind, RunContext, RunCounts, TestEntry,
};
use proptest::prelude::*;

/// Fixture whose tests pass or fail according to `plan`.
fn planned_fixture(plan: &[bool]) -> Fixture {
    plan.iter()
        .enumerate()
        .fold(Fixture::new("planned"), |fixture, (index, &pass)| {
            fixture.with_test(TestEntry::new(
                format!("t{index}"),
                move |ctx: &mut RunContext| ctx.assert_true(pass, Some("planned")),
                "p.rs",
                u32::try_from(index).unwrap_or(u32::MAX),
            ))
        })
}

fn run_recorded(fixture: &Fixture) -> (ResultKind, RunCounts, Vec<ReportEvent>) {
    let recorder = Recorder::new();
    let mut ctx = RunContext::new();
    ctx.set_result_handler(recorder.clone());
    ctx.set_print_handler(recorder.clone());
    let verdict = ctx.run_fixture(fixture);
    (verdict, ctx.counts(), recorder.events())
}

proptest! {
    #[test]
    fn counts_match_plan(plan in prop::collection::vec(any::<bool>(), 0..24)) {
        let (verdict, counts, events) = run_recorded(&planned_fixture(&plan));
        let passed = plan.iter().filter(|&&pass| pass).count();

        prop_assert_eq!(counts.run, plan.len());
        prop_assert_eq!(counts.passed, passed);
        prop_assert_eq!(counts.failed, plan.len() - passed);
        prop_assert_eq!(counts.run, counts.passed + counts.failed);
        prop_assert_eq!(verdict.is_success(), passed == plan.len());
        prop_assert_eq!(events.len(), plan.len());
    }

    #[test]
    fn reruns_are_deterministic(plan in prop::collection::vec(any::<bool>(), 0..16)) {
        let fixture = planned_fixture(&plan);
        prop_assert_eq!(run_recorded(&fixture), run_recorded(&fixture));
    }

    #[test]
    fn int_eq_matches_equality(a in any::<i64>(), b in any::<i64>()) {
        let mut ctx = RunContext::new();
        prop_assert_eq!(ctx.assert_int_eq(a, b, None).is_ok(), a == b);
    }

    #[test]
    fn float_eq_is_strict_and_symmetric(
        a in -1.0e6_f64..1.0e6,
        b in -1.0e6_f64..1.0e6,
        epsilon in 0.0_f64..10.0,
    ) {
        let mut ctx = RunContext::new();
        let forward = ctx.assert_float_eq(a, b, epsilon, None).is_ok();
        let backward = ctx.assert_float_eq(b, a, epsilon, None).is_ok();
        prop_assert_eq!(forward, (a - b).abs() < epsilon);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn str_eq_is_reflexive(text in ".{0,40}") {
        let mut ctx = RunContext::new();
        prop_assert!(ctx.assert_str_eq(&text, &text, None).is_ok());
        prop_assert!(ctx.assert_str_eq_ignore_case(&text, &text, None).is_ok());
    }

    #[test]
    fn str_eq_rejects_appended_text(text in "[a-z]{0,20}", extra in "[a-z]{1,5}") {
        let mut ctx = RunContext::new();
        let longer = format!("{text}{extra}");
        prop_assert!(ctx.assert_str_eq(&text, &longer, None).is_err());
        prop_assert!(ctx.assert_str_eq_ignore_case(&text, &longer, None).is_err());
    }

    #[test]
    fn ascii_case_folding(text in "[a-zA-Z0-9 ]{0,40}") {
        let mut ctx = RunContext::new();
        prop_assert!(ctx
            .assert_str_eq_ignore_case(&text.to_ascii_lowercase(), &text.to_ascii_uppercase(), None)
            .is_ok());
    }

    #[test]
    fn message_buffer_never_exceeds_capacity(
        capacity in 1_usize..64,
        text in ".{0,128}",
    ) {
        let mut buffer = MessageBuffer::with_capacity(capacity);
        buffer.set(&text);
        prop_assert!(buffer.as_str().len() <= capacity);
        prop_assert!(text.starts_with(buffer.as_str()));
    }
}
