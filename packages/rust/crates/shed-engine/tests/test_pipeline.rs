//! Tests for the format → fix → format pipeline.

mod support;

use std::collections::BTreeSet;
use std::sync::atomic::AtomicUsize;

use shed_engine::{EngineError, EngineSet, Pipeline, Stage};
use support::{
    FailsOnCallFormatter, FlakySource, OperatorSpacing, StrictFormatter, TidyFormatter,
    spacing_engines,
};

fn spacing_pipeline() -> Pipeline {
    Pipeline {
        allow_list: vec!["E225".to_string()],
        ..Pipeline::default()
    }
}

fn all_stages() -> BTreeSet<Stage> {
    [Stage::Format, Stage::Fix, Stage::Reformat].into_iter().collect()
}

#[test]
fn test_spacing_end_to_end() {
    let outcome = spacing_pipeline()
        .run(&spacing_engines(), "x=1+2\n")
        .expect("pipeline succeeds");

    assert_eq!(outcome.formatted, "x = 1 + 2\n");
    assert!(outcome.changed);
    assert_eq!(outcome.stages_run, all_stages());
    assert_eq!(outcome.fix_passes, 1);
    assert_eq!(outcome.fixes_applied, 4);
    assert!(!outcome.fix_exhausted);
}

#[test]
fn test_second_run_is_stable() {
    let pipeline = spacing_pipeline();
    let engines = spacing_engines();

    let first = pipeline.run(&engines, "x=1+2\n").expect("first run");
    let second = pipeline.run(&engines, &first.formatted).expect("second run");

    assert_eq!(second.formatted, first.formatted);
    assert!(!second.changed);
    assert_eq!(second.fix_passes, 0);
}

#[test]
fn test_default_allow_list_leaves_spacing_alone() {
    let outcome = Pipeline::default()
        .run(&spacing_engines(), "x=1\n")
        .expect("pipeline succeeds");
    assert_eq!(outcome.formatted, "x=1\n");
    assert!(!outcome.changed);
}

#[test]
fn test_formatter_only_changes_count() {
    let outcome = spacing_pipeline()
        .run(&spacing_engines(), "y = 2   \n\n\n")
        .expect("pipeline succeeds");
    assert_eq!(outcome.formatted, "y = 2\n");
    assert!(outcome.changed);
}

#[test]
fn test_pass_ceiling_is_not_a_failure() {
    let pipeline = Pipeline {
        max_passes: 1,
        ..spacing_pipeline()
    };
    let outcome = pipeline
        .run(&spacing_engines(), "a=b\n")
        .expect("ceiling is best effort");
    assert!(outcome.fix_exhausted);
    assert_eq!(outcome.fix_passes, 1);
    assert_eq!(outcome.formatted, "a = b\n");
}

#[test]
fn test_diagnostic_failure_falls_back_to_first_format() {
    let engines = EngineSet::new(TidyFormatter, FlakySource::new(OperatorSpacing, 2));

    let failure = spacing_pipeline()
        .run(&engines, "x=1+2   \n")
        .expect_err("second lint pass fails");

    assert_eq!(failure.stage, Stage::Fix);
    assert!(matches!(failure.error, EngineError::DiagnosticSource(_)));
    // Stage (a) output only; the pass-1 spacing fixes are discarded.
    assert_eq!(failure.fallback, "x=1+2\n");
    assert_eq!(
        failure.stages_run,
        [Stage::Format].into_iter().collect::<BTreeSet<_>>()
    );
}

#[test]
fn test_format_rejection_keeps_original() {
    let engines = EngineSet::new(StrictFormatter, OperatorSpacing);
    let source = "def (x):\n    pass\n";

    let failure = spacing_pipeline()
        .run(&engines, source)
        .expect_err("formatter rejects input");

    assert_eq!(failure.stage, Stage::Format);
    assert!(matches!(failure.error, EngineError::Format(_)));
    assert_eq!(failure.fallback, source);
    assert!(failure.stages_run.is_empty());
}

#[test]
fn test_reformat_failure_is_not_partially_applied() {
    let formatter = FailsOnCallFormatter {
        fail_on: 2,
        calls: AtomicUsize::new(0),
    };
    let engines = EngineSet::new(formatter, OperatorSpacing);

    let failure = spacing_pipeline()
        .run(&engines, "x=1\n")
        .expect_err("second format call fails");

    assert_eq!(failure.stage, Stage::Reformat);
    assert_eq!(failure.fallback, "x=1\n");
    assert_eq!(
        failure.stages_run,
        [Stage::Format, Stage::Fix].into_iter().collect::<BTreeSet<_>>()
    );
    assert!(failure.to_string().starts_with("reformat stage failed"));
}
