use medcalc_core::condition::{Condition, ConditionError};
use proptest::prelude::*;

fn eval(source: &str, result: f64) -> bool {
    Condition::parse(source).unwrap().evaluate(result)
}

#[test]
fn simple_comparisons() {
    assert!(eval("result > 30", 31.0));
    assert!(!eval("result > 30", 30.0));
    assert!(eval("result >= 30", 30.0));
    assert!(eval("result < 0.5", 0.25));
    assert!(eval("result <= 0.5", 0.5));
    assert!(eval("result == 9", 9.0));
    assert!(eval("10 > total", 9.0));
    assert!(eval("resultado > 1", 2.0));
}

#[test]
fn boolean_combinators_and_grouping() {
    assert!(eval("result > 1 && result < 3", 2.0));
    assert!(!eval("result > 1 && result < 3", 3.0));
    assert!(eval("result < 1 || result > 3", 4.0));
    assert!(eval("(result < 1 || result > 3) && result < 10", 5.0));
    assert!(!eval("(result < 1 || result > 3) && result < 10", 12.0));
}

#[test]
fn and_binds_tighter_than_or() {
    // false || (true && true)
    assert!(eval("result > 100 || result > 1 && result < 3", 2.0));
    // (false) || (true && false)
    assert!(!eval("result > 100 || result > 1 && result < 3", 5.0));
}

#[test]
fn negative_literals() {
    assert!(eval("result > -1", 0.0));
    assert!(!eval("result > -1", -2.0));
}

#[test]
fn arbitrary_code_fails_closed() {
    for source in [
        "alert(1)",
        "result > 30; fetch('x')",
        "result = 30",
        "result + 1 > 2",
        "result > 30 ? 1 : 0",
        "!(result > 1)",
        "'a' == 'a'",
        "window.location",
        "result > 30 & result < 40",
        "result",
        "30",
        "result > ",
        "(result > 1",
        "result > 1)",
        "result > 1 result < 2",
    ] {
        assert!(Condition::parse(source).is_err(), "accepted: {source}");
    }
}

#[test]
fn unknown_identifier_is_reported_with_offset() {
    assert_eq!(
        Condition::parse("x > 1"),
        Err(ConditionError::UnknownIdentifier {
            name: "x".to_string(),
            offset: 0
        })
    );
}

#[test]
fn empty_condition_is_rejected() {
    assert_eq!(Condition::parse("   "), Err(ConditionError::Empty));
}

#[test]
fn nesting_is_bounded() {
    let deep = format!("{}result > 1{}", "(".repeat(64), ")".repeat(64));
    assert_eq!(Condition::parse(&deep), Err(ConditionError::TooDeep));

    let shallow = format!("{}result > 1{}", "(".repeat(8), ")".repeat(8));
    assert!(Condition::parse(&shallow).unwrap().evaluate(2.0));
}

#[test]
fn long_chains_are_bounded() {
    let chain = |terms: usize, joiner: &str| vec!["result > 1"; terms].join(joiner);

    assert_eq!(
        Condition::parse(&chain(200, " && ")),
        Err(ConditionError::TooManyTerms)
    );
    assert_eq!(
        Condition::parse(&chain(200, " || ")),
        Err(ConditionError::TooManyTerms)
    );

    let grouped = format!("({}) || ({})", chain(40, " && "), chain(40, " && "));
    assert_eq!(Condition::parse(&grouped), Err(ConditionError::TooManyTerms));

    let moderate = Condition::parse(&chain(64, " && ")).unwrap();
    assert!(moderate.evaluate(2.0));
    assert!(!moderate.evaluate(0.0));
}

#[test]
fn display_round_trips_through_the_parser() {
    let condition = Condition::parse("result > 1 && (result < 3 || result == 10)").unwrap();
    let reparsed = Condition::parse(&condition.to_string()).unwrap();
    assert_eq!(condition, reparsed);
}

proptest! {
    #[test]
    fn comparison_matches_native_semantics(threshold in -1000.0f64..1000.0, result in -1000.0f64..1000.0) {
        let condition = Condition::parse(&format!("result > {threshold}")).unwrap();
        prop_assert_eq!(condition.evaluate(result), result > threshold);
    }

    #[test]
    fn inputs_with_foreign_characters_never_parse(prefix in "result [<>]=? [0-9]{1,3}", junk in "[;+*/!?'\"`$\\[\\]{}]") {
        let source = format!("{prefix} {junk}");
        prop_assert!(Condition::parse(&source).is_err());
    }

    #[test]
    fn parser_never_panics(source in "\\PC{0,40}") {
        let _ = Condition::parse(&source);
    }
}
