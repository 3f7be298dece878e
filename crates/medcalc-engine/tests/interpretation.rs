use std::collections::BTreeMap;

use medcalc_core::schema::{AlertRule, AlertSeverity, AuditStepSpec, Band};
use medcalc_core::{CalcResult, Computation, SchemaError, Severity};
use medcalc_engine::EngineError;
use medcalc_engine::alerts::{AlertSet, evaluate_alerts};
use medcalc_engine::audit::{MISSING_VALUE, build_audit, substitute};
use medcalc_engine::interpret::interpret;
use proptest::prelude::*;

fn band(max: Option<f64>, label: &str) -> Band {
    Band {
        max,
        label: label.to_string(),
        severity_class: String::new(),
        recommendation: String::new(),
    }
}

fn recovery_bands() -> Vec<Band> {
    vec![
        band(Some(4.0), "insatisfatória"),
        band(Some(6.0), "moderada"),
        band(Some(8.0), "boa"),
        band(None, "recomendada a alta"),
    ]
}

fn step(label: &str) -> AuditStepSpec {
    AuditStepSpec {
        label: label.to_string(),
        icon: "fa-check".to_string(),
        source_field: None,
        fixed_value: None,
        template: None,
        suffix: None,
    }
}

fn result() -> CalcResult {
    let computation = Computation::new(0.5, "mL")
        .with_item("prescribedAmount", 50.0)
        .with_item("concentration", 100.0)
        .with_label("concentrationType", "U100");
    CalcResult::stamp(computation, jiff::Timestamp::UNIX_EPOCH)
}

fn rule(condition: &str, message: &str) -> AlertRule {
    AlertRule {
        condition: condition.to_string(),
        message: message.to_string(),
        severity: AlertSeverity::Warning,
    }
}

#[test]
fn nine_falls_in_the_last_band() {
    let bands = recovery_bands();
    let matched = interpret(9.0, &bands).unwrap().unwrap();
    assert_eq!(matched.label, "recomendada a alta");
}

#[test]
fn upper_bounds_are_inclusive() {
    let bands = recovery_bands();
    assert_eq!(interpret(4.0, &bands).unwrap().unwrap().label, "insatisfatória");
    assert_eq!(interpret(4.5, &bands).unwrap().unwrap().label, "moderada");
    assert_eq!(interpret(-100.0, &bands).unwrap().unwrap().label, "insatisfatória");
}

#[test]
fn no_bands_means_no_interpretation() {
    assert!(interpret(3.0, &[]).unwrap().is_none());
}

#[test]
fn unmatched_total_is_a_configuration_error() {
    let bands = recovery_bands();
    assert!(matches!(
        interpret(f64::NAN, &bands),
        Err(EngineError::Configuration(_))
    ));
}

#[test]
fn audit_resolves_each_source_in_declaration_order() {
    let mut concentration = step("Concentração");
    concentration.source_field = Some("concentrationType".to_string());
    let mut formula = step("Fórmula");
    formula.fixed_value = Some("Volume = Prescrição ÷ Concentração".to_string());
    let mut calculation = step("Cálculo");
    calculation.template =
        Some("{{prescribedAmount}} UI ÷ {{ concentration }} UI/mL = {{total}} {{unit}}".to_string());
    let mut volume = step("Volume");
    volume.source_field = Some("total".to_string());
    volume.suffix = Some("mL".to_string());
    let mut missing = step("Lote");
    missing.source_field = Some("batch".to_string());

    let lines = build_audit(
        &result(),
        &[concentration, formula, calculation, volume, missing],
        2,
    );

    let labels: Vec<&str> = lines.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, ["Concentração", "Fórmula", "Cálculo", "Volume", "Lote"]);
    assert_eq!(lines[0].value, "U100");
    assert_eq!(lines[1].value, "Volume = Prescrição ÷ Concentração");
    assert_eq!(lines[2].value, "50 UI ÷ 100 UI/mL = 0.50 mL");
    assert_eq!(lines[3].value, "0.50 mL");
    assert_eq!(lines[4].value, MISSING_VALUE);
}

#[test]
fn template_edge_cases() {
    let result = result();
    assert_eq!(substitute("{{nope}} left", &result, 2), "— left");
    assert_eq!(substitute("open {{total", &result, 2), "open {{total");
    assert_eq!(substitute("no placeholders", &result, 2), "no placeholders");
    assert_eq!(substitute("{{concentration}}", &result, 0), "100");
}

#[test]
fn alerts_fire_in_order_without_deduplication() {
    let rules = [
        rule("result > 0.4", "acima"),
        rule("result > 10", "muito acima"),
        rule("result >= 0.5 && result < 1", "acima"),
    ];
    let fired = evaluate_alerts(0.5, &rules).unwrap();
    let messages: Vec<&str> = fired.iter().map(|a| a.message.as_str()).collect();
    assert_eq!(messages, ["acima", "acima"]);
    assert!(fired.iter().all(|a| a.severity == Severity::Warning));
}

#[test]
fn alert_outside_the_grammar_fails_closed() {
    let rules = [rule("result > 1", "ok"), rule("process.exit()", "bad")];
    assert!(matches!(
        AlertSet::compile(&rules),
        Err(SchemaError::InvalidCondition { index: 1, .. })
    ));
}

#[test]
fn display_values_cover_items_labels_and_unit() {
    let result = result();
    assert_eq!(result.display_value("prescribedAmount", 2).as_deref(), Some("50"));
    assert_eq!(result.display_value("unit", 2).as_deref(), Some("mL"));
    assert_eq!(result.per_item, BTreeMap::from([
        ("concentration".to_string(), 100.0),
        ("prescribedAmount".to_string(), 50.0),
    ]));
}

proptest! {
    #[test]
    fn every_total_matches_exactly_one_band(total in -1.0e6f64..1.0e6) {
        let bands = recovery_bands();
        let matched = interpret(total, &bands).unwrap().unwrap();
        let first = bands.iter().position(|b| b.contains(total)).unwrap();
        prop_assert_eq!(matched, &bands[first]);
        // Only the first containing band is selected; earlier bands exclude it.
        prop_assert!(bands[..first].iter().all(|b| !b.contains(total)));
    }

    #[test]
    fn each_rule_fires_at_most_once(total in -50.0f64..50.0, threshold in -50.0f64..50.0) {
        let rules = [
            rule(&format!("result > {threshold}"), "a"),
            rule(&format!("result <= {threshold}"), "b"),
        ];
        let fired = AlertSet::compile(&rules).unwrap().evaluate(total);
        prop_assert_eq!(fired.len(), 1);
        let expected = if total > threshold { "a" } else { "b" };
        prop_assert_eq!(fired[0].message.as_str(), expected);
    }
}
