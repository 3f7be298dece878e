use medcalc_core::{CalculationError, Inputs, SchemaError, Severity, Value, Variant};
use medcalc_instruments::error::InstrumentError;
use medcalc_instruments::instruments::{
    aldrete::Aldrete, bmi::Bmi, drip_rate::DripRate, insulin::Insulin,
};
use medcalc_instruments::{
    Instrument, all_instruments, catalog, get_instrument, load_schema, variant_for,
};
use proptest::prelude::*;

fn choice(value: &str) -> Value {
    Value::Choice {
        value: value.to_string(),
        label: String::new(),
    }
}

fn insulin_inputs(dose: f64, concentration: f64) -> Inputs {
    Inputs::new()
        .with("prescribedAmount", Value::Number(dose))
        .with("concentration", Value::Number(concentration))
}

#[test]
fn every_bundled_schema_loads_and_binds() {
    for instrument in all_instruments() {
        let schema = instrument
            .schema()
            .unwrap_or_else(|e| panic!("{}: {e}", instrument.id()));
        assert_eq!(schema.variant, instrument.id());
        assert_eq!(schema.id, instrument.id());
        assert!(!schema.calculation.interpretation.is_empty());
        assert!(schema.calculation.interpretation.last().unwrap().max.is_none());
    }
}

#[test]
fn catalog_lists_every_instrument_once() {
    let ids: Vec<String> = catalog().into_iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), all_instruments().len());
    assert!(ids.contains(&"insulin".to_string()));
    assert!(get_instrument("aldrete").is_some());
    assert!(get_instrument("vb_mapp").is_none());
}

#[test]
fn insulin_volume_is_dose_over_concentration() {
    let computation = Insulin.calculate(&insulin_inputs(50.0, 100.0)).unwrap();
    assert_eq!(computation.total, 0.5);
    assert_eq!(computation.unit, "mL");
    assert_eq!(computation.labels["concentrationType"], "U100");
    assert_eq!(computation.per_item["prescribedAmount"], 50.0);
    assert!(computation.advisories.is_empty());
}

#[test]
fn insulin_zero_concentration_is_a_domain_error() {
    let err = Insulin.calculate(&insulin_inputs(50.0, 0.0)).unwrap_err();
    assert!(matches!(err, CalculationError::Domain(_)));
}

#[test]
fn insulin_zero_dose_is_a_domain_error() {
    let err = Insulin.calculate(&insulin_inputs(0.0, 100.0)).unwrap_err();
    assert_eq!(
        err,
        CalculationError::Domain("A prescrição deve ser um número positivo".to_string())
    );
}

#[test]
fn concentrated_insulin_carries_a_double_check_warning() {
    let computation = Insulin.calculate(&insulin_inputs(30.0, 300.0)).unwrap();
    assert_eq!(computation.total, 0.1);
    assert_eq!(computation.labels["concentrationType"], "U300");
    assert_eq!(computation.advisories.len(), 1);
    assert_eq!(computation.advisories[0].severity, Severity::Warning);
}

#[test]
fn aldrete_sums_items_and_flags_discharge() {
    let inputs = Inputs::new()
        .with("activity", choice("2"))
        .with("respiration", choice("2"))
        .with("circulation", choice("2"))
        .with("consciousness", choice("2"))
        .with("oxygenation", choice("1"));
    let computation = Aldrete.calculate(&inputs).unwrap();

    assert_eq!(computation.total, 9.0);
    assert_eq!(computation.per_item.len(), 5);
    assert_eq!(computation.advisories[0].severity, Severity::Success);
}

#[test]
fn missing_item_is_reported_not_defaulted() {
    let inputs = Inputs::new().with("activity", choice("2"));
    assert_eq!(
        Aldrete.calculate(&inputs),
        Err(CalculationError::MissingInput("respiration".to_string()))
    );
}

#[test]
fn bmi_accepts_centimetres() {
    let metres = Inputs::new()
        .with("peso", Value::Number(80.0))
        .with("altura", Value::Number(2.0));
    let centimetres = Inputs::new()
        .with("peso", Value::Number(80.0))
        .with("altura", Value::Number(200.0));
    assert_eq!(Bmi.calculate(&metres).unwrap().total, 20.0);
    assert_eq!(Bmi.calculate(&centimetres).unwrap().total, 20.0);
}

#[test]
fn drip_rate_converts_hours_and_picks_unit() {
    let macro_set = Inputs::new()
        .with("volume", Value::Number(1000.0))
        .with("tempo", Value::Number(8.0))
        .with("tempoUnidade", choice("h"))
        .with("equipo", choice("20"));
    let computation = DripRate.calculate(&macro_set).unwrap();
    assert_eq!(computation.total, 42.0);
    assert_eq!(computation.unit, "gotas/min");
    assert_eq!(computation.per_item["minutos"], 480.0);

    let micro_set = Inputs::new()
        .with("volume", Value::Number(100.0))
        .with("tempo", Value::Number(60.0))
        .with("tempoUnidade", choice("min"))
        .with("equipo", choice("60"));
    let computation = DripRate.calculate(&micro_set).unwrap();
    assert_eq!(computation.total, 100.0);
    assert_eq!(computation.unit, "microgotas/min");
}

#[test]
fn generic_variants_resolve_by_id() {
    let ratio = variant_for("ratio").unwrap();
    let inputs = Inputs::new()
        .with("prescribedAmount", Value::Number(50.0))
        .with("concentration", Value::Number(100.0));
    assert_eq!(ratio.calculate(&inputs).unwrap().total, 0.5);

    let sum = variant_for("sum").unwrap();
    let inputs = Inputs::new()
        .with("a", choice("2"))
        .with("b", choice("3"))
        .with("note", Value::Text("free text".to_string()))
        .with("weight", Value::Number(70.0));
    assert_eq!(sum.calculate(&inputs).unwrap().total, 5.0);

    assert!(matches!(
        variant_for("eval"),
        Err(InstrumentError::UnknownVariant(id)) if id == "eval"
    ));
}

#[test]
fn external_schema_must_declare_the_fields_its_variant_reads() {
    let json = r#"{
        "id": "dose", "title": "Dose", "variant": "ratio",
        "form": { "sections": [ { "title": "Dose", "fields": [
            { "id": "prescribedAmount", "label": "Amount", "type": "number", "required": true }
        ] } ] },
        "calculation": { "result": { "label": "Volume", "unit": "mL" } }
    }"#;
    let err = load_schema(json).err().unwrap();
    assert!(matches!(
        err,
        InstrumentError::Schema(SchemaError::VariantFieldMissing { ref field, .. }) if field == "concentration"
    ));
}

proptest! {
    #[test]
    fn insulin_is_pure(dose in 0.01f64..500.0, concentration in 1.0f64..500.0) {
        let inputs = insulin_inputs(dose, concentration);
        let first = Insulin.calculate(&inputs).unwrap();
        let second = Insulin.calculate(&inputs).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn aldrete_total_stays_in_range(scores in proptest::collection::vec(0u8..=2, 5)) {
        let ids = ["activity", "respiration", "circulation", "consciousness", "oxygenation"];
        let inputs = ids
            .iter()
            .zip(&scores)
            .fold(Inputs::new(), |inputs, (id, score)| {
                inputs.with(*id, choice(&score.to_string()))
            });
        let computation = Aldrete.calculate(&inputs).unwrap();
        let expected: f64 = scores.iter().map(|s| f64::from(*s)).sum();
        prop_assert_eq!(computation.total, expected);
        prop_assert!((0.0..=10.0).contains(&computation.total));
    }
}

#[test]
fn severe_glasgow_recommends_airway_protection() {
    use medcalc_instruments::instruments::glasgow::Glasgow;

    let inputs = Inputs::new()
        .with("ocular", choice("2"))
        .with("verbal", choice("2"))
        .with("motora", choice("4"));
    let computation = Glasgow.calculate(&inputs).unwrap();
    assert_eq!(computation.total, 8.0);
    assert_eq!(computation.advisories[0].severity, Severity::Error);
}
