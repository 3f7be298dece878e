use medcalc_core::values::{format_fixed, format_number, parse_number, round_fixed};
use medcalc_core::{CalculationError, Inputs, Value};

fn choice(value: &str, label: &str) -> Value {
    Value::Choice {
        value: value.to_string(),
        label: label.to_string(),
    }
}

#[test]
fn decimal_comma_is_accepted() {
    assert_eq!(parse_number("12,5"), Some(12.5));
    assert_eq!(parse_number(" 3.25 "), Some(3.25));
    assert_eq!(parse_number("abc"), None);
    assert_eq!(parse_number(""), None);
}

#[test]
fn numbers_format_for_display() {
    assert_eq!(format_number(9.0), "9");
    assert_eq!(format_number(0.25), "0.25");
    assert_eq!(format_fixed(0.5, 2), "0.50");
}

#[test]
fn rounding_matches_the_displayed_digits() {
    assert_eq!(round_fixed(18.46, 1), 18.5);
    assert_eq!(round_fixed(18.44, 1), 18.4);
    assert_eq!(round_fixed(24.96, 1), 25.0);
    assert_eq!(round_fixed(8.6, 0), 9.0);
}

#[test]
fn typed_accessors_read_their_own_kind() {
    let inputs = Inputs::new()
        .with("dose", Value::Number(50.0))
        .with("equipo", choice("60", "Microgotas"))
        .with("unidade", choice("min", "Minutos"))
        .with("nota", Value::Text("jejum".to_string()))
        .with("vazio", Value::Empty);

    assert_eq!(inputs.number("dose").unwrap(), 50.0);
    assert_eq!(inputs.number("equipo").unwrap(), 60.0);
    assert_eq!(inputs.choice("unidade").unwrap(), "min");
    assert_eq!(inputs.text("nota").unwrap(), "jejum");

    assert_eq!(
        inputs.number("vazio"),
        Err(CalculationError::MissingInput("vazio".to_string()))
    );
    assert!(matches!(
        inputs.number("unidade"),
        Err(CalculationError::NotNumeric { .. })
    ));
    assert!(inputs.choice("dose").is_err());
    assert!(inputs.text("dose").is_err());
}

#[test]
fn choice_displays_its_label() {
    assert_eq!(choice("2", "Move os quatro membros").display(), "Move os quatro membros");
    assert_eq!(Value::Empty.display(), "");
}
