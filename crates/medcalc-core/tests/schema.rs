use medcalc_core::schema::{Action, AuditSource, Checklists, FieldKind, Scalar};
use medcalc_core::{FieldValues, Schema, SchemaError};

const SEDATION: &str = r#"
{
  "id": "sedation",
  "title": "Sedation scale",
  "variant": "sum",
  "patient": { "name": "patientName" },
  "form": {
    "sections": [
      {
        "title": "Patient",
        "fields": [
          { "id": "patientName", "label": "Name", "type": "text" },
          { "id": "birthdate", "label": "Birth date", "type": "date" }
        ]
      },
      {
        "title": "Items",
        "fields": [
          {
            "id": "activity", "label": "Activity", "type": "select", "required": true,
            "options": [ { "value": 0, "label": "None" }, { "value": 1, "label": "Some" }, { "value": 2, "label": "Full" } ],
            "default": 2
          },
          { "id": "weight", "label": "Weight", "type": "number", "min": 0, "softMax": 200, "unit": "kg" }
        ]
      }
    ]
  },
  "calculation": {
    "result": { "label": "Score", "unit": "points", "decimals": 0 },
    "audit": {
      "steps": [
        { "label": "Total", "icon": "fa-sum", "sourceField": "total", "suffix": "points" },
        { "label": "Scale", "icon": "fa-book", "fixedValue": "Sedation" },
        { "label": "Activity", "icon": "fa-person", "dynamicExpression": "{{activity}} of 2" }
      ]
    },
    "interpretation": [
      { "max": 1, "label": "Low", "color": "text-red-600", "conduct": "Observe" },
      { "label": "High", "severityClass": "text-green-600", "recommendation": "Discharge" }
    ],
    "alerts": [ { "condition": "result < 1", "message": "Low score", "severity": "danger" } ],
    "actionButtons": [
      { "action": "generatePDF", "label": "PDF", "icon": "fa-file-pdf", "type": "primary" },
      { "action": "copyResult", "label": "Copy", "icon": "fa-copy" },
      { "action": "searchNursingDiagnosis", "label": "NANDA", "icon": "fa-search" }
    ]
  }
}
"#;

fn with(mutate: impl FnOnce(&mut serde_json::Value)) -> String {
    let mut value: serde_json::Value = serde_json::from_str(SEDATION).unwrap();
    mutate(&mut value);
    value.to_string()
}

#[test]
fn parses_page_configuration_shape() {
    let schema = Schema::from_json(SEDATION).unwrap();

    assert_eq!(schema.id, "sedation");
    let ids: Vec<&str> = schema.fields().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, ["patientName", "birthdate", "activity", "weight"]);

    match &schema.field("activity").unwrap().kind {
        FieldKind::Select { options, default } => {
            assert_eq!(options.len(), 3);
            assert_eq!(default, &Some(Scalar::Number(2.0)));
        }
        other => panic!("expected select, got {}", other.type_name()),
    }
    match &schema.field("weight").unwrap().kind {
        FieldKind::Number { soft_max, min, .. } => {
            assert_eq!(*soft_max, Some(200.0));
            assert_eq!(*min, Some(0.0));
        }
        other => panic!("expected number, got {}", other.type_name()),
    }

    let bands = &schema.calculation.interpretation;
    assert_eq!(bands[0].severity_class, "text-red-600");
    assert_eq!(bands[0].recommendation, "Observe");
    assert_eq!(bands[1].max, None);

    let actions: Vec<&Action> = schema
        .calculation
        .action_buttons
        .iter()
        .map(|b| &b.action)
        .collect();
    assert_eq!(actions[0], &Action::GenerateReport);
    assert_eq!(actions[1], &Action::CopyResult);
    assert_eq!(
        actions[2],
        &Action::OpenReference {
            topic: "nanda".to_string()
        }
    );
}

#[test]
fn audit_steps_expose_their_single_source() {
    let schema = Schema::from_json(SEDATION).unwrap();
    let sources: Vec<_> = schema
        .calculation
        .audit
        .steps
        .iter()
        .map(|s| s.source().unwrap())
        .collect();

    assert_eq!(
        sources[0],
        AuditSource::Field {
            key: "total",
            suffix: Some("points")
        }
    );
    assert_eq!(sources[1], AuditSource::Fixed("Sedation"));
    assert_eq!(sources[2], AuditSource::Template("{{activity}} of 2"));
}

#[test]
fn defaults_use_declared_default_or_first_option() {
    let json = with(|v| {
        v["form"]["sections"][1]["fields"][0]
            .as_object_mut()
            .unwrap()
            .remove("default");
    });
    let schema = Schema::from_json(&json).unwrap();
    let values = FieldValues::defaults(&schema);
    assert_eq!(values.get("activity"), "0");

    let schema = Schema::from_json(SEDATION).unwrap();
    let values = FieldValues::defaults(&schema);
    assert_eq!(values.get("activity"), "2");
    assert_eq!(values.get("weight"), "");
    assert_eq!(values.get("birthdate"), "");
}

#[test]
fn duplicate_field_ids_are_rejected() {
    let json = with(|v| {
        v["form"]["sections"][1]["fields"][1]["id"] = "activity".into();
    });
    let err = Schema::from_json(&json).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateFieldId(id) if id == "activity"));
}

#[test]
fn select_without_options_names_the_field() {
    let json = with(|v| {
        v["form"]["sections"][1]["fields"][0]["options"] = serde_json::json!([]);
    });
    let err = Schema::from_json(&json).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "activity"));
}

#[test]
fn select_default_must_be_an_option() {
    let json = with(|v| {
        v["form"]["sections"][1]["fields"][0]["default"] = 7.into();
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::InvalidField { .. })
    ));
}

#[test]
fn overlapping_band_bounds_are_rejected() {
    let json = with(|v| {
        v["calculation"]["interpretation"] = serde_json::json!([
            { "max": 4, "label": "a" },
            { "max": 4, "label": "b" },
            { "label": "c" }
        ]);
    });
    let err = Schema::from_json(&json).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidBand { index: 1, .. }));
}

#[test]
fn descending_band_bounds_are_rejected() {
    let json = with(|v| {
        v["calculation"]["interpretation"] = serde_json::json!([
            { "max": 8, "label": "a" },
            { "max": 4, "label": "b" },
            { "label": "c" }
        ]);
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::InvalidBand { index: 1, .. })
    ));
}

#[test]
fn bounded_last_band_leaves_a_gap_and_is_rejected() {
    let json = with(|v| {
        v["calculation"]["interpretation"] = serde_json::json!([
            { "max": 4, "label": "a" },
            { "max": 10, "label": "b" }
        ]);
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::InvalidBand { index: 1, .. })
    ));
}

#[test]
fn unbounded_band_before_the_end_is_rejected() {
    let json = with(|v| {
        v["calculation"]["interpretation"] = serde_json::json!([
            { "label": "a" },
            { "label": "b" }
        ]);
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::InvalidBand { index: 0, .. })
    ));
}

#[test]
fn audit_step_with_two_sources_is_rejected() {
    let json = with(|v| {
        v["calculation"]["audit"]["steps"][1]["sourceField"] = "total".into();
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::InvalidAuditStep { index: 1, .. })
    ));
}

#[test]
fn audit_step_without_source_is_rejected() {
    let json = with(|v| {
        v["calculation"]["audit"]["steps"][1]
            .as_object_mut()
            .unwrap()
            .remove("fixedValue");
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::InvalidAuditStep { index: 1, .. })
    ));
}

#[test]
fn alert_condition_outside_grammar_fails_at_load() {
    let json = with(|v| {
        v["calculation"]["alerts"][0]["condition"] = "alert(document.cookie)".into();
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::InvalidCondition { index: 0, .. })
    ));
}

#[test]
fn unknown_action_fails_to_parse() {
    let json = with(|v| {
        v["calculation"]["actionButtons"][0]["action"] = "deleteEverything".into();
    });
    assert!(matches!(Schema::from_json(&json), Err(SchemaError::Json(_))));
}

#[test]
fn duplicate_actions_are_rejected() {
    let json = with(|v| {
        v["calculation"]["actionButtons"][1]["action"] = "generatePDF".into();
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::DuplicateAction(action)) if action == "generatePDF"
    ));
}

#[test]
fn required_if_must_reference_a_declared_field() {
    let json = with(|v| {
        v["form"]["sections"][0]["fields"][1]["requiredIf"] = "nope".into();
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::UnknownFieldReference { ref field, .. }) if field == "birthdate"
    ));
}

#[test]
fn patient_fields_must_exist() {
    let json = with(|v| {
        v["patient"]["birthdate"] = "dob".into();
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::UnknownFieldReference { .. })
    ));
}

#[test]
fn number_bounds_must_be_ordered() {
    let json = with(|v| {
        v["form"]["sections"][1]["fields"][1]["max"] = serde_json::json!(-1);
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::InvalidField { ref field, .. }) if field == "weight"
    ));
}

#[test]
fn number_default_must_satisfy_its_own_bounds() {
    for (bounds, default) in [
        (serde_json::json!({ "min": 10 }), serde_json::json!(-5)),
        (serde_json::json!({ "min": 10 }), serde_json::json!(5)),
        (serde_json::json!({ "max": 50 }), serde_json::json!(100)),
        (serde_json::json!({ "max": 50 }), serde_json::json!("abc")),
    ] {
        let json = with(|v| {
            let weight = &mut v["form"]["sections"][1]["fields"][1];
            weight["min"] = bounds.get("min").cloned().unwrap_or(serde_json::json!(0));
            if let Some(max) = bounds.get("max") {
                weight["max"] = max.clone();
                weight.as_object_mut().unwrap().remove("softMax");
            }
            weight["default"] = default.clone();
        });
        assert!(
            matches!(
                Schema::from_json(&json),
                Err(SchemaError::InvalidField { ref field, .. }) if field == "weight"
            ),
            "accepted default {default} with {bounds}"
        );
    }
}

#[test]
fn number_default_within_bounds_loads_into_reset_state() {
    let json = with(|v| {
        v["form"]["sections"][1]["fields"][1]["default"] = "72,5".into();
    });
    let schema = Schema::from_json(&json).unwrap();
    assert_eq!(FieldValues::defaults(&schema).get("weight"), "72,5");
}

#[test]
fn empty_section_is_rejected() {
    let json = with(|v| {
        v["form"]["sections"][0]["fields"] = serde_json::json!([]);
    });
    assert!(matches!(
        Schema::from_json(&json),
        Err(SchemaError::EmptySection { .. })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Schema::from_json_file("/nonexistent/schema.json").unwrap_err();
    assert!(matches!(err, SchemaError::Io(_)));
}

#[test]
fn schema_without_checklists_has_none() {
    let schema = Schema::from_json(SEDATION).unwrap();
    assert!(schema.checklists.is_none());
}

#[test]
fn empty_checklists_object_falls_back_to_standard_lists() {
    let json = with(|v| {
        v["checklists"] = serde_json::json!({});
    });
    let checklists = Schema::from_json(&json).unwrap().checklists.unwrap();
    assert_eq!(checklists, Checklists::default());
    assert_eq!(checklists.nine_rights.len(), 9);
    assert_eq!(checklists.nine_rights[0], "Paciente Certo");
    assert_eq!(checklists.safety_goals[0].id, 1);
}

#[test]
fn declared_checklists_keep_their_order() {
    let json = with(|v| {
        v["checklists"] = serde_json::json!({
            "nineRights": ["Via Certa", "Dose Certa"],
            "safetyGoals": [ { "id": 6, "text": "Quedas", "class": "glass-meta-blue" } ]
        });
    });
    let checklists = Schema::from_json(&json).unwrap().checklists.unwrap();
    assert_eq!(checklists.nine_rights, ["Via Certa", "Dose Certa"]);
    assert_eq!(checklists.safety_goals[0].severity_class, "glass-meta-blue");
}

#[test]
fn malformed_checklists_are_rejected() {
    let cases = [
        serde_json::json!({ "nineRights": ["Paciente Certo", "  "] }),
        serde_json::json!({ "safetyGoals": [ { "id": 1, "text": "" } ] }),
        serde_json::json!({
            "safetyGoals": [ { "id": 3, "text": "A" }, { "id": 3, "text": "B" } ]
        }),
    ];
    for checklists in cases {
        let json = with(|v| {
            v["checklists"] = checklists;
        });
        assert!(matches!(
            Schema::from_json(&json),
            Err(SchemaError::InvalidChecklist { .. })
        ));
    }
}
