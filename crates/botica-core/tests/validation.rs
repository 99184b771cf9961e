use botica_core::models::intake::{Severity, Sex};
use botica_core::models::patient::IdentificationType;
use botica_core::models::response::{MedicalResponse, Recommendation};
use botica_core::validation::{
    has_range, validate_identification_number, validate_medical_input, validate_medical_response,
};
use serde_json::{Value, json};

fn fever_intake() -> Value {
    json!({
        "age": 25,
        "sex": "masculino",
        "weight": 70,
        "symptoms": ["fever"],
        "allergies": null,
        "preexisting_diseases": null,
        "pregnancy": null,
        "current_medication": null,
        "duration_days": 2,
        "severity": "leve"
    })
}

fn paracetamol_line() -> Value {
    json!({
        "medication": "paracetamol",
        "form": "tablet",
        "via": "oral",
        "amount_value": 500,
        "amount_unit": "mg",
        "every_hour": 8,
        "duration_days": 3,
        "moment": "after breakfast",
        "instructions": "take with food",
        "warnings": []
    })
}

fn typed_line() -> Recommendation {
    serde_json::from_value(paracetamol_line()).unwrap()
}

// ── Intake ───────────────────────────────────────────────────────────────────

#[test]
fn valid_intake_is_accepted() {
    let input = validate_medical_input(&fever_intake()).unwrap();
    assert_eq!(input.age, 25);
    assert_eq!(input.sex, Sex::Male);
    assert_eq!(input.weight, Some(70.0));
    assert_eq!(input.symptoms, vec!["fever".to_string()]);
    assert_eq!(input.allergies, None);
    assert_eq!(input.duration_days, Some(2));
    assert_eq!(input.severity, Some(Severity::Mild));
}

#[test]
fn english_enum_values_are_accepted() {
    let mut raw = fever_intake();
    raw["sex"] = json!("female");
    raw["severity"] = json!("moderate");
    let input = validate_medical_input(&raw).unwrap();
    assert_eq!(input.sex, Sex::Female);
    assert_eq!(input.severity, Some(Severity::Moderate));
}

#[test]
fn every_invalid_field_is_reported() {
    let raw = json!({
        "age": -3,
        "sex": "other",
        "weight": 0,
        "symptoms": [],
        "allergies": "penicillin",
        "pregnancy": "maybe",
        "duration_days": 1.5,
        "severity": "critical"
    });
    let err = validate_medical_input(&raw).unwrap_err();
    for field in [
        "age",
        "sex",
        "weight",
        "symptoms",
        "allergies",
        "pregnancy",
        "duration_days",
        "severity",
    ] {
        assert!(err.contains(field), "missing error for {field}: {err}");
    }
}

#[test]
fn missing_required_fields_are_reported() {
    let err = validate_medical_input(&json!({})).unwrap_err();
    assert!(err.contains("age"));
    assert!(err.contains("sex"));
    assert!(err.contains("symptoms"));
    assert!(!err.contains("weight"));
}

#[test]
fn zero_age_is_rejected() {
    let mut raw = fever_intake();
    raw["age"] = json!(0);
    let err = validate_medical_input(&raw).unwrap_err();
    assert!(err.contains("age"));
}

#[test]
fn blank_symptom_is_rejected() {
    let mut raw = fever_intake();
    raw["symptoms"] = json!(["fever", "  "]);
    let err = validate_medical_input(&raw).unwrap_err();
    assert!(err.contains("symptoms[1]"));
}

#[test]
fn non_object_intake_is_rejected() {
    let err = validate_medical_input(&json!(["fever"])).unwrap_err();
    assert!(err.contains("input"));
}

#[test]
fn pregnancy_is_ignored_for_male_patients() {
    let mut raw = fever_intake();
    raw["pregnancy"] = json!(true);
    let input = validate_medical_input(&raw).unwrap();
    assert_eq!(input.pregnancy, None);
}

#[test]
fn pregnancy_is_kept_for_female_patients() {
    let mut raw = fever_intake();
    raw["sex"] = json!("femenino");
    raw["pregnancy"] = json!(false);
    let input = validate_medical_input(&raw).unwrap();
    assert_eq!(input.pregnancy, Some(false));
}

#[test]
fn validated_input_round_trips() {
    let mut raw = fever_intake();
    raw["allergies"] = json!(["ibuprofeno"]);
    raw["current_medication"] = json!("  losartan ");
    let first = validate_medical_input(&raw).unwrap();
    let second = validate_medical_input(&serde_json::to_value(&first).unwrap()).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.current_medication.as_deref(), Some("losartan"));
}

// ── Model output ─────────────────────────────────────────────────────────────

#[test]
fn valid_response_is_accepted() {
    let raw = json!({ "recommendations": [paracetamol_line()], "reason": null });
    let response = validate_medical_response(&raw).unwrap();
    assert_eq!(response.recommendations.len(), 1);
    assert_eq!(response.recommendations[0].amount_value, 500.0);
    assert_eq!(response.reason, None);
}

#[test]
fn referral_response_is_accepted() {
    let raw = json!({ "recommendations": [], "reason": "Paciente menor de edad" });
    let response = validate_medical_response(&raw).unwrap();
    assert!(response.recommendations.is_empty());
    assert_eq!(response.reason.as_deref(), Some("Paciente menor de edad"));
}

#[test]
fn recommendations_and_reason_together_are_rejected() {
    let raw = json!({ "recommendations": [paracetamol_line()], "reason": "derivar" });
    let err = validate_medical_response(&raw).unwrap_err();
    assert!(err.contains("reason"));
}

#[test]
fn blank_reason_alongside_recommendations_is_rejected() {
    for reason in [json!(""), json!("  ")] {
        let raw = json!({ "recommendations": [paracetamol_line()], "reason": reason });
        let err = validate_medical_response(&raw).unwrap_err();
        assert!(err.contains("reason"));
    }

    let response = MedicalResponse {
        recommendations: vec![typed_line()],
        reason: Some(String::new()),
    };
    let err = response.validate().unwrap_err();
    assert!(err.contains("reason"));
}

#[test]
fn neither_recommendations_nor_reason_is_rejected() {
    for reason in [json!(null), json!("   ")] {
        let raw = json!({ "recommendations": [], "reason": reason });
        let err = validate_medical_response(&raw).unwrap_err();
        assert!(err.contains("reason"));
    }
}

#[test]
fn missing_reason_key_is_rejected() {
    let raw = json!({ "recommendations": [paracetamol_line()] });
    let err = validate_medical_response(&raw).unwrap_err();
    assert!(err.contains("reason"));
}

#[test]
fn range_in_amount_unit_is_rejected() {
    let mut line = paracetamol_line();
    line["amount_unit"] = json!("200-400mg");
    let raw = json!({ "recommendations": [line], "reason": null });
    let err = validate_medical_response(&raw).unwrap_err();
    assert!(err.contains("recommendations[0].amount_unit"));
}

#[test]
fn range_in_moment_and_instructions_is_rejected() {
    let mut line = paracetamol_line();
    line["moment"] = json!("cada 6 a 8 horas");
    line["instructions"] = json!("tomar 1–2 tabletas");
    let raw = json!({ "recommendations": [paracetamol_line(), line], "reason": null });
    let err = validate_medical_response(&raw).unwrap_err();
    assert!(err.contains("recommendations[1].moment"));
    assert!(err.contains("recommendations[1].instructions"));
    assert!(!err.contains("recommendations[0].moment"));
}

#[test]
fn string_amount_value_is_rejected() {
    let mut line = paracetamol_line();
    line["amount_value"] = json!("500");
    let raw = json!({ "recommendations": [line], "reason": null });
    let err = validate_medical_response(&raw).unwrap_err();
    assert!(err.contains("recommendations[0].amount_value"));
}

#[test]
fn trailing_period_in_instructions_is_rejected() {
    let mut line = paracetamol_line();
    line["instructions"] = json!("take with food.");
    let raw = json!({ "recommendations": [line], "reason": null });
    let err = validate_medical_response(&raw).unwrap_err();
    assert!(err.contains("recommendations[0].instructions"));
}

#[test]
fn missing_line_fields_are_all_reported() {
    let raw = json!({ "recommendations": [{ "medication": "paracetamol" }], "reason": null });
    let err = validate_medical_response(&raw).unwrap_err();
    for field in ["form", "via", "amount_value", "every_hour", "warnings"] {
        assert!(err.contains(&format!("recommendations[0].{field}")), "{err}");
    }
}

#[test]
fn zero_interval_is_allowed() {
    let mut line = paracetamol_line();
    line["every_hour"] = json!(0);
    let raw = json!({ "recommendations": [line], "reason": null });
    assert!(validate_medical_response(&raw).is_ok());
}

#[test]
fn typed_response_validation_matches_raw_rules() {
    let mut line = typed_line();
    line.amount_unit = "5-10 ml".to_string();
    let response = MedicalResponse {
        recommendations: vec![line],
        reason: None,
    };
    let err = response.validate().unwrap_err();
    assert!(err.contains("recommendations[0].amount_unit"));

    assert!(MedicalResponse::referral("derivar al médico").validate().is_ok());
}

// ── Range heuristic ──────────────────────────────────────────────────────────

#[test]
fn range_detection() {
    for text in ["200-400mg", "200 - 400", "1–2", "6 a 8 horas", "1 A 2", "2a3"] {
        assert!(has_range(text), "expected range in {text:?}");
    }
    for text in ["mg", "500 mg", "after breakfast", "take with food", "cada 8 horas"] {
        assert!(!has_range(text), "unexpected range in {text:?}");
    }
}

// ── Identity ─────────────────────────────────────────────────────────────────

#[test]
fn identification_numbers() {
    assert!(validate_identification_number(IdentificationType::Dni, "12345678").is_ok());
    assert!(validate_identification_number(IdentificationType::Dni, "1234567").is_err());
    assert!(validate_identification_number(IdentificationType::Dni, "1234567a").is_err());
    assert!(validate_identification_number(IdentificationType::Ruc, "12345678901").is_ok());
    assert!(validate_identification_number(IdentificationType::Ruc, "123").is_err());
    assert!(validate_identification_number(IdentificationType::Passport, "X123").is_ok());
    assert!(validate_identification_number(IdentificationType::ForeignerCard, "  ").is_err());
}
