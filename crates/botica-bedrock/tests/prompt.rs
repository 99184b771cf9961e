use botica_bedrock::prompt::{SYSTEM_PROMPT, build_prompt, referral_signals};
use botica_bedrock::schema::medical_response_schema;
use botica_core::models::intake::{MedicalInput, Severity, Sex};

fn adult_fever() -> MedicalInput {
    MedicalInput {
        age: 25,
        sex: Sex::Male,
        weight: Some(70.0),
        symptoms: vec!["fiebre".to_string(), "dolor de cabeza".to_string()],
        allergies: None,
        preexisting_diseases: None,
        pregnancy: None,
        current_medication: None,
        duration_days: Some(2),
        severity: Some(Severity::Mild),
    }
}

#[test]
fn prompt_is_deterministic() {
    let input = adult_fever();
    assert_eq!(build_prompt(&input), build_prompt(&input));
}

#[test]
fn prompt_embeds_output_schema() {
    let schema = serde_json::to_string_pretty(&medical_response_schema()).unwrap();
    assert!(build_prompt(&adult_fever()).contains(&schema));
}

#[test]
fn prompt_states_mandatory_rules() {
    let prompt = build_prompt(&adult_fever());
    assert!(prompt.contains("SOLO con un objeto JSON"));
    assert!(prompt.contains("No uses rangos"));
    assert!(prompt.contains("mínima dosis efectiva"));
    assert!(prompt.contains("mutuamente excluyentes"));
    assert!(prompt.contains("menor de 18 años"));
    assert!(prompt.contains("más de 7 días"));
}

#[test]
fn prompt_lists_patient_data() {
    let prompt = build_prompt(&adult_fever());
    assert!(prompt.contains("- Edad: 25 años"));
    assert!(prompt.contains("- Sexo: masculino"));
    assert!(prompt.contains("- Peso: 70 kg"));
    assert!(prompt.contains("- Síntomas: fiebre, dolor de cabeza"));
    assert!(prompt.contains("- Alergias: ninguna reportada"));
    assert!(prompt.contains("- Embarazo: no aplica"));
    assert!(prompt.contains("- Severidad: leve"));
}

#[test]
fn uncomplicated_case_has_no_referral_signals() {
    let input = adult_fever();
    assert!(referral_signals(&input).is_empty());
    assert!(!build_prompt(&input).contains("Señales de derivación"));
}

#[test]
fn minor_and_long_duration_are_flagged() {
    let mut input = adult_fever();
    input.age = 12;
    input.duration_days = Some(10);
    let signals = referral_signals(&input);
    assert_eq!(signals.len(), 2);
    assert!(build_prompt(&input).contains("## Señales de derivación detectadas"));
}

#[test]
fn unconfirmed_pregnancy_is_flagged() {
    let mut input = adult_fever();
    input.sex = Sex::Female;
    input.pregnancy = None;
    assert_eq!(
        referral_signals(&input),
        vec!["estado de embarazo positivo o no confirmado"]
    );
    assert!(build_prompt(&input).contains("- Embarazo: no informado"));

    input.pregnancy = Some(false);
    assert!(referral_signals(&input).is_empty());
}

#[test]
fn moderate_severity_is_flagged() {
    let mut input = adult_fever();
    input.severity = Some(Severity::Moderate);
    assert_eq!(referral_signals(&input), vec!["severidad moderada o severa"]);
}

#[test]
fn system_prompt_demands_json() {
    assert!(SYSTEM_PROMPT.contains("JSON"));
}
