//! Prompt construction for recommendation generation.
//!
//! [`build_prompt`] is a pure function of the validated intake: no clock,
//! no randomness, no I/O. Identical input always produces identical text,
//! which is what makes logged prompts reproducible.

use botica_core::models::intake::{MedicalInput, Severity, Sex};

use crate::schema::medical_response_schema;

/// Symptom duration (in days) above which a case is considered long.
pub const LONG_DURATION_DAYS: u32 = 7;

/// Age below which a case is always referred.
pub const ADULT_AGE: u32 = 18;

pub const SYSTEM_PROMPT: &str = "\
Eres un asistente farmacéutico que apoya al personal de una farmacia. \
Solo sugieres medicamentos de venta libre y derivas al médico cualquier caso \
que requiera criterio clínico. Respondes únicamente con JSON válido, sin \
texto adicional.";

/// Build the user-turn instruction text for one intake.
pub fn build_prompt(input: &MedicalInput) -> String {
    let mut prompt = String::from(
        "Evalúa el siguiente caso atendido en una farmacia y sugiere tratamiento \
         de venta libre únicamente si es seguro hacerlo.\n\n",
    );

    prompt.push_str("## Datos del paciente\n");
    prompt.push_str(&format!("- Edad: {} años\n", input.age));
    prompt.push_str(&format!("- Sexo: {}\n", input.sex.as_str()));
    prompt.push_str(&format!(
        "- Peso: {}\n",
        input
            .weight
            .map(|w| format!("{w} kg"))
            .unwrap_or_else(|| "no informado".to_string())
    ));
    prompt.push_str(&format!("- Síntomas: {}\n", input.symptoms.join(", ")));
    prompt.push_str(&format!(
        "- Alergias: {}\n",
        list_or(input.allergies.as_deref(), "ninguna reportada")
    ));
    prompt.push_str(&format!(
        "- Enfermedades preexistentes: {}\n",
        list_or(input.preexisting_diseases.as_deref(), "ninguna reportada")
    ));
    prompt.push_str(&format!("- Embarazo: {}\n", pregnancy_label(input)));
    prompt.push_str(&format!(
        "- Medicación actual: {}\n",
        input.current_medication.as_deref().unwrap_or("ninguna")
    ));
    prompt.push_str(&format!(
        "- Duración de los síntomas: {}\n",
        input
            .duration_days
            .map(|d| format!("{d} días"))
            .unwrap_or_else(|| "no informada".to_string())
    ));
    prompt.push_str(&format!(
        "- Severidad: {}\n\n",
        input.severity.map(|s| s.as_str()).unwrap_or("no informada")
    ));

    prompt.push_str("## Reglas obligatorias\n");
    prompt.push_str(
        "1. Responde SOLO con un objeto JSON que cumpla exactamente el esquema de salida. \
         No agregues texto, comentarios ni bloques de código.\n\
         2. No uses rangos en ningún campo numérico ni descriptivo (por ejemplo \"200-400\" \
         o \"1 a 2\"). Si la práctica clínica sugiere un rango, elige el valor único más \
         conservador: la mínima dosis efectiva.\n\
         3. amount_value es un único número y amount_unit contiene solo la unidad (por \
         ejemplo \"mg\" o \"ml\").\n\
         4. medication contiene solo el principio activo, sin marcas comerciales.\n\
         5. every_hour es el intervalo en horas entre tomas; usa 0 solo si no hay un \
         intervalo fijo.\n\
         6. instructions no debe terminar en punto.\n",
    );
    prompt.push_str(&format!(
        "7. Devuelve \"recommendations\": [] y un \"reason\" no nulo si el paciente es menor \
         de {ADULT_AGE} años, si la severidad es moderada o severa, si los síntomas duran más \
         de {LONG_DURATION_DAYS} días, si el estado de embarazo es ambiguo o positivo, si \
         existe conflicto con alguna alergia o medicación actual, o si el caso requiere \
         criterio clínico más allá del tratamiento de venta libre.\n"
    ));
    prompt.push_str(
        "8. \"recommendations\" y \"reason\" son mutuamente excluyentes: si hay \
         recomendaciones, \"reason\" debe ser null.\n\n",
    );

    let signals = referral_signals(input);
    if !signals.is_empty() {
        prompt.push_str("## Señales de derivación detectadas\n");
        for signal in &signals {
            prompt.push_str(&format!("- {signal}\n"));
        }
        prompt.push_str(
            "Este caso debe derivarse: devuelve \"recommendations\": [] y explica el motivo \
             en \"reason\".\n\n",
        );
    }

    prompt.push_str("## Esquema de salida\n");
    // serde_json's default map is ordered, so this rendering is stable.
    let schema = serde_json::to_string_pretty(&medical_response_schema()).unwrap_or_default();
    prompt.push_str(&schema);
    prompt.push('\n');

    prompt
}

/// Conditions in the intake that require a referral regardless of what the
/// model would suggest.
pub fn referral_signals(input: &MedicalInput) -> Vec<&'static str> {
    let mut signals = Vec::new();
    if input.age < ADULT_AGE {
        signals.push("paciente menor de edad");
    }
    if matches!(input.severity, Some(Severity::Moderate | Severity::Severe)) {
        signals.push("severidad moderada o severa");
    }
    if input.duration_days.is_some_and(|d| d > LONG_DURATION_DAYS) {
        signals.push("síntomas de duración prolongada");
    }
    if input.sex == Sex::Female && input.pregnancy != Some(false) {
        signals.push("estado de embarazo positivo o no confirmado");
    }
    signals
}

fn list_or(items: Option<&[String]>, empty: &str) -> String {
    match items {
        Some(items) if !items.is_empty() => items.join(", "),
        _ => empty.to_string(),
    }
}

fn pregnancy_label(input: &MedicalInput) -> &'static str {
    match (input.sex, input.pregnancy) {
        (Sex::Male, _) => "no aplica",
        (Sex::Female, Some(true)) => "sí",
        (Sex::Female, Some(false)) => "no",
        (Sex::Female, None) => "no informado",
    }
}
