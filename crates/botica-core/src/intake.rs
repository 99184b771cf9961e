//! Intake normalisation: free-text list splitting, the pregnancy/sex rule,
//! and the mapping from the submission form to the MedicalInput shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::ValidationError;
use crate::models::intake::Sex;
use crate::models::patient::IdentificationType;

/// Intake fields that may arrive as a comma-separated string.
pub const LIST_FIELDS: [&str; 3] = ["symptoms", "allergies", "preexisting_diseases"];

/// Pregnancy only applies to female patients; for anyone else the value is
/// dropped regardless of what was supplied.
pub fn normalize_pregnancy(sex: Sex, pregnancy: Option<bool>) -> Option<bool> {
    match sex {
        Sex::Female => pregnancy,
        Sex::Male => None,
    }
}

/// Split a comma-separated field into trimmed, non-empty items.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rewrite comma-separated list fields of a raw intake into JSON arrays.
/// Arrays and other value kinds are left for the validator to judge.
pub fn normalize_list_fields(raw: &mut Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    for field in LIST_FIELDS {
        if let Some(Value::String(text)) = obj.get(field) {
            let items = split_list(text);
            obj.insert(field.to_string(), json!(items));
        }
    }
}

/// The intake form as posted by the pharmacy front end when a result is
/// saved. Values are kept raw until [`IntakeForm::to_medical_input_value`]
/// maps them onto the MedicalInput shape for validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    pub id_number: Option<Value>,
    pub full_name: Option<String>,
    pub id_type: Option<Value>,
    pub age: Option<Value>,
    pub gender: Option<Value>,
    pub weight: Option<Value>,
    pub symptoms: Option<Value>,
    pub allergies: Option<Value>,
    pub diseases: Option<Value>,
    pub pregnancy: Option<Value>,
    pub current_medication: Option<Value>,
    pub symptom_duration: Option<Value>,
    pub severity: Option<Value>,
}

impl IntakeForm {
    /// Trimmed identification number, `None` when missing or blank. Front
    /// ends that post the number as a JSON integer are accepted as well.
    pub fn id_number(&self) -> Option<String> {
        let text = match self.id_number.as_ref()? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) if n.is_u64() => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Trimmed full name, `None` when missing or blank.
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The document type. Accepts a code (`"DNI"`) or a numeric id; a form
    /// without one is treated as DNI.
    pub fn identification_type(&self) -> Result<IdentificationType, ValidationError> {
        let parsed = match &self.id_type {
            None | Some(Value::Null) => return Ok(IdentificationType::Dni),
            Some(Value::String(code)) => code.parse::<IdentificationType>().ok(),
            Some(Value::Number(n)) => n.as_i64().and_then(|id| IdentificationType::from_id(id).ok()),
            Some(_) => None,
        };
        parsed.ok_or_else(|| {
            ValidationError::single("idType", "must be one of: DNI, RUC, CE, PASAPORTE")
        })
    }

    /// Build a raw MedicalInput object from the form fields.
    ///
    /// Numeric strings become numbers and comma-separated lists become
    /// arrays, so HTML form posts validate the same way JSON clients do.
    pub fn to_medical_input_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("age".into(), lenient_number(self.age.as_ref()));
        obj.insert("sex".into(), self.gender.clone().unwrap_or(Value::Null));
        obj.insert("weight".into(), lenient_number(self.weight.as_ref()));
        obj.insert("symptoms".into(), lenient_list(self.symptoms.as_ref()));
        obj.insert("allergies".into(), lenient_list(self.allergies.as_ref()));
        obj.insert(
            "preexisting_diseases".into(),
            lenient_list(self.diseases.as_ref()),
        );
        obj.insert("pregnancy".into(), lenient_bool(self.pregnancy.as_ref()));
        obj.insert(
            "current_medication".into(),
            self.current_medication.clone().unwrap_or(Value::Null),
        );
        obj.insert(
            "duration_days".into(),
            lenient_number(self.symptom_duration.as_ref()),
        );
        obj.insert(
            "severity".into(),
            match &self.severity {
                Some(Value::String(s)) if s.trim().is_empty() => Value::Null,
                other => other.clone().unwrap_or(Value::Null),
            },
        );
        Value::Object(obj)
    }
}

fn lenient_number(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Value::Null
            } else if let Ok(n) = s.parse::<u64>() {
                json!(n)
            } else if let Ok(n) = s.parse::<f64>() {
                json!(n)
            } else {
                Value::String(s.to_string())
            }
        }
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

fn lenient_list(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(s)) => json!(split_list(s)),
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

fn lenient_bool(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "si" | "sí" => Value::Bool(true),
            "false" | "no" => Value::Bool(false),
            "" => Value::Null,
            _ => Value::String(s.clone()),
        },
        Some(other) => other.clone(),
        None => Value::Null,
    }
}
