use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::intake::{MedicalInput, Severity, Sex};

/// A clinical encounter. Created once per submission, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Evaluation {
    pub id: i64,
    pub patient_id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub snapshot: EvaluationSnapshot,
    pub created_at: jiff::Timestamp,
}

/// The intake as it was when the evaluation was submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EvaluationSnapshot {
    pub age: u32,
    pub sex: Sex,
    pub weight: Option<f64>,
    pub symptoms: Vec<String>,
    pub allergies: Vec<String>,
    pub preexisting_diseases: Vec<String>,
    pub pregnancy: Option<bool>,
    pub current_medication: Option<String>,
    /// Days since symptom onset.
    pub symptom_duration: Option<u32>,
    pub severity: Option<Severity>,
}

impl From<&MedicalInput> for EvaluationSnapshot {
    fn from(input: &MedicalInput) -> Self {
        Self {
            age: input.age,
            sex: input.sex,
            weight: input.weight,
            symptoms: input.symptoms.clone(),
            allergies: input.allergies.clone().unwrap_or_default(),
            preexisting_diseases: input.preexisting_diseases.clone().unwrap_or_default(),
            pregnancy: input.pregnancy,
            current_medication: input.current_medication.clone(),
            symptom_duration: input.duration_days,
            severity: input.severity,
        }
    }
}
