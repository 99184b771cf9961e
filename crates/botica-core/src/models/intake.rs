use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// A validated clinical intake, ready for prompt construction.
///
/// Only [`crate::validation::validate_medical_input`] should build one from
/// untrusted data; it guarantees every field is in domain and that
/// `pregnancy` is `None` unless `sex` is [`Sex::Female`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MedicalInput {
    pub age: u32,
    pub sex: Sex,
    pub weight: Option<f64>,
    pub symptoms: Vec<String>,
    pub allergies: Option<Vec<String>>,
    pub preexisting_diseases: Option<Vec<String>>,
    pub pregnancy: Option<bool>,
    pub current_medication: Option<String>,
    pub duration_days: Option<u32>,
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Sex {
    #[serde(rename = "masculino", alias = "male")]
    Male,
    #[serde(rename = "femenino", alias = "female")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "masculino",
            Sex::Female => "femenino",
        }
    }
}

impl FromStr for Sex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "masculino" | "male" => Ok(Sex::Male),
            "femenino" | "female" => Ok(Sex::Female),
            _ => Err(CoreError::InvalidEnum {
                field: "sex".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Severity {
    #[serde(rename = "leve", alias = "mild")]
    Mild,
    #[serde(rename = "moderado", alias = "moderate")]
    Moderate,
    #[serde(rename = "severo", alias = "severe")]
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "leve",
            Severity::Moderate => "moderado",
            Severity::Severe => "severo",
        }
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leve" | "mild" => Ok(Severity::Mild),
            "moderado" | "moderate" => Ok(Severity::Moderate),
            "severo" | "severe" => Ok(Severity::Severe),
            _ => Err(CoreError::InvalidEnum {
                field: "severity".to_string(),
                value: s.to_string(),
            }),
        }
    }
}
