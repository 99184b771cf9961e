use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Patient {
    pub id: i64,
    pub full_name: String,
    pub identification_number: String,
    pub identification_type_id: i64,
}

/// Identity document kinds. The numeric ids match the rows seeded into the
/// `identification_types` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum IdentificationType {
    #[serde(rename = "DNI")]
    Dni,
    #[serde(rename = "RUC")]
    Ruc,
    /// Carné de extranjería.
    #[serde(rename = "CE")]
    ForeignerCard,
    #[serde(rename = "PASAPORTE")]
    Passport,
}

impl IdentificationType {
    pub const ALL: [IdentificationType; 4] = [
        IdentificationType::Dni,
        IdentificationType::Ruc,
        IdentificationType::ForeignerCard,
        IdentificationType::Passport,
    ];

    pub fn id(&self) -> i64 {
        match self {
            IdentificationType::Dni => 1,
            IdentificationType::Ruc => 2,
            IdentificationType::ForeignerCard => 3,
            IdentificationType::Passport => 4,
        }
    }

    pub fn from_id(id: i64) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or(CoreError::UnknownIdentificationType(id))
    }

    pub fn code(&self) -> &'static str {
        match self {
            IdentificationType::Dni => "DNI",
            IdentificationType::Ruc => "RUC",
            IdentificationType::ForeignerCard => "CE",
            IdentificationType::Passport => "PASAPORTE",
        }
    }
}

impl FromStr for IdentificationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            return Self::from_id(id);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::InvalidEnum {
                field: "idType".to_string(),
                value: s.to_string(),
            })
    }
}
