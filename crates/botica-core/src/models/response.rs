use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

/// The structured output of a recommendation generation.
///
/// Exactly one of the two fields carries content: a non-empty
/// `recommendations` list, or a `reason` explaining why the case was
/// referred instead of treated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MedicalResponse {
    pub recommendations: Vec<Recommendation>,
    pub reason: Option<String>,
}

impl MedicalResponse {
    /// A referral: no treatment lines, only the reason.
    pub fn referral(reason: impl Into<String>) -> Self {
        Self {
            recommendations: Vec::new(),
            reason: Some(reason.into()),
        }
    }

    /// Re-check an already typed response against the safety rules.
    ///
    /// Values built in code (or read back from older rows) never went
    /// through [`crate::validation::validate_medical_response`], so anything
    /// about to be persisted passes through here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::validation::check_response(self).into_result(())
    }
}

/// One suggested treatment line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recommendation {
    /// Active ingredient only, no brand names.
    pub medication: String,
    pub form: String,
    pub via: String,
    pub amount_value: f64,
    pub amount_unit: String,
    /// Dosing interval in hours. `0` means no fixed interval.
    pub every_hour: u32,
    pub duration_days: u32,
    pub moment: String,
    pub instructions: String,
    pub warnings: Vec<String>,
}
