use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::evaluation::Evaluation;
use super::patient::Patient;
use super::response::{MedicalResponse, Recommendation};

/// A persisted generation result together with the encounter it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoredRecommendation {
    pub id: i64,
    pub evaluation_id: i64,
    pub reason: Option<String>,
    pub created_at: jiff::Timestamp,
    pub medications: Vec<StoredLine>,
    pub evaluation: Evaluation,
    pub patient: Patient,
}

impl StoredRecommendation {
    /// Rebuild the response envelope the lines were created from.
    pub fn to_response(&self) -> MedicalResponse {
        MedicalResponse {
            recommendations: self
                .medications
                .iter()
                .map(|line| line.recommendation.clone())
                .collect(),
            reason: self.reason.clone(),
        }
    }
}

/// One persisted treatment line. `position` keeps the model's ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoredLine {
    pub id: i64,
    pub position: u32,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}
