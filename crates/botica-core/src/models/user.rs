use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The pharmacy staff member who submitted an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
}
