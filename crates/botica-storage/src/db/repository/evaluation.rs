use botica_core::models::evaluation::{Evaluation, EvaluationSnapshot};
use botica_core::models::intake::{Severity, Sex};
use rusqlite::{Connection, OptionalExtension, params};

use super::{parse_list, parse_timestamp};
use crate::error::StorageError;

pub(crate) const EVALUATION_COLUMNS: &str = "e.id, e.patient_id, e.user_id, e.age, e.sex, e.weight, \
     e.symptoms, e.allergies, e.preexisting_diseases, e.pregnancy, e.current_medication, \
     e.symptom_duration, e.severity, e.created_at";

/// Number of columns in [`EVALUATION_COLUMNS`].
pub(crate) const EVALUATION_COLUMN_COUNT: usize = 14;

pub fn insert_evaluation(
    conn: &Connection,
    patient_id: i64,
    user_id: i64,
    snapshot: &EvaluationSnapshot,
    created_at: jiff::Timestamp,
) -> Result<Evaluation, StorageError> {
    conn.execute(
        "INSERT INTO evaluations (patient_id, user_id, age, sex, weight, symptoms, allergies,
             preexisting_diseases, pregnancy, current_medication, symptom_duration, severity,
             created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            patient_id,
            user_id,
            snapshot.age,
            snapshot.sex.as_str(),
            snapshot.weight,
            serde_json::to_string(&snapshot.symptoms)?,
            serde_json::to_string(&snapshot.allergies)?,
            serde_json::to_string(&snapshot.preexisting_diseases)?,
            snapshot.pregnancy,
            snapshot.current_medication,
            snapshot.symptom_duration,
            snapshot.severity.map(|s| s.as_str()),
            created_at.to_string(),
        ],
    )?;
    Ok(Evaluation {
        id: conn.last_insert_rowid(),
        patient_id,
        user_id,
        snapshot: snapshot.clone(),
        created_at,
    })
}

pub fn get_evaluation(conn: &Connection, id: i64) -> Result<Option<Evaluation>, StorageError> {
    let row = conn
        .query_row(
            &format!("SELECT {EVALUATION_COLUMNS} FROM evaluations e WHERE e.id = ?1"),
            params![id],
            |row| EvaluationRow::read(row, 0),
        )
        .optional()?;
    row.map(EvaluationRow::into_evaluation).transpose()
}

/// Raw evaluation columns, read inside a rusqlite row closure and decoded
/// afterwards so decoding errors keep their own type.
pub(crate) struct EvaluationRow {
    id: i64,
    patient_id: i64,
    user_id: i64,
    age: u32,
    sex: String,
    weight: Option<f64>,
    symptoms: String,
    allergies: String,
    preexisting_diseases: String,
    pregnancy: Option<bool>,
    current_medication: Option<String>,
    symptom_duration: Option<u32>,
    severity: Option<String>,
    created_at: String,
}

impl EvaluationRow {
    /// Read [`EVALUATION_COLUMNS`] starting at column `offset`.
    pub(crate) fn read(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            patient_id: row.get(offset + 1)?,
            user_id: row.get(offset + 2)?,
            age: row.get(offset + 3)?,
            sex: row.get(offset + 4)?,
            weight: row.get(offset + 5)?,
            symptoms: row.get(offset + 6)?,
            allergies: row.get(offset + 7)?,
            preexisting_diseases: row.get(offset + 8)?,
            pregnancy: row.get(offset + 9)?,
            current_medication: row.get(offset + 10)?,
            symptom_duration: row.get(offset + 11)?,
            severity: row.get(offset + 12)?,
            created_at: row.get(offset + 13)?,
        })
    }

    pub(crate) fn into_evaluation(self) -> Result<Evaluation, StorageError> {
        let severity = self
            .severity
            .as_deref()
            .map(str::parse::<Severity>)
            .transpose()?;
        Ok(Evaluation {
            id: self.id,
            patient_id: self.patient_id,
            user_id: self.user_id,
            snapshot: EvaluationSnapshot {
                age: self.age,
                sex: self.sex.parse::<Sex>()?,
                weight: self.weight,
                symptoms: parse_list(&self.symptoms)?,
                allergies: parse_list(&self.allergies)?,
                preexisting_diseases: parse_list(&self.preexisting_diseases)?,
                pregnancy: self.pregnancy,
                current_medication: self.current_medication,
                symptom_duration: self.symptom_duration,
                severity,
            },
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
