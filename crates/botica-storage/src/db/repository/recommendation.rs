use botica_core::models::patient::Patient;
use botica_core::models::response::{MedicalResponse, Recommendation};
use botica_core::models::stored::{StoredLine, StoredRecommendation};
use rusqlite::{Connection, OptionalExtension, params};

use super::evaluation::{EVALUATION_COLUMNS, EVALUATION_COLUMN_COUNT, EvaluationRow};
use super::{parse_list, parse_timestamp};
use crate::error::StorageError;

/// Write the recommendation and all of its lines.
///
/// The response is validated first. Call inside a transaction: a line that
/// fails a CHECK constraint leaves the parent row behind otherwise.
pub fn insert_recommendation(
    conn: &Connection,
    evaluation_id: i64,
    response: &MedicalResponse,
    created_at: jiff::Timestamp,
) -> Result<i64, StorageError> {
    response.validate().map_err(StorageError::Validation)?;

    conn.execute(
        "INSERT INTO recommendations (evaluation_id, reason, created_at) VALUES (?1, ?2, ?3)",
        params![evaluation_id, response.reason, created_at.to_string()],
    )?;
    let recommendation_id = conn.last_insert_rowid();

    let mut stmt = conn.prepare(
        "INSERT INTO recommendation_lines (recommendation_id, position, medication, form, via,
             amount_value, amount_unit, every_hour, duration_days, moment, instructions, warnings)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?;
    for (position, line) in response.recommendations.iter().enumerate() {
        stmt.execute(params![
            recommendation_id,
            position as i64,
            line.medication,
            line.form,
            line.via,
            line.amount_value,
            line.amount_unit,
            line.every_hour,
            line.duration_days,
            line.moment,
            line.instructions,
            serde_json::to_string(&line.warnings)?,
        ])?;
    }

    Ok(recommendation_id)
}

fn select_recommendations(filter: &str) -> String {
    format!(
        "SELECT r.id, r.evaluation_id, r.reason, r.created_at, {EVALUATION_COLUMNS},
                p.id, p.full_name, p.identification_number, p.identification_type_id
         FROM recommendations r
         JOIN evaluations e ON e.id = r.evaluation_id
         JOIN patients p ON p.id = e.patient_id
         {filter}
         ORDER BY r.id DESC"
    )
}

pub fn get_recommendation(
    conn: &Connection,
    id: i64,
) -> Result<Option<StoredRecommendation>, StorageError> {
    let row = conn
        .query_row(
            &select_recommendations("WHERE r.id = ?1"),
            params![id],
            RecommendationRow::read,
        )
        .optional()?;
    row.map(|row| row.into_stored(conn)).transpose()
}

pub fn list_recommendations_by_user(
    conn: &Connection,
    user_id: i64,
) -> Result<Vec<StoredRecommendation>, StorageError> {
    collect(conn, &select_recommendations("WHERE e.user_id = ?1"), params![user_id])
}

pub fn list_recommendations_by_identification_number(
    conn: &Connection,
    identification_number: &str,
) -> Result<Vec<StoredRecommendation>, StorageError> {
    collect(
        conn,
        &select_recommendations("WHERE p.identification_number = ?1"),
        params![identification_number],
    )
}

pub fn list_recommendations(conn: &Connection) -> Result<Vec<StoredRecommendation>, StorageError> {
    collect(conn, &select_recommendations(""), [])
}

fn collect(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<StoredRecommendation>, StorageError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, RecommendationRow::read)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut recommendations = Vec::with_capacity(rows.len());
    for row in rows {
        recommendations.push(row.into_stored(conn)?);
    }
    Ok(recommendations)
}

pub fn get_lines(conn: &Connection, recommendation_id: i64) -> Result<Vec<StoredLine>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, position, medication, form, via, amount_value, amount_unit, every_hour,
                duration_days, moment, instructions, warnings
         FROM recommendation_lines
         WHERE recommendation_id = ?1
         ORDER BY position",
    )?;

    let rows = stmt.query_map(params![recommendation_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, u32>(1)?,
            Recommendation {
                medication: row.get(2)?,
                form: row.get(3)?,
                via: row.get(4)?,
                amount_value: row.get(5)?,
                amount_unit: row.get(6)?,
                every_hour: row.get(7)?,
                duration_days: row.get(8)?,
                moment: row.get(9)?,
                instructions: row.get(10)?,
                warnings: Vec::new(),
            },
            row.get::<_, String>(11)?,
        ))
    })?;

    let mut lines = Vec::new();
    for row in rows {
        let (id, position, mut recommendation, warnings) = row?;
        recommendation.warnings = parse_list(&warnings)?;
        lines.push(StoredLine {
            id,
            position,
            recommendation,
        });
    }
    Ok(lines)
}

struct RecommendationRow {
    id: i64,
    evaluation_id: i64,
    reason: Option<String>,
    created_at: String,
    evaluation: EvaluationRow,
    patient: Patient,
}

impl RecommendationRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let p = 4 + EVALUATION_COLUMN_COUNT;
        Ok(Self {
            id: row.get(0)?,
            evaluation_id: row.get(1)?,
            reason: row.get(2)?,
            created_at: row.get(3)?,
            evaluation: EvaluationRow::read(row, 4)?,
            patient: Patient {
                id: row.get(p)?,
                full_name: row.get(p + 1)?,
                identification_number: row.get(p + 2)?,
                identification_type_id: row.get(p + 3)?,
            },
        })
    }

    fn into_stored(self, conn: &Connection) -> Result<StoredRecommendation, StorageError> {
        Ok(StoredRecommendation {
            id: self.id,
            evaluation_id: self.evaluation_id,
            reason: self.reason,
            created_at: parse_timestamp(&self.created_at)?,
            medications: get_lines(conn, self.id)?,
            evaluation: self.evaluation.into_evaluation()?,
            patient: self.patient,
        })
    }
}
