use botica_core::models::patient::Patient;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StorageError;

/// Create the patient, or refresh name and document type when the
/// identification number is already known. The row id never changes.
pub fn upsert_patient(
    conn: &Connection,
    identification_number: &str,
    full_name: &str,
    identification_type_id: i64,
) -> Result<Patient, StorageError> {
    let patient = conn.query_row(
        "INSERT INTO patients (identification_number, full_name, identification_type_id)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(identification_number) DO UPDATE SET
             full_name = excluded.full_name,
             identification_type_id = excluded.identification_type_id
         RETURNING id, full_name, identification_number, identification_type_id",
        params![identification_number, full_name, identification_type_id],
        patient_from_row,
    )?;
    Ok(patient)
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, StorageError> {
    let patient = conn
        .query_row(
            "SELECT id, full_name, identification_number, identification_type_id
             FROM patients WHERE id = ?1",
            params![id],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

pub fn get_patient_by_identification_number(
    conn: &Connection,
    identification_number: &str,
) -> Result<Option<Patient>, StorageError> {
    let patient = conn
        .query_row(
            "SELECT id, full_name, identification_number, identification_type_id
             FROM patients WHERE identification_number = ?1",
            params![identification_number],
            patient_from_row,
        )
        .optional()?;
    Ok(patient)
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        full_name: row.get(1)?,
        identification_number: row.get(2)?,
        identification_type_id: row.get(3)?,
    })
}
