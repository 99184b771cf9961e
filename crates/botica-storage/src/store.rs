//! The recommendation store handle.
//!
//! [`RecommendationStore`] owns the SQLite connection and is constructed
//! explicitly by the binary (or a test) and passed around. Each method is one
//! atomic unit of work.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use botica_core::error::ValidationError;
use botica_core::models::evaluation::{Evaluation, EvaluationSnapshot};
use botica_core::models::patient::{IdentificationType, Patient};
use botica_core::models::response::MedicalResponse;
use botica_core::models::stored::StoredRecommendation;
use botica_core::models::user::User;
use rusqlite::Connection;
use tracing::info;

use crate::db::repository::{evaluation, patient, recommendation, user};
use crate::db::{open_database, open_memory_database};
use crate::error::StorageError;

/// Everything saved for one pharmacy submission.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: i64,
    pub identification_number: String,
    pub full_name: String,
    pub identification_type: IdentificationType,
    pub snapshot: EvaluationSnapshot,
    pub response: MedicalResponse,
}

/// Which recommendations a query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationFilter {
    ById(i64),
    ByUser(i64),
    ByIdentificationNumber(String),
    All,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

impl RecommendationFilter {
    /// Pick the filter from request parameters: `id` wins over `userId`,
    /// which wins over `dni`, then `ruc`. Blank values count as absent.
    pub fn from_params(
        id: Option<&str>,
        user_id: Option<&str>,
        dni: Option<&str>,
        ruc: Option<&str>,
    ) -> Result<Self, ValidationError> {
        if let Some(id) = present(id) {
            return id
                .parse()
                .map(RecommendationFilter::ById)
                .map_err(|_| ValidationError::single("id", "must be an integer"));
        }
        if let Some(user_id) = present(user_id) {
            return user_id
                .parse()
                .map(RecommendationFilter::ByUser)
                .map_err(|_| ValidationError::single("userId", "must be an integer"));
        }
        if let Some(number) = present(dni).or_else(|| present(ruc)) {
            return Ok(RecommendationFilter::ByIdentificationNumber(number.to_string()));
        }
        Ok(RecommendationFilter::All)
    }
}

#[derive(Clone)]
pub struct RecommendationStore {
    conn: Arc<Mutex<Connection>>,
}

impl RecommendationStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!(path = %path.display(), "opening recommendation store");
        Ok(Self::new(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(open_memory_database()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    pub fn create_user(&self, username: &str, full_name: &str) -> Result<User, StorageError> {
        let conn = self.lock()?;
        user::insert_user(&conn, username, full_name)
    }

    pub fn find_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let conn = self.lock()?;
        user::get_user(&conn, id)
    }

    pub fn upsert_patient(
        &self,
        identification_number: &str,
        full_name: &str,
        identification_type_id: i64,
    ) -> Result<Patient, StorageError> {
        let conn = self.lock()?;
        patient::upsert_patient(
            &conn,
            identification_number,
            full_name,
            identification_type_id,
        )
    }

    pub fn find_patient_by_identification_number(
        &self,
        identification_number: &str,
    ) -> Result<Option<Patient>, StorageError> {
        let conn = self.lock()?;
        patient::get_patient_by_identification_number(&conn, identification_number)
    }

    pub fn create_evaluation(
        &self,
        patient_id: i64,
        user_id: i64,
        snapshot: &EvaluationSnapshot,
    ) -> Result<Evaluation, StorageError> {
        let conn = self.lock()?;
        evaluation::insert_evaluation(
            &conn,
            patient_id,
            user_id,
            snapshot,
            jiff::Timestamp::now(),
        )
    }

    /// Store a response and its lines for an existing evaluation. Either
    /// everything is written or nothing is.
    pub fn create_recommendation(
        &self,
        evaluation_id: i64,
        response: &MedicalResponse,
    ) -> Result<StoredRecommendation, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if evaluation::get_evaluation(&tx, evaluation_id)?.is_none() {
            return Err(StorageError::not_found("evaluation", evaluation_id));
        }
        let id =
            recommendation::insert_recommendation(&tx, evaluation_id, response, jiff::Timestamp::now())?;
        let stored = recommendation::get_recommendation(&tx, id)?
            .ok_or_else(|| StorageError::not_found("recommendation", id))?;

        tx.commit()?;
        Ok(stored)
    }

    /// Patient upsert, evaluation and recommendation in one transaction.
    pub fn persist_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<StoredRecommendation, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = jiff::Timestamp::now();

        let patient = patient::upsert_patient(
            &tx,
            &submission.identification_number,
            &submission.full_name,
            submission.identification_type.id(),
        )?;
        if user::get_user(&tx, submission.user_id)?.is_none() {
            return Err(StorageError::not_found("user", submission.user_id));
        }
        let evaluation = evaluation::insert_evaluation(
            &tx,
            patient.id,
            submission.user_id,
            &submission.snapshot,
            now,
        )?;
        let id = recommendation::insert_recommendation(&tx, evaluation.id, &submission.response, now)?;
        let stored = recommendation::get_recommendation(&tx, id)?
            .ok_or_else(|| StorageError::not_found("recommendation", id))?;

        tx.commit()?;
        info!(
            recommendation_id = stored.id,
            evaluation_id = evaluation.id,
            patient_id = patient.id,
            lines = stored.medications.len(),
            "submission persisted"
        );
        Ok(stored)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<StoredRecommendation>, StorageError> {
        let conn = self.lock()?;
        recommendation::get_recommendation(&conn, id)
    }

    pub fn find_by_user(&self, user_id: i64) -> Result<Vec<StoredRecommendation>, StorageError> {
        let conn = self.lock()?;
        recommendation::list_recommendations_by_user(&conn, user_id)
    }

    pub fn find_by_identification_number(
        &self,
        identification_number: &str,
    ) -> Result<Vec<StoredRecommendation>, StorageError> {
        let conn = self.lock()?;
        recommendation::list_recommendations_by_identification_number(
            &conn,
            identification_number,
        )
    }

    pub fn list_all(&self) -> Result<Vec<StoredRecommendation>, StorageError> {
        let conn = self.lock()?;
        recommendation::list_recommendations(&conn)
    }

    /// Run a filtered query. Newest first; `ById` yields at most one item.
    pub fn query(
        &self,
        filter: &RecommendationFilter,
    ) -> Result<Vec<StoredRecommendation>, StorageError> {
        match filter {
            RecommendationFilter::ById(id) => Ok(self.find_by_id(*id)?.into_iter().collect()),
            RecommendationFilter::ByUser(user_id) => self.find_by_user(*user_id),
            RecommendationFilter::ByIdentificationNumber(number) => {
                self.find_by_identification_number(number)
            }
            RecommendationFilter::All => self.list_all(),
        }
    }
}
