use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use botica_core::error::ValidationError;
use botica_core::intake::IntakeForm;
use botica_core::models::evaluation::EvaluationSnapshot;
use botica_core::models::stored::StoredRecommendation;
use botica_core::validation::{
    validate_identification_number, validate_medical_input, validate_medical_response,
};
use botica_storage::store::{NewSubmission, RecommendationFilter, RecommendationStore};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

pub const GENERATION_ID_HEADER: &str = "x-generation-id";

/// Run a store operation off the async runtime.
pub(crate) async fn with_store<T, F>(store: &RecommendationStore, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&RecommendationStore) -> Result<T, botica_storage::error::StorageError>
        + Send
        + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
        .map_err(ApiError::from)
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Generate a recommendation for an intake. Nothing is persisted.
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let raw = json_body(payload)?;
    let generation = state.recommender.generate(&raw).await?;

    let mut response = Json(generation.response).into_response();
    if let Ok(value) = HeaderValue::from_str(&generation.id.to_string()) {
        response.headers_mut().insert(GENERATION_ID_HEADER, value);
    }
    Ok(response)
}

/// Save a reviewed recommendation together with the intake it answers.
pub async fn persist(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredRecommendation>), ApiError> {
    let raw = json_body(payload)?;
    let submission = read_submission(&raw)?;
    let stored = with_store(&state.store, move |store| {
        store.persist_submission(&submission)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Decode and validate a persist request, collecting every problem.
fn read_submission(raw: &Value) -> Result<NewSubmission, ApiError> {
    let Some(body) = raw.as_object() else {
        return Err(ApiError::BadRequest("request body must be a JSON object".to_string()));
    };
    let mut errors = ValidationError::new();

    let user_id = match body.get("userId") {
        None | Some(Value::Null) => {
            errors.add("userId", "is required");
            None
        }
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    if user_id.is_none() && !errors.contains("userId") {
        errors.add("userId", "must be an integer");
    }

    let form = match body.get("form") {
        None | Some(Value::Null) => {
            errors.add("form", "is required");
            None
        }
        Some(value) => match serde_json::from_value::<IntakeForm>(value.clone()) {
            Ok(form) => Some(form),
            Err(e) => {
                errors.add("form", format!("is malformed: {e}"));
                None
            }
        },
    };

    let response = match body.get("recommendationResult") {
        None | Some(Value::Null) => {
            errors.add("recommendationResult", "is required");
            None
        }
        Some(value) => validate_medical_response(value)
            .map_err(|e| merge_prefixed(&mut errors, "recommendationResult", e))
            .ok(),
    };

    let mut identity = None;
    let mut snapshot = None;
    if let Some(form) = &form {
        let id_number = form.id_number();
        let id_number = id_number.as_deref();
        let full_name = form.full_name();
        if id_number.is_none() {
            errors.add("form.idNumber", "is required");
        }
        if full_name.is_none() {
            errors.add("form.fullName", "is required");
        }
        let id_type = form
            .identification_type()
            .map_err(|e| merge_prefixed(&mut errors, "form", e))
            .ok();

        if let (Some(id_type), Some(number)) = (id_type, id_number)
            && let Err(e) = validate_identification_number(id_type, number)
        {
            merge_prefixed(&mut errors, "form", e);
        }

        if let (Some(id_type), Some(number), Some(name)) = (id_type, id_number, full_name) {
            identity = Some((id_type, number.to_string(), name.to_string()));
        }

        snapshot = validate_medical_input(&form.to_medical_input_value())
            .map(|input| EvaluationSnapshot::from(&input))
            .map_err(|e| merge_prefixed(&mut errors, "form", e))
            .ok();
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    match (user_id, identity, snapshot, response) {
        (Some(user_id), Some((identification_type, number, name)), Some(snapshot), Some(response)) => {
            Ok(NewSubmission {
                user_id,
                identification_number: number,
                full_name: name,
                identification_type,
                snapshot,
                response,
            })
        }
        _ => Err(ApiError::Validation(errors)),
    }
}

fn merge_prefixed(errors: &mut ValidationError, prefix: &str, other: ValidationError) {
    for (field, message) in other.fields {
        errors.add(format!("{prefix}.{field}"), message);
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub dni: Option<String>,
    pub ruc: Option<String>,
}

/// List recommendations, or fetch one when `id` is given.
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> Result<Response, ApiError> {
    let filter = RecommendationFilter::from_params(
        params.id.as_deref(),
        params.user_id.as_deref(),
        params.dni.as_deref(),
        params.ruc.as_deref(),
    )?;

    if let RecommendationFilter::ById(id) = filter {
        return Ok(Json(find_one(&state, id).await?).into_response());
    }
    let list = with_store(&state.store, move |store| store.query(&filter)).await?;
    Ok(Json(list).into_response())
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredRecommendation>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(find_one(&state, id).await?))
}

pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::Validation(ValidationError::single("id", "must be an integer")))
}

pub(crate) async fn find_one(state: &AppState, id: i64) -> Result<StoredRecommendation, ApiError> {
    with_store(&state.store, move |store| store.find_by_id(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("recommendation not found: {id}")))
}

