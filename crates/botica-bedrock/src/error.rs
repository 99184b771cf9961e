use std::time::Duration;

use botica_core::error::ValidationError;
use thiserror::Error;

/// Failures of a single recommendation generation.
///
/// The variants separate "fix your input" (`InvalidInput`), "system
/// misconfigured" (`Configuration`) and "try again later" (`Upstream`,
/// `Timeout`). Nothing in this crate retries.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("invalid medical input: {0}")]
    InvalidInput(ValidationError),

    #[error("model provider is not configured: {0}")]
    Configuration(String),

    #[error("could not build model request: {0}")]
    Request(String),

    #[error("model provider call failed (status {status:?}): {body}")]
    Upstream { status: Option<u16>, body: String },

    #[error("model response is not valid JSON: {reason}")]
    ResponseFormat { raw: String, reason: String },

    #[error("model response did not conform to the recommendation schema: {0}")]
    ResponseSchema(ValidationError),

    #[error("model call did not finish within {0:?}")]
    Timeout(Duration),
}

/// Errors reported by a [`crate::provider::ModelProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider credentials unavailable: {0}")]
    MissingCredentials(String),

    #[error("could not build provider request: {0}")]
    InvalidRequest(String),

    #[error("provider returned an error (status {status:?}): {body}")]
    Upstream { status: Option<u16>, body: String },
}

impl From<ProviderError> for RecommendError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::MissingCredentials(msg) => RecommendError::Configuration(msg),
            ProviderError::InvalidRequest(msg) => RecommendError::Request(msg),
            ProviderError::Upstream { status, body } => RecommendError::Upstream { status, body },
        }
    }
}
