use std::sync::Arc;
use std::time::Duration;

use botica_core::intake::normalize_list_fields;
use botica_core::models::intake::MedicalInput;
use botica_core::models::response::MedicalResponse;
use botica_core::models::usage::TokenUsage;
use botica_core::validation::{validate_medical_input, validate_medical_response};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::RecommendError;
use crate::prompt::{SYSTEM_PROMPT, build_prompt};
use crate::provider::{ModelProvider, ProviderRequest};
use crate::schema::{RESPONSE_TOOL_NAME, medical_response_schema};
use crate::tokens;

pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";

/// Knobs for a single generation. Loaded from configuration by the binary.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_tokens: 1024,
            temperature: 0.0,
            timeout: Duration::from_secs(60),
        }
    }
}

/// A validated model answer along with what is needed to log it.
#[derive(Debug, Clone)]
pub struct Generation {
    pub id: Uuid,
    pub model_id: String,
    pub usage: TokenUsage,
    pub response: MedicalResponse,
}

/// Turns an intake into a schema-valid MedicalResponse with one provider
/// call. Holds no per-request state, so one instance is shared by all
/// handlers.
pub struct RecommendationClient {
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
}

impl RecommendationClient {
    pub fn new(provider: Arc<dyn ModelProvider>, settings: GenerationSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Validate a raw intake and generate a recommendation for it.
    ///
    /// Comma-separated list fields are split first. Invalid input returns
    /// [`RecommendError::InvalidInput`] without calling the provider.
    pub async fn generate(&self, raw: &Value) -> Result<Generation, RecommendError> {
        let mut raw = raw.clone();
        normalize_list_fields(&mut raw);
        let input = validate_medical_input(&raw).map_err(RecommendError::InvalidInput)?;
        self.generate_validated(&input).await
    }

    pub async fn generate_validated(
        &self,
        input: &MedicalInput,
    ) -> Result<Generation, RecommendError> {
        let generation_id = Uuid::new_v4();
        let model_id = self.settings.model_id.as_str();
        info!(
            generation_id = %generation_id,
            model_id,
            symptoms = input.symptoms.len(),
            "starting recommendation generation"
        );

        let request = ProviderRequest {
            model_id: model_id.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(input),
            output_schema: medical_response_schema(),
            tool_name: RESPONSE_TOOL_NAME.to_string(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let output = tokio::time::timeout(self.settings.timeout, self.provider.complete(&request))
            .await
            .map_err(|_| {
                warn!(generation_id = %generation_id, "model call timed out");
                RecommendError::Timeout(self.settings.timeout)
            })?
            .map_err(|e| {
                warn!(generation_id = %generation_id, error = %e, "model call failed");
                RecommendError::from(e)
            })?;

        let usage = tokens::usage_for(model_id, output.usage);
        let response = parse_response(&output.text).inspect_err(|e| {
            warn!(generation_id = %generation_id, error = %e, "rejected model output");
        })?;

        info!(
            generation_id = %generation_id,
            model_id,
            input_tokens = usage.tokens.input,
            output_tokens = usage.tokens.output,
            cost_usd = usage.cost_usd,
            recommendations = response.recommendations.len(),
            referred = response.reason.is_some(),
            "recommendation generation complete"
        );

        Ok(Generation {
            id: generation_id,
            model_id: model_id.to_string(),
            usage,
            response,
        })
    }
}

/// Decode raw model text into a MedicalResponse.
///
/// The text must be a JSON document on its own. Nothing is stripped or
/// coerced: prose, code fences, or range strings are all rejections.
pub fn parse_response(text: &str) -> Result<MedicalResponse, RecommendError> {
    let value: Value = serde_json::from_str(text).map_err(|e| RecommendError::ResponseFormat {
        raw: text.to_string(),
        reason: e.to_string(),
    })?;
    validate_medical_response(&value).map_err(RecommendError::ResponseSchema)
}
