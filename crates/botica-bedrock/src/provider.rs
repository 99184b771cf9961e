//! The model provider seam.
//!
//! [`ModelProvider`] is the only thing the recommendation client knows about
//! the model. [`BedrockProvider`] talks to the Bedrock Converse API and forces
//! the model to answer through a single tool whose input schema is the
//! MedicalResponse shape. Tests supply their own implementation.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::http::HttpResponse;
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, SdkError};
use aws_sdk_bedrockruntime::operation::converse::ConverseError;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SpecificToolChoice,
    SystemContentBlock, Tool, ToolChoice, ToolConfiguration, ToolInputSchema, ToolSpecification,
};
use botica_core::models::usage::TokenCount;
use serde_json::Value;
use tracing::debug;

use crate::document::{to_document, to_json};
use crate::error::ProviderError;
use crate::tokens;

/// Everything a provider needs for one completion.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model_id: String,
    pub system_prompt: String,
    pub prompt: String,
    /// JSON schema the output must follow. Providers that support it enforce
    /// it on their side.
    pub output_schema: Value,
    pub tool_name: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Raw provider output. `text` is expected to be a JSON document but is not
/// trusted; the caller decodes and validates it.
#[derive(Debug, Clone, Default)]
pub struct ProviderOutput {
    pub text: String,
    pub usage: Option<TokenCount>,
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError>;
}

/// Bedrock Converse provider.
pub struct BedrockProvider {
    client: Client,
    credentials: Option<SharedCredentialsProvider>,
}

impl BedrockProvider {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
            credentials: config.credentials_provider(),
        }
    }

    /// Resolve credentials before sending so a missing profile surfaces as a
    /// configuration problem instead of an opaque dispatch failure.
    async fn check_credentials(&self) -> Result<(), ProviderError> {
        let Some(provider) = &self.credentials else {
            return Err(ProviderError::MissingCredentials(
                "no AWS credentials provider is configured".to_string(),
            ));
        };
        provider
            .provide_credentials()
            .await
            .map(|_| ())
            .map_err(|e| ProviderError::MissingCredentials(DisplayErrorContext(&e).to_string()))
    }
}

#[async_trait]
impl ModelProvider for BedrockProvider {
    async fn complete(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        self.check_credentials().await?;

        let tool_spec = ToolSpecification::builder()
            .name(&request.tool_name)
            .description("Registra la recomendación farmacéutica para el caso evaluado.")
            .input_schema(ToolInputSchema::Json(to_document(&request.output_schema)))
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let tool_choice = SpecificToolChoice::builder()
            .name(&request.tool_name)
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let tool_config = ToolConfiguration::builder()
            .tools(Tool::ToolSpec(tool_spec))
            .tool_choice(ToolChoice::Tool(tool_choice))
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(request.prompt.clone()))
            .build()
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;

        let inference = InferenceConfiguration::builder()
            .max_tokens(i32::try_from(request.max_tokens).unwrap_or(i32::MAX))
            .temperature(request.temperature)
            .build();

        let response = self
            .client
            .converse()
            .model_id(&request.model_id)
            .system(SystemContentBlock::Text(request.system_prompt.clone()))
            .messages(message)
            .tool_config(tool_config)
            .inference_config(inference)
            .send()
            .await
            .map_err(upstream_error)?;

        let usage = response.usage().map(tokens::extract_token_usage);

        let Some(output_message) = response.output().and_then(|o| o.as_message().ok()) else {
            debug!("converse response carried no message");
            return Ok(ProviderOutput {
                text: String::new(),
                usage,
            });
        };

        // The forced tool call carries the structured answer. Plain text is
        // only used when a model ignores the tool choice.
        let tool_input = output_message.content().iter().find_map(|block| match block {
            ContentBlock::ToolUse(tool_use) => Some(to_json(tool_use.input())),
            _ => None,
        });

        let text = match tool_input {
            Some(input) => input.to_string(),
            None => output_message
                .content()
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        };

        Ok(ProviderOutput { text, usage })
    }
}

fn upstream_error(err: SdkError<ConverseError, HttpResponse>) -> ProviderError {
    if let Some(raw) = err.raw_response() {
        let status = raw.status().as_u16();
        let body = raw
            .body()
            .bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
        return ProviderError::Upstream {
            status: Some(status),
            body,
        };
    }
    ProviderError::Upstream {
        status: None,
        body: DisplayErrorContext(&err).to_string(),
    }
}
