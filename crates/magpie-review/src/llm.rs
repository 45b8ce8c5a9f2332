use std::time::Duration;

use magpie_core::{LlmConfig, MagpieError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use magpie_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Review this diff".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use magpie_review::llm::Role;
///
/// let role = Role::System;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"system\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// Chat-completions client for any OpenAI-compatible provider.
///
/// Unlike the webhook handlers this component is fail-loud: a missing
/// completion has no safe default, so construction errors and per-call
/// errors both surface to the caller (per-call errors are logged first).
///
/// # Examples
///
/// ```
/// use magpie_core::LlmConfig;
/// use magpie_review::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("sk-test".into()),
///     base_url: Some("https://llm.example.com/v1".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// assert_eq!(client.model(), "gpt-3.5-turbo");
/// ```
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl LlmClient {
    /// Create a client from configuration.
    ///
    /// The API key and base URL must both be resolved: pass them
    /// explicitly or populate the config with
    /// [`LlmConfig::from_env`] (`CUSTOM_API_KEY`,
    /// `CUSTOM_API_BASE_URL`). The client is never partially
    /// constructed.
    ///
    /// # Errors
    ///
    /// Returns [`MagpieError::Config`] when either credential is
    /// missing, or [`MagpieError::Llm`] if the HTTP client cannot be
    /// built.
    pub fn new(config: &LlmConfig) -> Result<Self, MagpieError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                MagpieError::Config(
                    "LLM API key is required; pass it explicitly or set CUSTOM_API_KEY".into(),
                )
            })?
            .to_string();
        let base_url = config
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                MagpieError::Config(
                    "LLM base URL is required; pass it explicitly or set CUSTOM_API_BASE_URL"
                        .into(),
                )
            })?
            .trim_end_matches('/')
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| MagpieError::Llm(format!("failed to create HTTP client: {e}")))?;

        debug!(model = %config.model, "LLM client initialized");
        Ok(Self {
            http,
            api_key,
            base_url,
            default_model: config.model.clone(),
        })
    }

    /// The default model identifier from the configuration.
    pub fn model(&self) -> &str {
        &self.default_model
    }

    /// Send the conversation to `{base_url}/chat/completions` and return
    /// the text content of the first completion choice.
    ///
    /// `model` overrides the configured default for this call only.
    ///
    /// # Errors
    ///
    /// Returns [`MagpieError::Llm`] on transport failures, non-success
    /// provider status, or an unexpected response shape. The failure is
    /// logged before it is returned; it is never swallowed.
    pub async fn completions(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<&str>,
    ) -> Result<String, MagpieError> {
        let model = model.unwrap_or(&self.default_model);
        let result = self.request(model, &messages).await;
        if let Err(err) = &result {
            error!("chat completion failed: {err}");
        }
        result
    }

    async fn request(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, MagpieError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| MagpieError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(MagpieError::Llm(format!(
                "provider error {status}: {body_text}"
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| MagpieError::Llm(format!("failed to parse response: {e}")))?;

        let content = response_body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                MagpieError::Llm(format!("unexpected response structure: {response_body}"))
            })?;

        Ok(content.to_string())
    }
}
