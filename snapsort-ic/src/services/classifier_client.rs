//! Remote image classifier client
//!
//! Sends one chat completion request (system instruction + image data URI) to
//! an OpenAI-compatible endpoint and runs the reply through the response
//! extractor. No retries happen here; see [`crate::services::retry_orchestrator`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snapsort_common::config::{DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_TIMEOUT_SECS};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::models::UploadedImage;
use crate::services::image_encoder::to_data_uri;
use crate::services::response_extractor::{extract_json, MalformedResponse};

const USER_AGENT: &str = concat!("SnapSort/", env!("CARGO_PKG_VERSION"));

/// Instruction sent as the system message of every request
pub const CLASSIFICATION_PROMPT: &str = r#"You are an assistant that works out why a user saved an image.
Analyze the content of the attached picture and classify the reason the user saved it.
There are exactly 4 classes: Shopping, Document, Music, Other.
Pick one of the 4 classes using the examples below and return the result in JSON format: {"className":"<class>"}
--------------
Examples:
If the picture contains product information such as clothes or cosmetics, classify it as 'Shopping'.
If the picture contains text such as a blog post or a passage from a book, classify it as 'Document'.
If the picture contains information about music the user was listening to, classify it as 'Music'.
If it is hard to choose between 'Shopping', 'Document' and 'Music', classify it as 'Other'.
"#;

/// Classifier client errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Classifier returned no message content")]
    EmptyResponse,

    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
}

/// Anything that can label an image with an untyped JSON record
///
/// The record is not trusted yet; callers validate it.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Identifier used in logs (e.g. "openai")
    fn source_id(&self) -> &'static str;

    async fn classify(&self, image: &UploadedImage) -> Result<Value, ClassifierError>;
}

/// Connection settings for [`OpenAiClassifier`]
#[derive(Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    /// Base URL up to and including the version segment, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub model: String,
    /// Per-attempt request timeout
    pub timeout: Duration,
}

impl ClassifierConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keeps the key out of logs
impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_key", &format_args!("<{} chars>", self.api_key.len()))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum ChatMessage<'a> {
    System { content: &'a str },
    User { content: Vec<ContentPart> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Classifier backed by an OpenAI-compatible chat completion endpoint
pub struct OpenAiClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
            model: config.model,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request<'a>(&'a self, image: &UploadedImage) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage::System {
                    content: CLASSIFICATION_PROMPT,
                },
                ChatMessage::User {
                    content: vec![ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: to_data_uri(&image.media_type, &image.bytes),
                        },
                    }],
                },
            ],
        }
    }
}

#[async_trait]
impl ImageClassifier for OpenAiClassifier {
    fn source_id(&self) -> &'static str {
        "openai"
    }

    async fn classify(&self, image: &UploadedImage) -> Result<Value, ClassifierError> {
        let request = self.build_request(image);

        tracing::debug!(
            model = %self.model,
            media_type = %image.media_type,
            size_bytes = image.len(),
            "Querying classifier"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            return Err(ClassifierError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::ApiError(status.as_u16(), error_text));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::ParseError(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ClassifierError::EmptyResponse)?;

        tracing::debug!(content_len = content.len(), "Classifier replied");

        Ok(extract_json(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OpenAiClassifier::new(ClassifierConfig::new("test_key"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let client = OpenAiClassifier::new(
            ClassifierConfig::new("test_key").with_base_url("http://localhost:8080/v1/"),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_request_shape() {
        let client =
            OpenAiClassifier::new(ClassifierConfig::new("test_key").with_model("gpt-4o-mini"))
                .unwrap();
        let image = UploadedImage::new(&b"hello"[..], "image/png");

        let body = serde_json::to_value(client.build_request(&image)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], CLASSIFICATION_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"][0]["type"], "image_url");
        assert_eq!(
            body["messages"][1]["content"][0]["image_url"]["url"],
            "data:image/png;base64,aGVsbG8="
        );
    }

    #[test]
    fn test_prompt_names_taxonomy_and_shape() {
        for label in snapsort_common::ClassName::ALL {
            assert!(CLASSIFICATION_PROMPT.contains(label.as_str()));
        }
        assert!(CLASSIFICATION_PROMPT.contains(r#"{"className":"<class>"}"#));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClassifierConfig::new("sk-secret-value");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret-value"));
        assert!(printed.contains("<15 chars>"));
    }

    #[test]
    fn test_completion_parsing() {
        let completion: ChatCompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{\"className\":\"Music\"}"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            completion.choices[0].message.content.as_deref(),
            Some(r#"{"className":"Music"}"#)
        );
    }
}
