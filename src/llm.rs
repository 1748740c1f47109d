//! # Chat Model Client
//!
//! Strongly typed records for an OpenAI-compatible chat-completions endpoint and
//! the [`ChatModel`] seam the generation services call through.
//!
//! Outgoing requests are built from typed records and serialized by serde.
//! Incoming message content is handed back as an opaque string; turning it into
//! a graph is the normalizer's job.
//!
//! ## Example
//!
//! ```rust,no_run
//! use flowweave::config::ServiceConfig;
//! use flowweave::llm::{ChatMessage, ChatModel, ChatRequest, GroqClient};
//!
//! # async fn run() -> flowweave::Result<()> {
//! let client = GroqClient::new(&ServiceConfig::from_env())?;
//! let request = ChatRequest::new(
//!   "llama-3.3-70b-versatile",
//!   vec![ChatMessage::user("Say hi")],
//!   0.7,
//!   2000,
//! );
//! let text = client.complete(&request).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::ServiceConfig;
use crate::error::{FlowError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// Instructions that steer the model.
  System,
  /// The end user's turn.
  User,
  /// A previous model turn.
  Assistant,
}

/// Image reference inside a multimodal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
  /// `https://` or `data:` URL.
  pub url: String,
}

/// One part of a multimodal message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
  /// Plain text.
  Text {
    /// The text.
    text: String,
  },
  /// An image.
  ImageUrl {
    /// Where to find the image.
    image_url: ImageUrl,
  },
}

/// Message body: plain text or a list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
  /// Plain text.
  Text(String),
  /// Multimodal parts.
  Parts(Vec<ContentPart>),
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
  /// Author.
  pub role: Role,
  /// Body.
  pub content: MessageContent,
}

impl ChatMessage {
  /// A system message.
  pub fn system(text: impl Into<String>) -> Self {
    Self {
      role: Role::System,
      content: MessageContent::Text(text.into()),
    }
  }

  /// A plain-text user message.
  pub fn user(text: impl Into<String>) -> Self {
    Self {
      role: Role::User,
      content: MessageContent::Text(text.into()),
    }
  }

  /// A user message made of parts.
  pub fn user_parts(parts: Vec<ContentPart>) -> Self {
    Self {
      role: Role::User,
      content: MessageContent::Parts(parts),
    }
  }
}

/// A chat-completions request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
  /// Model identifier.
  pub model: String,
  /// Conversation, system message first.
  pub messages: Vec<ChatMessage>,
  /// Sampling temperature.
  pub temperature: f32,
  /// Response length cap in tokens.
  pub max_tokens: u32,
}

impl ChatRequest {
  /// Build a request.
  pub fn new(
    model: impl Into<String>,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
  ) -> Self {
    Self {
      model: model.into(),
      messages,
      temperature,
      max_tokens,
    }
  }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
  #[serde(default)]
  content: Option<String>,
}

/// Anything that can answer a chat request with text.
///
/// Implementations hold only immutable configuration and may be called
/// concurrently from many requests.
#[async_trait]
pub trait ChatModel: Send + Sync {
  /// Send `request` and return the first choice's message content, trimmed.
  async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// Chat-completions client for Groq's OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct GroqClient {
  http: reqwest::Client,
  endpoint: String,
  api_key: Option<String>,
}

impl GroqClient {
  /// Build a client from configuration.
  ///
  /// A missing API key is not an error here; it is reported by the first
  /// [`ChatModel::complete`] call.
  pub fn new(config: &ServiceConfig) -> Result<Self> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout {
      builder = builder.timeout(timeout);
    }
    Ok(Self {
      http: builder.build()?,
      endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
      api_key: config.api_key.clone(),
    })
  }

  /// Full URL requests are posted to.
  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }
}

#[async_trait]
impl ChatModel for GroqClient {
  async fn complete(&self, request: &ChatRequest) -> Result<String> {
    let api_key = self.api_key.as_deref().ok_or(FlowError::MissingCredential)?;
    trace!(model = %request.model, endpoint = %self.endpoint, "sending chat request");

    let response = self
      .http
      .post(&self.endpoint)
      .bearer_auth(api_key)
      .json(request)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(FlowError::Provider {
        status: status.as_u16(),
        body,
      });
    }

    let parsed: ChatResponse = response.json().await?;
    let content = parsed
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .ok_or(FlowError::EmptyResponse)?;

    debug!(model = %request.model, chars = content.len(), "chat response received");
    Ok(content.trim().to_string())
  }
}
