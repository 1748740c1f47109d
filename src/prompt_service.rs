//! Flowchart generation from a natural-language prompt.

use crate::error::Result;
use crate::graph::Flowchart;
use crate::llm::{ChatMessage, ChatModel, ChatRequest};
use crate::normalizer::normalize_response;
use std::sync::Arc;
use tracing::{info, instrument};

/// Sampling temperature for prompt generation.
pub const PROMPT_TEMPERATURE: f32 = 0.7;
/// Response length cap for prompt generation.
pub const PROMPT_MAX_TOKENS: u32 = 2000;

/// System instruction: the exact target schema plus the colour legend.
pub const PROMPT_SYSTEM_INSTRUCTION: &str = r##"You are a flowchart generation expert. Convert user descriptions into structured flowchart data.
Return ONLY valid JSON with this exact structure:
{
  "nodes": [{"id": "node_0", "type": "default", "data": {"label": "Start"}, "position": {"x": 250, "y": 0}, "style": {"background": "#4ade80", "color": "white", "border": "2px solid #22c55e"}}],
  "edges": [{"id": "edge_0", "source": "node_0", "target": "node_1", "animated": true}],
  "metadata": {"source": "prompt", "node_count": 3}
}

Node style colors:
- Start/End: green (#4ade80)
- Process: blue (#60a5fa)
- Decision: yellow (#fbbf24)
- Default: gray (#94a3b8)"##;

/// The user turn sent for `prompt`.
pub fn user_instruction(prompt: &str) -> String {
  format!("Create a flowchart for: {}", prompt)
}

/// Generates graphs from free-form prompts with one model call each.
#[derive(Clone)]
pub struct PromptGraphService {
  model: Arc<dyn ChatModel>,
  model_name: String,
  diagnostics: bool,
}

impl PromptGraphService {
  /// Create a service calling `model_name` through `model`.
  pub fn new(model: Arc<dyn ChatModel>, model_name: impl Into<String>) -> Self {
    Self {
      model,
      model_name: model_name.into(),
      diagnostics: false,
    }
  }

  /// Record fallback reasons in `metadata.diagnostic`.
  pub fn with_diagnostics(mut self, enabled: bool) -> Self {
    self.diagnostics = enabled;
    self
  }

  /// The request sent for `prompt`.
  pub fn build_request(&self, prompt: &str) -> ChatRequest {
    ChatRequest::new(
      self.model_name.clone(),
      vec![
        ChatMessage::system(PROMPT_SYSTEM_INSTRUCTION),
        ChatMessage::user(user_instruction(prompt)),
      ],
      PROMPT_TEMPERATURE,
      PROMPT_MAX_TOKENS,
    )
  }

  /// Ask the model for a flowchart of `prompt`.
  ///
  /// Transport and credential failures are returned unchanged and not retried.
  /// JSON in the reply is returned untouched; a reply without valid JSON becomes
  /// the fallback graph seeded with `prompt`.
  #[instrument(
    level = "debug",
    skip(self, prompt),
    fields(model = %self.model_name, prompt_chars = prompt.chars().count())
  )]
  pub async fn generate(&self, prompt: &str) -> Result<Flowchart> {
    let request = self.build_request(prompt);
    let raw = self.model.complete(&request).await?;
    let normalized = normalize_response(&raw, prompt);
    info!(fallback = normalized.is_fallback(), "prompt flowchart generated");
    Ok(normalized.into_flowchart_with_diagnostics(self.diagnostics))
  }
}
