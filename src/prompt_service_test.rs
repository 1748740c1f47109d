//! # Prompt Service Test Suite
//!
//! Request construction, normalization of the reply, and error propagation.
//! The model is a [`ScriptedModel`].

use crate::error::FlowError;
use crate::graph::GraphSource;
use crate::llm::{MessageContent, Role};
use crate::prompt_service::{
  PROMPT_MAX_TOKENS, PROMPT_SYSTEM_INSTRUCTION, PROMPT_TEMPERATURE, PromptGraphService,
};
use crate::test_support::{
  CapturedLogs, DECORATED_MODEL_GRAPH, Reply, ScriptedModel, WRAPPED_GRAPH_REPLY,
};
use serde_json::Value;
use std::sync::Arc;

fn service(model: &Arc<ScriptedModel>) -> PromptGraphService {
  PromptGraphService::new(model.clone(), "text-model")
}

#[tokio::test]
async fn test_request_shape() {
  let model = Arc::new(ScriptedModel::replying(WRAPPED_GRAPH_REPLY));

  service(&model).generate("user signup").await.unwrap();

  let request = model.last_request();
  assert_eq!(request.model, "text-model");
  assert_eq!(request.temperature, PROMPT_TEMPERATURE);
  assert_eq!(request.max_tokens, PROMPT_MAX_TOKENS);
  assert_eq!(request.messages.len(), 2);
  assert_eq!(request.messages[0].role, Role::System);
  assert_eq!(
    request.messages[0].content,
    MessageContent::Text(PROMPT_SYSTEM_INSTRUCTION.to_string())
  );
  assert_eq!(request.messages[1].role, Role::User);
  assert_eq!(
    request.messages[1].content,
    MessageContent::Text("Create a flowchart for: user signup".to_string())
  );
}

#[test]
fn test_system_instruction_carries_schema_and_legend() {
  assert!(PROMPT_SYSTEM_INSTRUCTION.contains("\"metadata\": {\"source\": \"prompt\""));
  for colour in ["#4ade80", "#60a5fa", "#fbbf24", "#94a3b8"] {
    assert!(PROMPT_SYSTEM_INSTRUCTION.contains(colour), "{colour}");
  }
}

#[tokio::test]
async fn test_graph_reply_is_returned() {
  let model = Arc::new(ScriptedModel::replying(WRAPPED_GRAPH_REPLY));

  let flowchart = service(&model).generate("login").await.unwrap();

  assert!(flowchart.is_model_output());
  assert_eq!(flowchart.labels(), vec!["Login", "Dashboard"]);
  assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_model_json_reaches_caller_verbatim() {
  let model = Arc::new(ScriptedModel::replying(format!(
    "Here you go:\n{}",
    DECORATED_MODEL_GRAPH
  )));

  let flowchart = service(&model).generate("stock check").await.unwrap();

  assert_eq!(
    serde_json::to_value(&flowchart).unwrap(),
    serde_json::from_str::<Value>(DECORATED_MODEL_GRAPH).unwrap()
  );
}

#[tokio::test]
async fn test_span_counts_prompt_characters() {
  let logs = CapturedLogs::default();
  let _guard = logs.install();
  let model = Arc::new(ScriptedModel::replying(WRAPPED_GRAPH_REPLY));

  service(&model).generate("café ✓").await.unwrap();

  let output = logs.contents();
  assert!(output.contains("prompt_chars=6"), "{output}");
}

#[tokio::test]
async fn test_prose_reply_falls_back_to_prompt_seed() {
  let model = Arc::new(ScriptedModel::replying("I cannot draw that, sorry."));
  let prompt = "A very long description of an approval process with many steps";

  let flowchart = service(&model).generate(prompt).await.unwrap();

  assert_eq!(flowchart.labels(), vec!["Start", &prompt[..30], "End"]);
  assert_eq!(flowchart.as_graph().unwrap().metadata.source, GraphSource::Prompt);
  assert!(flowchart.diagnostic().is_none());
}

#[tokio::test]
async fn test_diagnostics_flag_annotates_fallback() {
  let model = Arc::new(ScriptedModel::replying("nope"));

  let flowchart = service(&model)
    .with_diagnostics(true)
    .generate("x")
    .await
    .unwrap();

  assert!(flowchart.diagnostic().is_some());
}

#[tokio::test]
async fn test_model_errors_propagate_without_retry() {
  let model = Arc::new(ScriptedModel::new(Reply::Provider(429)));

  let err = service(&model).generate("x").await.unwrap_err();

  assert!(matches!(err, FlowError::Provider { status: 429, .. }));
  assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_missing_credential_propagates() {
  let model = Arc::new(ScriptedModel::new(Reply::MissingCredential));

  let err = service(&model).generate("x").await.unwrap_err();

  assert!(matches!(err, FlowError::MissingCredential));
}
