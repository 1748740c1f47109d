//! # HTTP API
//!
//! Axum router exposing the three generation paths.
//!
//! | route | body | result |
//! |---|---|---|
//! | `GET /` | none | liveness payload |
//! | `POST /generate/text` | `{"text": "..."}` | [`Graph`] from the arrow parser |
//! | `POST /generate/prompt` | `{"prompt": "..."}` | [`Flowchart`] from the text model |
//! | `POST /generate/image` | multipart field `file` | [`Flowchart`] from the vision model |
//!
//! Errors are JSON `{"detail": <message>, "status": <code>}`. Unsupported upload
//! types are 400, a missing `file` field is 422, everything else is 500. Bodies
//! axum cannot read as JSON keep axum's status (400, 415, 422) in the same shape. The image
//! route only fails before the upload reaches the service; once there, failures
//! become the fallback graph.
//!
//! CORS allows any origin, method, and header.

use crate::config::ServiceConfig;
use crate::error::{FlowError, Result};
use crate::graph::{Flowchart, Graph};
use crate::image_service::ImageGraphService;
use crate::llm::{ChatModel, GroqClient};
use crate::prompt_service::PromptGraphService;
use crate::text_parser;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Name reported by the liveness endpoint.
pub const SERVICE_NAME: &str = "AI Flowchart Maker API";

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

/// Body of `POST /generate/text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextInput {
  /// Arrow-delimited lines.
  pub text: String,
}

/// Body of `POST /generate/prompt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptInput {
  /// Natural-language description.
  pub prompt: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liveness {
  /// Service name.
  pub message: String,
  /// Always `running`.
  pub status: String,
}

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
  /// Startup configuration.
  pub config: Arc<ServiceConfig>,
  /// Prompt path.
  pub prompt: PromptGraphService,
  /// Image path.
  pub image: ImageGraphService,
}

impl AppState {
  /// Wire services around an explicit model client.
  pub fn new(config: ServiceConfig, model: Arc<dyn ChatModel>) -> Self {
    let prompt = PromptGraphService::new(model.clone(), config.text_model.clone())
      .with_diagnostics(config.expose_diagnostics);
    let image = ImageGraphService::new(model, config.vision_model.clone())
      .with_diagnostics(config.expose_diagnostics);
    Self {
      config: Arc::new(config),
      prompt,
      image,
    }
  }

  /// Wire services around a [`GroqClient`] built from `config`.
  pub fn from_config(config: ServiceConfig) -> Result<Self> {
    let client = GroqClient::new(&config)?;
    Ok(Self::new(config, Arc::new(client)))
  }
}

/// Error response: a status code and a message.
#[derive(Debug)]
pub struct ApiError {
  status: StatusCode,
  message: String,
}

impl ApiError {
  /// HTTP status of the response.
  pub fn status(&self) -> StatusCode {
    self.status
  }

  /// Human-readable detail.
  pub fn message(&self) -> &str {
    &self.message
  }
}

impl From<FlowError> for ApiError {
  fn from(e: FlowError) -> Self {
    let status = match &e {
      FlowError::UnsupportedContentType(_) => StatusCode::BAD_REQUEST,
      FlowError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Self {
      status,
      message: e.to_string(),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self {
      status: rejection.status(),
      message: rejection.body_text(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let body = serde_json::json!({
      "detail": self.message,
      "status": self.status.as_u16(),
    });
    (self.status, Json(body)).into_response()
  }
}

/// Log a failed request and convert it for the response.
fn reject(endpoint: &'static str, e: FlowError) -> ApiError {
  if e.is_client_error() {
    warn!(endpoint, error = %e, "rejected request");
  } else {
    error!(endpoint, error = %e, details = ?e, "request failed");
  }
  ApiError::from(e)
}

/// Log an unreadable JSON body and convert it for the response.
fn reject_body(endpoint: &'static str, rejection: JsonRejection) -> ApiError {
  let e = ApiError::from(rejection);
  warn!(endpoint, status = e.status.as_u16(), error = %e.message, "rejected body");
  e
}

async fn root() -> Json<Liveness> {
  Json(Liveness {
    message: SERVICE_NAME.to_string(),
    status: "running".to_string(),
  })
}

async fn generate_from_text(
  payload: std::result::Result<Json<TextInput>, JsonRejection>,
) -> std::result::Result<Json<Graph>, ApiError> {
  let Json(input) = payload.map_err(|e| reject_body("generate/text", e))?;
  Ok(Json(text_parser::parse(&input.text)))
}

async fn generate_from_prompt(
  State(state): State<AppState>,
  payload: std::result::Result<Json<PromptInput>, JsonRejection>,
) -> std::result::Result<Json<Flowchart>, ApiError> {
  let Json(input) = payload.map_err(|e| reject_body("generate/prompt", e))?;
  state
    .prompt
    .generate(&input.prompt)
    .await
    .map(Json)
    .map_err(|e| reject("generate/prompt", e))
}

/// A file read from the multipart body.
#[derive(Debug)]
struct Upload {
  filename: String,
  content_type: Option<String>,
  bytes: Bytes,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| FlowError::Upload(e.to_string()))?
  {
    if field.name() != Some(UPLOAD_FIELD) {
      continue;
    }
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
      .bytes()
      .await
      .map_err(|e| FlowError::Upload(e.to_string()))?;
    return Ok(Upload {
      filename,
      content_type,
      bytes,
    });
  }
  Err(FlowError::InvalidRequest(format!(
    "missing multipart field `{}`",
    UPLOAD_FIELD
  )))
}

/// Accept `image/*` and `application/pdf`; reject everything else, including a
/// missing content type.
pub fn check_upload_content_type(content_type: Option<&str>) -> Result<()> {
  let accepted = content_type
    .and_then(|raw| raw.parse::<mime::Mime>().ok())
    .is_some_and(|m| {
      m.type_() == mime::IMAGE || m.essence_str() == mime::APPLICATION_PDF.essence_str()
    });
  if accepted {
    Ok(())
  } else {
    Err(FlowError::UnsupportedContentType(
      content_type.unwrap_or("none").to_string(),
    ))
  }
}

async fn generate_from_image(
  State(state): State<AppState>,
  mut multipart: Multipart,
) -> std::result::Result<Json<Flowchart>, ApiError> {
  let upload = read_upload(&mut multipart)
    .await
    .map_err(|e| reject("generate/image", e))?;
  check_upload_content_type(upload.content_type.as_deref())
    .map_err(|e| reject("generate/image", e))?;

  info!(
    filename = %upload.filename,
    bytes = upload.bytes.len(),
    "image upload received"
  );
  Ok(Json(state.image.generate(&upload.bytes, &upload.filename).await))
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any);

  Router::new()
    .route("/", get(root))
    .route("/generate/text", post(generate_from_text))
    .route("/generate/prompt", post(generate_from_prompt))
    .route("/generate/image", post(generate_from_image))
    .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!("shutdown signal received");
}

/// Bind `config.bind_addr` and serve until Ctrl-C.
pub async fn serve(config: ServiceConfig) -> Result<()> {
  let state = AppState::from_config(config)?;
  let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
  info!(addr = %listener.local_addr()?, "flowchart API listening");

  axum::serve(listener, router(state))
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}
