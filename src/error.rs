//! # Error Handling
//!
//! Error taxonomy for flowchart generation.
//!
//! ## Overview
//!
//! Three classes of failure exist:
//!
//! - **Input validation**: the caller sent something we cannot work with
//!   (unsupported upload content type, missing multipart field).
//! - **External call**: the model provider could not be reached, rejected the
//!   credential, or answered with a non-success status.
//! - **Response shape**: the model answered, but not with a graph. These never
//!   surface as a [`FlowError`]; the normalizer turns them into the fallback graph.
//!
//! Decode failures for uploaded images and PDFs are also represented here so the
//! image path can log them before absorbing them into the fallback graph.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = FlowError> = std::result::Result<T, E>;

/// Errors produced while generating a flowchart.
#[derive(Debug, Error)]
pub enum FlowError {
  /// No model credential was configured. Detected lazily on the first model call.
  #[error("model API key is not configured (set GROQ_API_KEY)")]
  MissingCredential,

  /// The HTTP exchange with the model provider failed.
  #[error("model request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The model provider answered with a non-success status.
  #[error("model provider returned {status}: {body}")]
  Provider {
    /// HTTP status code returned by the provider.
    status: u16,
    /// Raw response body, as text.
    body: String,
  },

  /// The provider answered successfully but without any message content.
  #[error("model response contained no message content")]
  EmptyResponse,

  /// An uploaded raster image could not be decoded or re-encoded.
  #[error("image decode failed: {0}")]
  Image(#[from] image::ImageError),

  /// The first page of an uploaded PDF could not be rasterized.
  #[error("pdf rasterization failed: {0}")]
  Pdf(String),

  /// JSON serialization or deserialization failed.
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Upload content type is neither an image type nor `application/pdf`.
  #[error("Only image and PDF files are supported (got {0})")]
  UnsupportedContentType(String),

  /// The request could not be interpreted (for example a missing multipart field).
  #[error("invalid request: {0}")]
  InvalidRequest(String),

  /// The upload could not be read from the request body.
  #[error("failed to read upload: {0}")]
  Upload(String),

  /// I/O failure, typically while binding the listener.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl FlowError {
  /// Whether the error was caused by the caller's input rather than by us or the provider.
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      FlowError::UnsupportedContentType(_) | FlowError::InvalidRequest(_)
    )
  }
}
