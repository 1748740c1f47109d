//! # Service Configuration
//!
//! Process-wide, immutable configuration. Built once at startup from defaults
//! and the environment, then shared by reference with every service.
//!
//! | variable | field | default |
//! |---|---|---|
//! | `GROQ_API_KEY` | `api_key` | unset |
//! | `FLOWWEAVE_BIND_ADDR` | `bind_addr` | `0.0.0.0:8000` |
//! | `FLOWWEAVE_API_BASE` | `api_base` | `https://api.groq.com/openai/v1` |
//! | `FLOWWEAVE_TEXT_MODEL` | `text_model` | `llama-3.3-70b-versatile` |
//! | `FLOWWEAVE_VISION_MODEL` | `vision_model` | `llama-3.2-11b-vision-preview` |
//! | `FLOWWEAVE_REQUEST_TIMEOUT_SECS` | `request_timeout` | unset |
//! | `FLOWWEAVE_MAX_UPLOAD_BYTES` | `max_upload_bytes` | 20 MiB |
//! | `FLOWWEAVE_EXPOSE_DIAGNOSTICS` | `expose_diagnostics` | `false` |
//!
//! The API key is not validated here. Model-backed endpoints fail on first use
//! when it is missing.

use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Environment variable holding the model API credential.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Configuration for the flowchart service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
  /// Model API credential.
  pub api_key: Option<String>,
  /// Address the HTTP server listens on.
  pub bind_addr: String,
  /// Base URL of the OpenAI-compatible API, without the trailing path.
  pub api_base: String,
  /// Model used for prompt generation.
  pub text_model: String,
  /// Vision-capable model used for image generation.
  pub vision_model: String,
  /// Timeout for model requests. `None` leaves it to the HTTP client.
  pub request_timeout: Option<Duration>,
  /// Largest accepted request body.
  pub max_upload_bytes: usize,
  /// Record the fallback reason in `metadata.diagnostic`.
  pub expose_diagnostics: bool,
}

impl Default for ServiceConfig {
  fn default() -> Self {
    Self {
      api_key: None,
      bind_addr: "0.0.0.0:8000".to_string(),
      api_base: "https://api.groq.com/openai/v1".to_string(),
      text_model: "llama-3.3-70b-versatile".to_string(),
      vision_model: "llama-3.2-11b-vision-preview".to_string(),
      request_timeout: None,
      max_upload_bytes: 20 * 1024 * 1024,
      expose_diagnostics: false,
    }
  }
}

impl ServiceConfig {
  /// Defaults overridden by the process environment.
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Defaults overridden by `lookup`, which maps variable names to values.
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Self::default();
    let text = |key: &str, default: String| {
      lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
    };

    Self {
      api_key: lookup(API_KEY_ENV)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()),
      bind_addr: text("FLOWWEAVE_BIND_ADDR", defaults.bind_addr),
      api_base: text("FLOWWEAVE_API_BASE", defaults.api_base),
      text_model: text("FLOWWEAVE_TEXT_MODEL", defaults.text_model),
      vision_model: text("FLOWWEAVE_VISION_MODEL", defaults.vision_model),
      request_timeout: parse_var::<u64, _>(&lookup, "FLOWWEAVE_REQUEST_TIMEOUT_SECS")
        .map(Duration::from_secs)
        .or(defaults.request_timeout),
      max_upload_bytes: parse_var(&lookup, "FLOWWEAVE_MAX_UPLOAD_BYTES")
        .unwrap_or(defaults.max_upload_bytes),
      expose_diagnostics: parse_var(&lookup, "FLOWWEAVE_EXPOSE_DIAGNOSTICS")
        .unwrap_or(defaults.expose_diagnostics),
    }
  }

  /// Set the API key.
  pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
    self.api_key = Some(key.into());
    self
  }

  /// Set the listen address.
  pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
    self.bind_addr = addr.into();
    self
  }

  /// Set the API base URL.
  pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
    self.api_base = base.into();
    self
  }

  /// Set the model request timeout.
  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout = Some(timeout);
    self
  }

  /// Set the request body limit.
  pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
    self.max_upload_bytes = bytes;
    self
  }

  /// Enable or disable fallback diagnostics.
  pub fn with_diagnostics(mut self, enabled: bool) -> Self {
    self.expose_diagnostics = enabled;
    self
  }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
  T: FromStr,
  F: Fn(&str) -> Option<String>,
{
  let raw = lookup(key)?;
  match raw.trim().parse() {
    Ok(value) => Some(value),
    Err(_) => {
      warn!(variable = key, value = %raw, "ignoring unparseable configuration value");
      None
    }
  }
}
