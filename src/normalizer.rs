//! # Model Response Normalization
//!
//! Language models wrap JSON in prose, code fences, or apologies. This module
//! lifts the embedded JSON out of whatever text came back and, when that is not
//! possible, substitutes a deterministic three-node fallback so callers always
//! have something renderable.
//!
//! Parsed JSON is returned as the model wrote it: any valid JSON passes, unknown
//! keys and key order are kept, nothing is defaulted or repaired.
//!
//! Normalization never fails. [`normalize_response`] reports *how* the flowchart
//! was obtained through [`Normalized`]; [`normalize`] just returns it.

use crate::graph::{Flowchart, Graph, GraphSource};
use crate::node_kind::NodeKind;
use serde_json::Value;
use tracing::{debug, warn};

/// Maximum number of characters of the seed kept as the fallback's middle label.
pub const FALLBACK_LABEL_CHARS: usize = 30;

/// Outcome of normalizing a model response.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
  /// The response contained valid JSON, kept exactly as produced.
  Parsed(Value),
  /// The response held no valid JSON.
  Fallback {
    /// The deterministic fallback graph.
    graph: Graph,
    /// Why parsing failed.
    reason: String,
  },
}

impl Normalized {
  /// The flowchart, whichever way it was obtained.
  pub fn into_flowchart(self) -> Flowchart {
    match self {
      Normalized::Parsed(value) => Flowchart::Model(value),
      Normalized::Fallback { graph, .. } => Flowchart::Built(graph),
    }
  }

  /// Like [`Normalized::into_flowchart`], but records the fallback reason in
  /// `metadata.diagnostic` when `diagnostics` is set.
  pub fn into_flowchart_with_diagnostics(self, diagnostics: bool) -> Flowchart {
    match self {
      Normalized::Fallback { graph, reason } if diagnostics => {
        Flowchart::Built(graph.with_diagnostic(reason))
      }
      other => other.into_flowchart(),
    }
  }

  /// Whether the fallback graph was substituted.
  pub fn is_fallback(&self) -> bool {
    matches!(self, Normalized::Fallback { .. })
  }
}

/// Slice of `raw` from the first `{` to the last `}` after it.
///
/// Returns the whole trimmed text when no such span exists.
pub fn extract_json_candidate(raw: &str) -> &str {
  let trimmed = raw.trim();
  match (trimmed.find('{'), trimmed.rfind('}')) {
    (Some(start), Some(end)) if start < end => &trimmed[start..=end],
    _ => trimmed,
  }
}

/// Extract the model's JSON, reporting whether the fallback was used.
pub fn normalize_response(raw: &str, fallback_seed: &str) -> Normalized {
  let candidate = extract_json_candidate(raw);
  match serde_json::from_str::<Value>(candidate) {
    Ok(value) => {
      debug!(
        nodes = value.get("nodes").and_then(serde_json::Value::as_array).map(Vec::len),
        "lifted json from model response"
      );
      Normalized::Parsed(value)
    }
    Err(e) => {
      warn!(error = %e, "model response is not json, using fallback");
      Normalized::Fallback {
        graph: build_fallback(fallback_seed),
        reason: format!("unparseable model response: {}", e),
      }
    }
  }
}

/// Extract the model's JSON, falling back to [`build_fallback`].
pub fn normalize(raw: &str, fallback_seed: &str) -> Flowchart {
  normalize_response(raw, fallback_seed).into_flowchart()
}

/// Deterministic `Start -> <seed> -> End` graph.
///
/// The middle label is the first 30 characters of `seed`. The metadata source is
/// always `prompt`, whichever path asked for the fallback.
pub fn build_fallback(seed: &str) -> Graph {
  let label: String = seed.chars().take(FALLBACK_LABEL_CHARS).collect();

  let mut graph = Graph::new(GraphSource::Prompt);
  let start = graph.push_node("Start", NodeKind::Start);
  let middle = graph.push_node(label, NodeKind::Process);
  let end = graph.push_node("End", NodeKind::End);
  graph.push_edge(start, middle.clone());
  graph.push_edge(middle, end);
  graph
}
