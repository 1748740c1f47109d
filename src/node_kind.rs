//! Semantic node kinds and keyword-based label classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind of a flowchart node, derived from its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
  /// Entry point of the flow.
  Start,
  /// Terminal point of the flow.
  End,
  /// A branching question.
  Decision,
  /// An action step.
  Process,
  /// Anything else.
  #[default]
  Default,
}

// Checked in order; first match wins.
const KEYWORDS: &[(NodeKind, &[&str])] = &[
  (NodeKind::Start, &["start", "begin"]),
  (NodeKind::End, &["end", "finish", "stop"]),
  (NodeKind::Decision, &["if", "decision", "check", "?"]),
  (NodeKind::Process, &["process", "do", "execute"]),
];

impl NodeKind {
  /// Lowercase name of the kind.
  pub fn as_str(&self) -> &'static str {
    match self {
      NodeKind::Start => "start",
      NodeKind::End => "end",
      NodeKind::Decision => "decision",
      NodeKind::Process => "process",
      NodeKind::Default => "default",
    }
  }

  /// Parse a kind name. Unknown names map to [`NodeKind::Default`].
  pub fn from_name(name: &str) -> Self {
    match name.trim().to_ascii_lowercase().as_str() {
      "start" => NodeKind::Start,
      "end" => NodeKind::End,
      "decision" => NodeKind::Decision,
      "process" => NodeKind::Process,
      _ => NodeKind::Default,
    }
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Classify a label by case-insensitive substring match against fixed keyword sets.
///
/// Keywords match anywhere in the label, so `"Endpoint"` is an end node and
/// `"Download"` is a process node. Precedence is start, end, decision, process.
///
/// ```
/// use flowweave::node_kind::{classify, NodeKind};
///
/// assert_eq!(classify("Start Decision?"), NodeKind::Start);
/// assert_eq!(classify("Is it valid?"), NodeKind::Decision);
/// ```
pub fn classify(label: &str) -> NodeKind {
  let lowered = label.to_lowercase();
  KEYWORDS
    .iter()
    .find(|(_, words)| words.iter().any(|word| lowered.contains(word)))
    .map(|(kind, _)| *kind)
    .unwrap_or_default()
}
