//! Deterministic conversion of arrow-delimited text into a flowchart graph.
//!
//! Each non-blank line is a chain of labels joined by `->`:
//!
//! ```text
//! Start -> Check input? -> Process data -> End
//! Check input? -> Stop
//! ```
//!
//! Labels are deduplicated across the whole document, so `Check input?` above is
//! a single node with two outgoing edges.

use crate::graph::{Graph, GraphSource};
use crate::node_kind::classify;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static ARROW: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\s*->\s*").expect("arrow pattern is valid"));

/// Split one trimmed line into its segments. Empty segments are kept so adjacent
/// pairing sees them.
fn segments(line: &str) -> Vec<&str> {
  ARROW.split(line).collect()
}

/// Parse arrow-delimited text into a graph with `metadata.source == "text"`.
///
/// Blank lines are ignored. A line without arrows contributes one node and no
/// edges. Empty segments (`a->->b`) create no node and break the edge chain
/// around them.
pub fn parse(text: &str) -> Graph {
  let mut graph = Graph::new(GraphSource::Text);
  let mut ids: HashMap<String, String> = HashMap::new();

  for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
    let parts = segments(line);

    for part in parts.iter().filter(|part| !part.is_empty()) {
      if !ids.contains_key(*part) {
        let id = graph.push_node(*part, classify(part));
        ids.insert(part.to_string(), id);
      }
    }

    for pair in parts.windows(2) {
      let (from, to) = (pair[0], pair[1]);
      if from.is_empty() || to.is_empty() {
        continue;
      }
      if let (Some(source), Some(target)) = (ids.get(from), ids.get(to)) {
        let (source, target) = (source.clone(), target.clone());
        graph.push_edge(source, target);
      }
    }
  }

  debug!(
    nodes = graph.nodes.len(),
    edges = graph.edges.len(),
    "parsed text flowchart"
  );
  graph
}
