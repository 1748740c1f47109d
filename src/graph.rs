//! # Flowchart Graph Model
//!
//! The node/edge/metadata structure returned by every generation path. The serde
//! shape is the wire contract consumed by the drawing component on the client:
//!
//! ```json
//! {
//!   "nodes": [{"id": "node_0", "type": "default", "data": {"label": "Start"},
//!              "position": {"x": 250, "y": 0},
//!              "style": {"background": "#4ade80", "color": "white",
//!                        "border": "2px solid #22c55e", "padding": "10px",
//!                        "borderRadius": "8px"}}],
//!   "edges": [{"id": "edge_0", "source": "node_0", "target": "node_1", "animated": true}],
//!   "metadata": {"source": "text", "node_count": 1}
//! }
//! ```
//!
//! Graphs built locally (text parser, fallback) are constructed through
//! [`Graph::push_node`] and [`Graph::push_edge`], which keep ids sequential and
//! `metadata.node_count` in step with `nodes`. Deserializing a [`Graph`] is
//! lenient: cosmetic fields (`type`, `position`, `style`, `animated`) may be
//! omitted, structural fields (`id`, `data.label`, `source`, `target`,
//! `metadata`) may not.
//!
//! Model output is never forced through [`Graph`]. It travels as
//! [`Flowchart::Model`], the JSON exactly as the model wrote it, so keys this
//! crate does not model (edge labels, handles, node sizes) reach the client.

use crate::node_kind::NodeKind;
use crate::style::style_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Horizontal position shared by every locally laid-out node.
pub const LAYOUT_X: i64 = 250;
/// Vertical distance between consecutive locally laid-out nodes.
pub const LAYOUT_STEP_Y: i64 = 100;

const NODE_TYPE: &str = "default";

fn default_node_type() -> String {
  NODE_TYPE.to_string()
}

/// Which generation path produced a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphSource {
  /// Arrow-delimited text.
  Text,
  /// Free-form natural-language prompt.
  Prompt,
  /// Uploaded image or PDF.
  Image,
}

impl fmt::Display for GraphSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      GraphSource::Text => "text",
      GraphSource::Prompt => "prompt",
      GraphSource::Image => "image",
    };
    f.write_str(name)
  }
}

/// Visual style attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StyleRecord {
  /// Fill colour.
  #[serde(default)]
  pub background: String,
  /// Text colour.
  #[serde(default)]
  pub color: String,
  /// CSS border shorthand.
  #[serde(default)]
  pub border: String,
  /// CSS padding.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub padding: Option<String>,
  /// CSS border radius.
  #[serde(
    default,
    rename = "borderRadius",
    skip_serializing_if = "Option::is_none"
  )]
  pub border_radius: Option<String>,
}

/// Node payload rendered inside the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
  /// Display label.
  pub label: String,
}

/// 2-D point on the layout grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Position {
  /// Horizontal coordinate.
  pub x: i64,
  /// Vertical coordinate.
  pub y: i64,
}

/// A flowchart node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
  /// Unique id within the graph.
  pub id: String,
  /// Renderer node type. Always `"default"` for locally built graphs.
  #[serde(rename = "type", default = "default_node_type")]
  pub node_type: String,
  /// Label payload.
  pub data: NodeData,
  /// Layout position.
  #[serde(default)]
  pub position: Position,
  /// Visual style.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub style: Option<StyleRecord>,
}

impl Node {
  /// Build a node styled for `kind`.
  pub fn new(
    id: impl Into<String>,
    label: impl Into<String>,
    position: Position,
    kind: NodeKind,
  ) -> Self {
    Self {
      id: id.into(),
      node_type: default_node_type(),
      data: NodeData {
        label: label.into(),
      },
      position,
      style: Some(style_for(kind)),
    }
  }

  /// The node's label.
  pub fn label(&self) -> &str {
    &self.data.label
  }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
  /// Unique id within the graph.
  pub id: String,
  /// Id of the node the edge leaves.
  pub source: String,
  /// Id of the node the edge enters.
  pub target: String,
  /// Whether the renderer animates the edge.
  #[serde(default)]
  pub animated: bool,
}

/// Provenance information attached to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
  /// Generation path.
  pub source: GraphSource,
  /// Number of nodes in the graph.
  pub node_count: usize,
  /// Why a fallback graph was produced. Only set when diagnostics are enabled.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub diagnostic: Option<String>,
}

/// A complete flowchart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
  /// Nodes in creation order.
  pub nodes: Vec<Node>,
  /// Edges in creation order.
  pub edges: Vec<Edge>,
  /// Provenance.
  pub metadata: GraphMetadata,
}

impl Graph {
  /// Create an empty graph for the given source.
  pub fn new(source: GraphSource) -> Self {
    Self {
      nodes: Vec::new(),
      edges: Vec::new(),
      metadata: GraphMetadata {
        source,
        node_count: 0,
        diagnostic: None,
      },
    }
  }

  /// Append a node on the vertical layout grid and return its id.
  ///
  /// The id is `node_<n>` and the node is placed at `(250, 100 * n)`, where `n`
  /// is the number of nodes already in the graph.
  pub fn push_node(&mut self, label: impl Into<String>, kind: NodeKind) -> String {
    let index = self.nodes.len();
    let id = format!("node_{}", index);
    let position = Position {
      x: LAYOUT_X,
      y: LAYOUT_STEP_Y * index as i64,
    };
    self.nodes.push(Node::new(id.clone(), label, position, kind));
    self.metadata.node_count = self.nodes.len();
    id
  }

  /// Append an animated edge `edge_<n>` between two node ids and return its id.
  pub fn push_edge(&mut self, source: impl Into<String>, target: impl Into<String>) -> String {
    let id = format!("edge_{}", self.edges.len());
    self.edges.push(Edge {
      id: id.clone(),
      source: source.into(),
      target: target.into(),
      animated: true,
    });
    id
  }

  /// Look up a node by id.
  pub fn node(&self, id: &str) -> Option<&Node> {
    self.nodes.iter().find(|node| node.id == id)
  }

  /// Labels in node order.
  pub fn labels(&self) -> Vec<&str> {
    self.nodes.iter().map(Node::label).collect()
  }

  /// Attach a diagnostic message to the metadata.
  pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
    self.metadata.diagnostic = Some(diagnostic.into());
    self
  }

  /// Check the structural invariants: unique node and edge ids, edges referencing
  /// existing nodes, and `node_count` matching the node list.
  ///
  /// Graphs lifted from model output are returned as-is and may not satisfy this.
  pub fn is_consistent(&self) -> bool {
    let mut node_ids = HashSet::new();
    if !self.nodes.iter().all(|node| node_ids.insert(node.id.as_str())) {
      return false;
    }
    let mut edge_ids = HashSet::new();
    let edges_ok = self.edges.iter().all(|edge| {
      edge_ids.insert(edge.id.as_str())
        && node_ids.contains(edge.source.as_str())
        && node_ids.contains(edge.target.as_str())
    });
    edges_ok && self.metadata.node_count == self.nodes.len()
  }
}

/// A flowchart as returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Flowchart {
  /// Built locally by the text parser or as a fallback.
  Built(Graph),
  /// JSON produced by a model, passed through untouched.
  Model(Value),
}

impl Flowchart {
  /// The locally built graph, if this is one.
  pub fn as_graph(&self) -> Option<&Graph> {
    match self {
      Flowchart::Built(graph) => Some(graph),
      Flowchart::Model(_) => None,
    }
  }

  /// Whether the content came from a model.
  pub fn is_model_output(&self) -> bool {
    matches!(self, Flowchart::Model(_))
  }

  /// Node labels in order. Model nodes without a string `data.label` are skipped.
  pub fn labels(&self) -> Vec<&str> {
    match self {
      Flowchart::Built(graph) => graph.labels(),
      Flowchart::Model(value) => value
        .get("nodes")
        .and_then(Value::as_array)
        .map(|nodes| {
          nodes
            .iter()
            .filter_map(|node| node.pointer("/data/label").and_then(Value::as_str))
            .collect()
        })
        .unwrap_or_default(),
    }
  }

  /// `metadata.diagnostic` of a locally built graph.
  pub fn diagnostic(&self) -> Option<&str> {
    self.as_graph().and_then(|graph| graph.metadata.diagnostic.as_deref())
  }
}

impl From<Graph> for Flowchart {
  fn from(graph: Graph) -> Self {
    Flowchart::Built(graph)
  }
}
