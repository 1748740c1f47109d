//! Fixed visual style per node kind.

use crate::graph::StyleRecord;
use crate::node_kind::NodeKind;

const TEXT_COLOR: &str = "white";
const PADDING: &str = "10px";
const BORDER_RADIUS: &str = "8px";

/// Background and border colours for each kind.
fn palette(kind: NodeKind) -> (&'static str, &'static str) {
  match kind {
    NodeKind::Start | NodeKind::End => ("#4ade80", "2px solid #22c55e"),
    NodeKind::Process => ("#60a5fa", "2px solid #3b82f6"),
    NodeKind::Decision => ("#fbbf24", "2px solid #f59e0b"),
    NodeKind::Default => ("#94a3b8", "2px solid #64748b"),
  }
}

/// Style record for a node kind.
pub fn style_for(kind: NodeKind) -> StyleRecord {
  let (background, border) = palette(kind);
  StyleRecord {
    background: background.to_string(),
    color: TEXT_COLOR.to_string(),
    border: border.to_string(),
    padding: Some(PADDING.to_string()),
    border_radius: Some(BORDER_RADIUS.to_string()),
  }
}

/// Style record for a kind given by name. Unrecognized names get the default style.
pub fn style_for_name(name: &str) -> StyleRecord {
  style_for(NodeKind::from_name(name))
}
