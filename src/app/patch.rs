//! Targeted in-place updates of already rendered nodes.

use crate::catalog::layout::fill_percent;
use crate::protocol::ElementUpdate;
use crate::tree::{clear, render, ContainerDescription, NodeId, Tree};
use serde_json::Value;
use tracing::{debug, warn};

/// Applies a push `update` under `root`. Returns whether anything changed.
pub fn apply_update(tree: &mut Tree, root: NodeId, update: &ElementUpdate) -> bool {
    match update.element.as_str() {
        "progress" => update_progress(tree, root, &update.id, &update.data),
        other => {
            warn!("No targeted update for element kind {:?}", other);
            false
        }
    }
}

/// Swaps the content of the `updatable` container `id` under `root`.
pub fn replace_part(
    tree: &mut Tree,
    root: NodeId,
    id: &str,
    content: Option<ContainerDescription>,
) -> bool {
    let Some(host) = tree.find_by_id(root, id, Some("updatable")) else {
        return false;
    };
    clear(tree, host);
    if let Some(content) = content {
        render(tree, content, host);
    }
    true
}

fn number(data: &Value, key: &str) -> Option<f64> {
    match data.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn update_progress(tree: &mut Tree, root: NodeId, id: &str, data: &Value) -> bool {
    let Some(host) = tree.find_by_id(root, id, Some("progress")) else {
        debug!("Progress {:?} not on this page", id);
        return false;
    };
    let Some(bar) = tree.children(host).first().copied() else {
        return false;
    };
    let Some(value) = number(data, "value") else {
        warn!("Progress update for {:?} without a value", id);
        return false;
    };
    let max = number(data, "max").unwrap_or(100.0);
    let pct = fill_percent(value, max);
    tree.set_attr(bar, "style", format!("width: {}%", pct.round()));
    true
}
