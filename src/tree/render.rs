use super::{ContainerDescription, MountHook, Node, NodeId, Owner, Tree, TEXT_TAG};
use std::collections::BTreeMap;

/// Builds `description` as the last child of `parent` and returns the new node.
///
/// Mount hooks run after the whole subtree is attached, innermost first.
pub fn render(tree: &mut Tree, description: ContainerDescription, parent: NodeId) -> NodeId {
    insert(tree, description, parent, None)
}

/// Like [`render`], but places the new node immediately before `sibling`.
pub fn render_before(
    tree: &mut Tree,
    description: ContainerDescription,
    parent: NodeId,
    sibling: NodeId,
) -> NodeId {
    insert(tree, description, parent, Some(sibling))
}

/// Frees every child of `node`. The node itself stays live.
pub fn clear(tree: &mut Tree, node: NodeId) {
    let children = match tree.get_mut(node) {
        Some(n) => std::mem::take(&mut n.children),
        None => return,
    };
    for child in children {
        tree.free_subtree(child);
    }
}

/// Detaches `node` from its parent and frees it.
pub fn remove(tree: &mut Tree, node: NodeId) {
    if let Some(parent) = tree.parent(node) {
        if let Some(p) = tree.get_mut(parent) {
            p.children.retain(|c| *c != node);
        }
    }
    tree.free_subtree(node);
}

fn insert(
    tree: &mut Tree,
    description: ContainerDescription,
    parent: NodeId,
    before: Option<NodeId>,
) -> NodeId {
    let scope = child_scope(tree, parent);
    let raw = raw_text_context(tree, parent);
    let mut mounts = Vec::new();
    let id = build(tree, description, Some(parent), scope, raw, &mut mounts);

    if let Some(p) = tree.get_mut(parent) {
        let position = before
            .and_then(|s| p.children.iter().position(|c| *c == s))
            .unwrap_or(p.children.len());
        p.children.insert(position, id);
    }

    for (node, hook) in mounts {
        hook(tree, node);
    }
    id
}

/// Ownership handed to the children of `id`.
fn child_scope(tree: &Tree, id: NodeId) -> Owner {
    let Some(node) = tree.get(id) else {
        return Owner::default();
    };
    let mut owner = node.owner;
    if node.tag == "form" {
        owner.form = Some(id);
    }
    if node.modal {
        owner.modal = Some(id);
    }
    owner
}

fn raw_text_context(tree: &Tree, id: NodeId) -> bool {
    tree.get(id)
        .is_some_and(|n| n.tag == "pre" || n.tag == "textarea")
}

fn text_node(text: String, parent: NodeId, owner: Owner) -> Node {
    Node {
        tag: TEXT_TAG.to_string(),
        attributes: BTreeMap::new(),
        classes: Vec::new(),
        text: Some(text),
        children: Vec::new(),
        parent: Some(parent),
        handlers: Vec::new(),
        owner,
        modal: false,
    }
}

fn build(
    tree: &mut Tree,
    description: ContainerDescription,
    parent: Option<NodeId>,
    owner: Owner,
    raw_text: bool,
    mounts: &mut Vec<(NodeId, MountHook)>,
) -> NodeId {
    let ContainerDescription {
        tag,
        attributes,
        classes,
        text,
        children,
        handlers,
        modal,
        mount,
    } = description;

    let is_leaf = tag == TEXT_TAG;
    let keeps_breaks = raw_text || tag == "pre" || tag == "textarea";
    let id = tree.alloc(Node {
        tag,
        attributes,
        classes,
        text: if is_leaf { text.clone() } else { None },
        children: Vec::new(),
        parent,
        handlers,
        owner,
        modal,
    });

    let mut kids = Vec::new();
    if let (false, Some(text)) = (is_leaf, text) {
        let mut append = |tree: &mut Tree, node: Node| kids.push(tree.alloc(node));
        if keeps_breaks {
            append(tree, text_node(text, id, owner));
        } else {
            for (i, part) in text.split('\n').enumerate() {
                if i > 0 {
                    let mut br = text_node(String::new(), id, owner);
                    br.tag = "br".to_string();
                    br.text = None;
                    append(tree, br);
                }
                append(tree, text_node(part.to_string(), id, owner));
            }
        }
    }

    let scope = {
        let mut scope = owner;
        if tree.get(id).is_some_and(|n| n.tag == "form") {
            scope.form = Some(id);
        }
        if modal {
            scope.modal = Some(id);
        }
        scope
    };
    for child in children {
        kids.push(build(tree, child, Some(id), scope, keeps_breaks, mounts));
    }

    if let Some(node) = tree.get_mut(id) {
        node.children = kids;
    }
    if let Some(hook) = mount {
        mounts.push((id, hook));
    }
    id
}
