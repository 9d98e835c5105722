//! The live presentation tree: an arena of nodes addressed by generational ids.
//!
//! Nodes are only created through [`render`] and only freed through [`clear`] and
//! [`remove`]. A freed slot is reused with a bumped generation, so a stale
//! [`NodeId`] held by a controller or an in-flight action resolves to nothing
//! instead of to an unrelated node.

pub mod description;
pub mod render;

use std::collections::{BTreeMap, HashMap};

pub use description::{
    ContainerDescription, ControllerId, EventKind, Followup, Handler, MountHook, TEXT_TAG,
};
pub use render::{clear, remove, render, render_before};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// The form and modal a node belongs to, fixed when the node is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Owner {
    pub form: Option<NodeId>,
    pub modal: Option<NodeId>,
}

#[derive(Debug)]
pub struct Node {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub handlers: Vec<(EventKind, Handler)>,
    pub owner: Owner,
    pub modal: bool,
}

impl Node {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    pub fn handlers_for(&self, event: EventKind) -> impl Iterator<Item = &Handler> {
        self.handlers
            .iter()
            .filter(move |(kind, _)| *kind == event)
            .map(|(_, h)| h)
    }

    pub fn handles(&self, event: EventKind) -> bool {
        self.handlers_for(event).next().is_some()
    }
}

/// An opaque widget mounted into a node by reference (terminal, code editor).
pub trait EmbeddedWidget {
    fn title(&self) -> &str;
    /// Lines to paint, top to bottom.
    fn lines(&self) -> Vec<String>;
    fn insert_char(&mut self, c: char);
    fn newline(&mut self);
    fn backspace(&mut self);
    /// Node whose `value` attribute should mirror the widget's content.
    fn mirror(&self) -> Option<(NodeId, String)> {
        None
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    focus: Option<NodeId>,
    embedded: HashMap<NodeId, Box<dyn EmbeddedWidget>>,
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("live", &self.len())
            .field("focus", &self.focus)
            .field("embedded", &self.embedded.len())
            .finish()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            focus: None,
            embedded: HashMap::new(),
        }
    }

    /// Creates a parentless node to render under.
    pub fn create_root(&mut self, tag: &str) -> NodeId {
        self.alloc(Node {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            handlers: Vec::new(),
            owner: Owner::default(),
            modal: false,
        })
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Frees `id` and everything below it. Does not touch the parent's child list.
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self.slots.get_mut(current.index as usize) else {
                continue;
            };
            if slot.generation != current.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.embedded.remove(&current);
                if self.focus == Some(current) {
                    self.focus = None;
                }
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// First node under `root` whose `id` attribute matches and that carries `class`.
    pub fn find_by_id(&self, root: NodeId, id: &str, class: Option<&str>) -> Option<NodeId> {
        self.descendants(root).into_iter().find(|n| {
            self.get(*n).is_some_and(|node| {
                node.attr("id") == Some(id) && class.map_or(true, |c| node.has_class(c))
            })
        })
    }

    pub fn set_attr(&mut self, id: NodeId, key: &str, value: impl Into<String>) {
        if let Some(node) = self.get_mut(id) {
            node.attributes.insert(key.to_string(), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, key: &str) {
        if let Some(node) = self.get_mut(id) {
            node.attributes.remove(key);
        }
    }

    pub fn focus(&self) -> Option<NodeId> {
        self.focus.filter(|id| self.contains(*id))
    }

    pub fn set_focus(&mut self, id: Option<NodeId>) {
        self.focus = id.filter(|id| self.contains(*id));
    }

    pub fn embed(&mut self, id: NodeId, widget: Box<dyn EmbeddedWidget>) {
        if self.contains(id) {
            self.embedded.insert(id, widget);
        }
    }

    pub fn embedded(&self, id: NodeId) -> Option<&dyn EmbeddedWidget> {
        self.embedded.get(&id).map(|w| w.as_ref())
    }

    /// Runs `f` against the embedded widget at `id`, then copies its mirror value
    /// into the mirror node.
    pub fn with_embedded<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn EmbeddedWidget) -> R,
    ) -> Option<R> {
        let widget = self.embedded.get_mut(&id)?;
        let result = f(widget.as_mut());
        if let Some((target, value)) = widget.mirror() {
            self.set_attr(target, "value", value);
        }
        Some(result)
    }

    /// Concatenated text of all text leaves below `id`.
    #[cfg(test)]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.get(n))
            .filter(|n| n.is_text())
            .filter_map(|n| n.text.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_id_never_resolves() {
        let mut tree = Tree::new();
        let root = tree.create_root("div");
        let a = render(&mut tree, ContainerDescription::new("span"), root);
        clear(&mut tree, root);
        assert!(!tree.contains(a));

        // slot reuse must not revive the old id
        let b = render(&mut tree, ContainerDescription::new("b"), root);
        assert!(tree.contains(b));
        assert!(!tree.contains(a));
        assert_ne!(a, b);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let mut tree = Tree::new();
        let root = tree.create_root("div");
        let desc = ContainerDescription::new("ul")
            .child(ContainerDescription::new("li").attr("id", "1"))
            .child(
                ContainerDescription::new("li")
                    .attr("id", "2")
                    .child(ContainerDescription::new("b").attr("id", "3")),
            );
        render(&mut tree, desc, root);
        let ids: Vec<_> = tree
            .descendants(root)
            .into_iter()
            .filter_map(|n| tree.get(n).and_then(|n| n.attr("id").map(str::to_string)))
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_focus_cleared_with_node() {
        let mut tree = Tree::new();
        let root = tree.create_root("div");
        let input = render(&mut tree, ContainerDescription::new("input"), root);
        tree.set_focus(Some(input));
        assert_eq!(tree.focus(), Some(input));
        remove(&mut tree, input);
        assert_eq!(tree.focus(), None);
    }
}
