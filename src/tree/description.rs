use super::{NodeId, Tree};
use crate::protocol::ActionDescriptor;
use std::collections::BTreeMap;
use std::fmt;

/// Tag used for bare text leaves.
pub const TEXT_TAG: &str = "#text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer-down equivalent: fired on the target before focus moves.
    Press,
    Blur,
    Click,
    KeyPress,
    Input,
}

/// Identifies a stateful widget controller (dropdown menu, value editor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub u32);

/// Work to run once a dispatched action settles, whatever its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followup {
    CloseMenu(ControllerId),
}

/// What happens when an event reaches a node. Interpreted by the app layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    Dispatch {
        action: ActionDescriptor,
        followup: Option<Followup>,
    },
    ToggleMenu(ControllerId),
    CloseMenu(ControllerId),
    BeginEdit(ControllerId),
    EndEdit(ControllerId),
    /// Dispatches only for Ctrl+Enter.
    SubmitOnCtrlEnter(ActionDescriptor),
    /// On plain Enter, turns the field's text into a new tag named `name`.
    AppendTag {
        name: String,
    },
    RemoveTag,
    CloseModal,
    /// Press on this node does not take focus away from the current node.
    RetainFocus,
}

pub type MountHook = Box<dyn FnOnce(&mut Tree, NodeId)>;

/// A node to be built by the renderer.
#[derive(Default)]
pub struct ContainerDescription {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub children: Vec<ContainerDescription>,
    pub handlers: Vec<(EventKind, Handler)>,
    pub modal: bool,
    pub mount: Option<MountHook>,
}

impl fmt::Debug for ContainerDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerDescription")
            .field("tag", &self.tag)
            .field("attributes", &self.attributes)
            .field("classes", &self.classes)
            .field("text", &self.text)
            .field("children", &self.children)
            .field("handlers", &self.handlers)
            .field("modal", &self.modal)
            .field("mount", &self.mount.is_some())
            .finish()
    }
}

impl ContainerDescription {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// A bare text leaf. Never split on line breaks.
    pub fn text_leaf(text: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG.to_string(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !class.is_empty() {
            self.classes.push(class);
        }
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the attribute only when `value` is non-empty.
    pub fn attr_nonempty(self, key: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.attr(key, value)
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: ContainerDescription) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ContainerDescription>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn on(mut self, event: EventKind, handler: Handler) -> Self {
        self.handlers.push((event, handler));
        self
    }

    pub fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    pub fn on_mount(mut self, hook: impl FnOnce(&mut Tree, NodeId) + 'static) -> Self {
        self.mount = Some(Box::new(hook));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Depth-first search through this description, for tests and diagnostics.
    pub fn find<F>(&self, pred: &F) -> Option<&ContainerDescription>
    where
        F: Fn(&ContainerDescription) -> bool,
    {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(pred))
    }
}
