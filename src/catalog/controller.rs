//! Per-widget state for widgets that change shape after they are rendered.

use crate::protocol::widget::{DropdownItem, SelectEditOptions, TagsEditOptions, ValueEditOptions};
use crate::tree::{ControllerId, NodeId};
use std::collections::HashMap;

/// Lifetime of a controller: dropped with the page rebuild or with its modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Page,
    Modal(u32),
}

#[derive(Debug, Clone)]
pub struct MenuController {
    pub items: Vec<Option<DropdownItem>>,
    pub menu: Option<NodeId>,
}

impl MenuController {
    pub fn is_open(&self) -> bool {
        self.menu.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum EditorKind {
    Input(ValueEditOptions),
    Textarea(ValueEditOptions),
    Select(SelectEditOptions),
    Tags(TagsEditOptions),
}

#[derive(Debug, Clone)]
pub struct EditorController {
    pub kind: EditorKind,
    pub editing: bool,
}

#[derive(Debug, Clone)]
pub enum Controller {
    Menu(MenuController),
    Editor(EditorController),
}

#[derive(Debug, Default)]
pub struct Controllers {
    next_id: u32,
    entries: HashMap<ControllerId, (Scope, Controller)>,
}

impl Controllers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, scope: Scope, controller: Controller) -> ControllerId {
        let id = ControllerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.insert(id, (scope, controller));
        id
    }

    pub fn get(&self, id: ControllerId) -> Option<&Controller> {
        self.entries.get(&id).map(|(_, c)| c)
    }

    pub fn menu_mut(&mut self, id: ControllerId) -> Option<&mut MenuController> {
        match self.entries.get_mut(&id) {
            Some((_, Controller::Menu(menu))) => Some(menu),
            _ => None,
        }
    }

    pub fn editor_mut(&mut self, id: ControllerId) -> Option<&mut EditorController> {
        match self.entries.get_mut(&id) {
            Some((_, Controller::Editor(editor))) => Some(editor),
            _ => None,
        }
    }

    /// Ids of all menus that are currently open.
    pub fn open_menus(&self) -> Vec<ControllerId> {
        let mut ids: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, (_, c))| matches!(c, Controller::Menu(m) if m.is_open()))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn drop_scope(&mut self, scope: Scope) {
        self.entries.retain(|_, (s, _)| *s != scope);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_scope_only_removes_that_scope() {
        let mut controllers = Controllers::new();
        let page = controllers.register(
            Scope::Page,
            Controller::Menu(MenuController {
                items: vec![],
                menu: None,
            }),
        );
        let modal = controllers.register(
            Scope::Modal(3),
            Controller::Editor(EditorController {
                kind: EditorKind::Input(ValueEditOptions::default()),
                editing: false,
            }),
        );
        controllers.drop_scope(Scope::Page);
        assert!(controllers.get(page).is_none());
        assert!(controllers.editor_mut(modal).is_some());
        assert!(controllers.menu_mut(modal).is_none());
    }
}
