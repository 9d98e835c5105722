//! Keyboard-driven events on the rendered tree.
//!
//! Nodes carry [`Handler`]s keyed by [`EventKind`]; this module fires them.
//! Focus moves fire `Press` on the target first, then `Blur` on whatever loses
//! focus, unless the target retains focus (menu items, confirm links).

use crate::app::action::Action;
use crate::app::dispatch;
use crate::app::state::AppState;
use crate::catalog::interactive;
use crate::tree::{self, ControllerId, EventKind, Handler, Node, NodeId, Tree};

/// Fires every handler `node` has for `event`. `ctrl` is only consulted for `KeyPress`.
pub fn fire(state: &mut AppState, node: NodeId, event: EventKind, ctrl: bool) -> Vec<Action> {
    let handlers: Vec<Handler> = match state.tree.get(node) {
        Some(n) => n.handlers_for(event).cloned().collect(),
        None => return Vec::new(),
    };
    let mut actions = Vec::new();
    for handler in handlers {
        if !state.tree.contains(node) {
            break;
        }
        actions.extend(run_handler(state, node, handler, ctrl));
    }
    state.dirty = true;
    actions
}

fn run_handler(state: &mut AppState, node: NodeId, handler: Handler, ctrl: bool) -> Vec<Action> {
    match handler {
        Handler::Dispatch { action, followup } => {
            return dispatch::dispatch(state, node, &action, followup);
        }
        Handler::SubmitOnCtrlEnter(action) => {
            if ctrl {
                return dispatch::dispatch(state, node, &action, None);
            }
        }
        Handler::ToggleMenu(id) => toggle_menu(state, node, id),
        Handler::CloseMenu(id) => close_menu(state, id),
        Handler::BeginEdit(id) => begin_edit(state, node, id),
        Handler::EndEdit(id) => end_edit(state, node, id),
        Handler::AppendTag { name } => {
            if !ctrl {
                append_tag(state, node, &name);
            }
        }
        Handler::RemoveTag => {
            if let Some(badge) = state.tree.parent(node) {
                tree::remove(&mut state.tree, badge);
            }
        }
        Handler::CloseModal => {
            if let Some(modal) = state.tree.get(node).and_then(|n| n.owner.modal) {
                state.close_modal(modal);
            }
        }
        Handler::RetainFocus => {}
    }
    Vec::new()
}

fn toggle_menu(state: &mut AppState, toggle: NodeId, id: ControllerId) {
    let (open, items) = match state.controllers.menu_mut(id) {
        Some(controller) => (controller.is_open(), controller.items.clone()),
        None => return,
    };
    if open {
        close_menu(state, id);
        return;
    }
    let Some(host) = state.tree.parent(toggle) else {
        return;
    };
    let menu = tree::render(&mut state.tree, interactive::menu(id, &items), host);
    if let Some(controller) = state.controllers.menu_mut(id) {
        controller.menu = Some(menu);
    }
}

pub fn close_menu(state: &mut AppState, id: ControllerId) {
    if let Some(menu) = state.controllers.menu_mut(id).and_then(|m| m.menu.take()) {
        tree::remove(&mut state.tree, menu);
        state.dirty = true;
    }
}

/// Closes every open dropdown. Returns whether any was open.
pub fn close_all_menus(state: &mut AppState) -> bool {
    let open = state.controllers.open_menus();
    for id in &open {
        close_menu(state, *id);
    }
    !open.is_empty()
}

fn begin_edit(state: &mut AppState, node: NodeId, id: ControllerId) {
    let Some(host) = state.tree.get(node).and_then(|n| n.owner.form) else {
        return;
    };
    let Some(editor) = state.controllers.editor_mut(id) else {
        return;
    };
    if editor.editing {
        return;
    }
    editor.editing = true;
    let kind = editor.kind.clone();

    tree::clear(&mut state.tree, host);
    for desc in interactive::editor_input(id, &kind) {
        tree::render(&mut state.tree, desc, host);
    }
    state.held_focus = None;
}

fn end_edit(state: &mut AppState, node: NodeId, id: ControllerId) {
    let Some(host) = state.tree.get(node).and_then(|n| n.owner.form) else {
        return;
    };
    let Some(editor) = state.controllers.editor_mut(id) else {
        return;
    };
    if !editor.editing {
        return;
    }
    editor.editing = false;
    let kind = editor.kind.clone();

    tree::clear(&mut state.tree, host);
    tree::render(&mut state.tree, interactive::editor_display(id, &kind), host);
}

fn append_tag(state: &mut AppState, entry: NodeId, name: &str) {
    let value = match state.tree.get(entry).and_then(|n| n.attr("value")) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return,
    };
    let Some(parent) = state.tree.parent(entry) else {
        return;
    };
    tree::render_before(
        &mut state.tree,
        interactive::tag(&value, name, true),
        parent,
        entry,
    );
    state.tree.set_attr(entry, "value", "");
}

fn is_focusable(tree: &Tree, id: NodeId, node: &Node) -> bool {
    if node.is_text() {
        return false;
    }
    if tree.embedded(id).is_some() {
        return true;
    }
    match node.tag.as_str() {
        "input" => node.attr("type") != Some("hidden"),
        "select" | "textarea" => true,
        _ => node.handles(EventKind::Click) || node.handles(EventKind::KeyPress),
    }
}

/// Focusable nodes of the active layer (top modal, else page) in document order.
pub fn focusables(state: &AppState) -> Vec<NodeId> {
    let tree = &state.tree;
    tree.descendants(state.interaction_root())
        .into_iter()
        .filter(|id| tree.get(*id).is_some_and(|n| is_focusable(tree, *id, n)))
        .collect()
}

/// Moves focus `delta` steps through [`focusables`], wrapping around.
pub fn focus_step(state: &mut AppState, delta: isize) -> Vec<Action> {
    let nodes = focusables(state);
    if nodes.is_empty() {
        return Vec::new();
    }
    let len = nodes.len() as isize;
    let next = match state
        .tree
        .focus()
        .and_then(|f| nodes.iter().position(|n| *n == f))
    {
        Some(i) => (i as isize + delta).rem_euclid(len),
        None if delta < 0 => len - 1,
        None => 0,
    };
    focus_node(state, nodes[next as usize])
}

pub fn focus_node(state: &mut AppState, target: NodeId) -> Vec<Action> {
    let previous = state.tree.focus();
    if previous == Some(target) {
        return Vec::new();
    }
    let retains = state.tree.get(target).is_some_and(|n| {
        n.handlers_for(EventKind::Press)
            .any(|h| *h == Handler::RetainFocus)
    });

    let mut actions = fire(state, target, EventKind::Press, false);
    if retains {
        if state.held_focus.is_none() {
            state.held_focus = previous;
        }
    } else {
        let held = state.held_focus.take();
        if let Some(prev) = previous {
            actions.extend(fire(state, prev, EventKind::Blur, false));
        }
        if let Some(held) = held.filter(|h| Some(*h) != previous) {
            actions.extend(fire(state, held, EventKind::Blur, false));
        }
    }
    state.tree.set_focus(Some(target));
    actions
}

/// Enter on the focused node.
pub fn activate(state: &mut AppState, ctrl: bool) -> Vec<Action> {
    let Some(node) = state.tree.focus() else {
        return Vec::new();
    };
    if state.tree.embedded(node).is_some() {
        state.tree.with_embedded(node, |w| w.newline());
        return fire(state, node, EventKind::Input, false);
    }
    let Some(n) = state.tree.get(node) else {
        return Vec::new();
    };
    let tag = n.tag.clone();
    let is_checkbox = n.attr("type") == Some("checkbox");
    let handles_key = n.handles(EventKind::KeyPress);

    let mut actions = Vec::new();
    if tag == "textarea" && !ctrl {
        actions.extend(edit_value(state, node, |v| v.push('\n')));
    }
    if handles_key {
        actions.extend(fire(state, node, EventKind::KeyPress, ctrl));
        return actions;
    }
    match tag.as_str() {
        "input" if is_checkbox => actions.extend(toggle_checkbox(state, node)),
        "input" | "select" | "textarea" => {}
        _ => actions.extend(fire(state, node, EventKind::Click, false)),
    }
    actions
}

fn edit_value(state: &mut AppState, node: NodeId, f: impl FnOnce(&mut String)) -> Vec<Action> {
    let mut value = state
        .tree
        .get(node)
        .and_then(|n| n.attr("value"))
        .unwrap_or_default()
        .to_string();
    f(&mut value);
    state.tree.set_attr(node, "value", value);
    fire(state, node, EventKind::Input, false)
}

fn is_text_field(node: &Node) -> bool {
    match node.tag.as_str() {
        "textarea" => true,
        "input" => !matches!(node.attr("type"), Some("checkbox") | Some("hidden")),
        _ => false,
    }
}

/// A printable key on the focused node.
pub fn type_char(state: &mut AppState, c: char) -> Vec<Action> {
    let Some(node) = state.tree.focus() else {
        return Vec::new();
    };
    if state.tree.embedded(node).is_some() {
        state.tree.with_embedded(node, |w| w.insert_char(c));
        return fire(state, node, EventKind::Input, false);
    }
    match state.tree.get(node) {
        Some(n) if is_text_field(n) => edit_value(state, node, |v| v.push(c)),
        Some(n) if n.attr("type") == Some("checkbox") && c == ' ' => toggle_checkbox(state, node),
        _ => Vec::new(),
    }
}

pub fn backspace(state: &mut AppState) -> Vec<Action> {
    let Some(node) = state.tree.focus() else {
        return Vec::new();
    };
    if state.tree.embedded(node).is_some() {
        state.tree.with_embedded(node, |w| w.backspace());
        return fire(state, node, EventKind::Input, false);
    }
    match state.tree.get(node) {
        Some(n) if is_text_field(n) => edit_value(state, node, |v| {
            v.pop();
        }),
        _ => Vec::new(),
    }
}

fn toggle_checkbox(state: &mut AppState, node: NodeId) -> Vec<Action> {
    let checked = state
        .tree
        .get(node)
        .is_some_and(|n| n.attributes.contains_key("checked"));
    if checked {
        state.tree.remove_attr(node, "checked");
    } else {
        state.tree.set_attr(node, "checked", "checked");
    }
    fire(state, node, EventKind::Input, false)
}

/// Moves a focused select to the previous or next option.
pub fn cycle_option(state: &mut AppState, delta: isize) -> Vec<Action> {
    let Some(node) = state.tree.focus() else {
        return Vec::new();
    };
    if state.tree.get(node).map(|n| n.tag.as_str()) != Some("select") {
        return Vec::new();
    }
    let options: Vec<NodeId> = state
        .tree
        .children(node)
        .iter()
        .copied()
        .filter(|o| state.tree.get(*o).is_some_and(|o| o.tag == "option"))
        .collect();
    if options.is_empty() {
        return Vec::new();
    }
    let current = options
        .iter()
        .position(|o| {
            state
                .tree
                .get(*o)
                .is_some_and(|o| o.attributes.contains_key("selected"))
        })
        .unwrap_or(0);
    let next = (current as isize + delta).rem_euclid(options.len() as isize) as usize;
    if next == current {
        return Vec::new();
    }
    for option in &options {
        state.tree.remove_attr(*option, "selected");
    }
    state.tree.set_attr(options[next], "selected", "selected");
    fire(state, node, EventKind::Input, false)
}

/// Esc: closes the innermost open thing. Returns whether anything closed.
pub fn dismiss(state: &mut AppState) -> bool {
    if close_all_menus(state) {
        return true;
    }
    if let Some(modal) = state.top_modal() {
        state.close_modal(modal);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::protocol::{FieldValue, PageData};
    use serde_json::json;

    fn state_with(elements: serde_json::Value) -> AppState {
        let mut state = AppState::new(AppConfig::default());
        state.nav.select("services", 0);
        let page: PageData =
            serde_json::from_value(json!({"title": "T", "elements": elements})).unwrap();
        state.show_page(&page);
        state
    }

    fn find(state: &AppState, pred: impl Fn(&Node) -> bool) -> NodeId {
        state
            .tree
            .descendants(state.page_root)
            .into_iter()
            .find(|n| state.tree.get(*n).is_some_and(&pred))
            .unwrap()
    }

    fn dispatched(actions: &[Action]) -> Vec<(String, Option<crate::protocol::FormData>)> {
        actions
            .iter()
            .filter_map(|a| match a {
                Action::Dispatch { request, .. } => Some((request.cmd.clone(), request.data.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_dropdown_opens_and_item_keeps_toggle_focused() {
        let mut state = state_with(json!({"type": "dropdown", "options": {"items": [
            {"text": "Start", "cmd": "start"},
            null,
            {"text": "Remove", "danger": true, "cmd": "rm"}
        ]}}));
        let toggle = find(&state, |n| n.has_class("dropdown-toggle"));
        focus_node(&mut state, toggle);
        assert!(activate(&mut state, false).is_empty());
        assert_eq!(state.controllers.open_menus().len(), 1);

        // Tab into the menu: the toggle is not blurred, so the menu stays open
        focus_step(&mut state, 1);
        assert_eq!(state.held_focus, Some(toggle));
        assert_eq!(state.controllers.open_menus().len(), 1);

        let actions = activate(&mut state, false);
        assert_eq!(dispatched(&actions)[0].0, "start");

        // leaving to a non-retaining node blurs the toggle and closes the menu
        focus_node(&mut state, toggle);
        assert!(state.controllers.open_menus().is_empty());
    }

    #[test]
    fn test_value_editor_round_trip() {
        let mut state = state_with(json!({"type": "input-edit", "options": {
            "name": "host", "value": "nas", "action": {"cmd": "rename"}
        }}));
        let pencil = find(&state, |n| n.has_class("edit"));
        focus_node(&mut state, pencil);
        activate(&mut state, false);

        let field = state.tree.focus().unwrap();
        assert_eq!(state.tree.get(field).unwrap().tag, "input");
        type_char(&mut state, '2');
        assert_eq!(state.tree.get(field).unwrap().attr("value"), Some("nas2"));

        // plain Enter does not submit, Ctrl+Enter does
        assert!(dispatched(&activate(&mut state, false)).is_empty());
        let sent = dispatched(&activate(&mut state, true));
        assert_eq!(sent[0].0, "rename");
        assert_eq!(
            sent[0].1.as_ref().unwrap()["host"],
            FieldValue::Text("nas2".into())
        );
    }

    #[test]
    fn test_blur_restores_display_mode() {
        let mut state = state_with(json!({"type": "line", "options": {"elements": [
            {"type": "input-edit", "options": {"name": "host", "value": "nas", "action": {"cmd": "rename"}}},
            {"type": "button", "options": {"text": "Other", "action": {"cmd": "other"}}}
        ]}}));
        let pencil = find(&state, |n| n.has_class("edit"));
        focus_node(&mut state, pencil);
        activate(&mut state, false);
        assert!(state.tree.get(state.tree.focus().unwrap()).unwrap().tag == "input");

        let button = find(&state, |n| n.tag == "button");
        focus_node(&mut state, button);
        let pencil = find(&state, |n| n.has_class("edit"));
        assert!(state.tree.contains(pencil));
        assert!(state.tree.text_content(state.page_root).contains("nas"));
    }

    #[test]
    fn test_tags_append_and_remove() {
        let mut state = state_with(json!({"type": "tags-edit", "options": {
            "name": "labels", "value": ["a"], "action": {"cmd": "save"}
        }}));
        let pencil = find(&state, |n| n.has_class("edit"));
        focus_node(&mut state, pencil);
        activate(&mut state, false);

        let entry = state.tree.focus().unwrap();
        assert!(state.tree.get(entry).unwrap().has_class("tag-entry"));
        for c in "b".chars() {
            type_char(&mut state, c);
        }
        activate(&mut state, false);
        assert_eq!(state.tree.get(entry).unwrap().attr("value"), Some(""));

        let sent = dispatched(&activate(&mut state, true));
        assert_eq!(
            sent[0].1.as_ref().unwrap()["labels"],
            FieldValue::List(vec!["a".into(), "b".into()])
        );

        let remove = find(&state, |n| n.handles(EventKind::Click) && n.tag == "i");
        focus_node(&mut state, remove);
        activate(&mut state, false);
        let sent = dispatched(&activate_on(&mut state, entry));
        assert_eq!(
            sent[0].1.as_ref().unwrap()["labels"],
            FieldValue::List(vec!["b".into()])
        );
    }

    fn activate_on(state: &mut AppState, node: NodeId) -> Vec<Action> {
        state.tree.set_focus(Some(node));
        activate(state, true)
    }

    #[test]
    fn test_select_cycles_and_fires_change_action() {
        let mut state = state_with(json!({"type": "select", "options": {
            "name": "mode", "value": "a", "options": {"a": "A", "b": "B"},
            "change-action": {"cmd": "mode"}
        }}));
        let select = find(&state, |n| n.tag == "select");
        focus_node(&mut state, select);
        let sent = dispatched(&cycle_option(&mut state, 1));
        assert_eq!(sent[0].0, "mode");
        let chosen = find(&state, |n| n.attributes.contains_key("selected"));
        assert_eq!(state.tree.get(chosen).unwrap().attr("value"), Some("b"));
    }

    #[test]
    fn test_switch_toggles_with_space() {
        let mut state = state_with(json!({"type": "form", "options": {
            "elements": {"type": "switch", "options": {"name": "on", "action": {"cmd": "flip"}}}
        }}));
        let checkbox = find(&state, |n| n.attr("type") == Some("checkbox"));
        focus_node(&mut state, checkbox);
        let sent = dispatched(&type_char(&mut state, ' '));
        assert_eq!(sent[0].1.as_ref().unwrap()["on"], FieldValue::Flag(true));
    }

    #[test]
    fn test_dismiss_closes_menu_before_modal() {
        let mut state = state_with(json!({"type": "dropdown", "options": {"items": []}}));
        let toggle = find(&state, |n| n.has_class("dropdown-toggle"));
        focus_node(&mut state, toggle);
        activate(&mut state, false);
        assert!(dismiss(&mut state));
        assert!(state.controllers.open_menus().is_empty());
        assert!(!dismiss(&mut state));
    }
}
