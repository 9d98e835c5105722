//! Sending actions to the server and applying what comes back.
//!
//! A dispatch moves `Idle -> Dispatching`; its response moves through
//! `Applying(kind)` and back to `Idle` once nothing else is in flight.

use crate::app::action::{Action, PageRequest};
use crate::app::form;
use crate::app::interaction;
use crate::app::patch;
use crate::app::state::AppState;
use crate::catalog::{Catalog, Scope};
use crate::client::ClientError;
use crate::protocol::{ActionDescriptor, ActionRequest, ResponseEnvelope};
use crate::tree::{Followup, NodeId};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where an action came from, carried through the request round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub node: NodeId,
    /// Modal containing the origin, closed once the response arrives.
    pub modal: Option<NodeId>,
    pub followup: Option<Followup>,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dispatching,
    Applying(String),
}

/// Sends `action` on behalf of `node`, with the field data of its form.
pub fn dispatch(
    state: &mut AppState,
    node: NodeId,
    action: &ActionDescriptor,
    followup: Option<Followup>,
) -> Vec<Action> {
    if action.is_disabled() {
        debug!("Ignoring disabled action");
        return Vec::new();
    }
    let Some(selection) = state.nav.current() else {
        warn!("Action {:?} without a selected module", action.cmd);
        return Vec::new();
    };
    let module = selection.module.clone();
    let owner = state.tree.get(node).map(|n| n.owner).unwrap_or_default();

    let request = ActionRequest {
        cmd: action.cmd.clone(),
        args: action.args.clone(),
        data: form::extract(&state.tree, node),
    };
    let origin = Origin {
        node,
        modal: owner.modal,
        followup,
        generation: state.nav.generation(),
    };

    debug!("Dispatching {:?} to {}", request.cmd, module);
    state.in_flight += 1;
    state.phase = Phase::Dispatching;
    state.busy.insert(node);
    state.status_message = None;
    state.dirty = true;

    vec![Action::Dispatch {
        module,
        request,
        origin,
    }]
}

/// Handles the server's answer to an earlier [`dispatch`].
pub fn complete(
    state: &mut AppState,
    origin: Origin,
    result: Result<ResponseEnvelope, ClientError>,
) -> Vec<Action> {
    state.in_flight = state.in_flight.saturating_sub(1);
    state.busy.remove(&origin.node);
    state.dirty = true;

    if let Some(followup) = &origin.followup {
        run_followup(state, followup);
    }

    let actions = match result {
        Err(e) => {
            warn!("Action failed: {}", e);
            state.status_message = Some("Action failed".to_string());
            Vec::new()
        }
        Ok(envelope) if !state.nav.is_current(origin.generation) => {
            debug!("Discarding {} response for a previous page", envelope.kind());
            Vec::new()
        }
        Ok(envelope) => {
            if let Some(modal) = origin.modal {
                state.close_modal(modal);
            }
            apply_response(state, envelope)
        }
    };

    state.phase = if state.in_flight > 0 {
        Phase::Dispatching
    } else {
        Phase::Idle
    };
    actions
}

fn run_followup(state: &mut AppState, followup: &Followup) {
    match followup {
        Followup::CloseMenu(id) => interaction::close_menu(state, *id),
    }
}

/// Applies one response envelope to the state.
pub fn apply_response(state: &mut AppState, envelope: ResponseEnvelope) -> Vec<Action> {
    state.phase = Phase::Applying(envelope.kind().to_string());
    match envelope {
        ResponseEnvelope::Reload | ResponseEnvelope::Update => reload(state, false),
        ResponseEnvelope::Unrecognized(kind) => {
            info!("Unrecognized response type {:?}, reloading", kind);
            reload(state, false)
        }
        ResponseEnvelope::SetArgs { args } => match state.nav.set_args(args) {
            Some(selection) => vec![Action::FetchPage(PageRequest {
                selection,
                generation: state.nav.generation(),
                fade: true,
                announce: false,
            })],
            None => Vec::new(),
        },
        ResponseEnvelope::Alert { title, text } => {
            state.push_toast(title, text, Instant::now());
            Vec::new()
        }
        ResponseEnvelope::Modal(options) => {
            state.open_modal(&options);
            Vec::new()
        }
        ResponseEnvelope::PartUpdate { id, element } => {
            let content = Catalog::new(&mut state.controllers, Scope::Page).lower(&element);
            let root = state.page_root;
            if !patch::replace_part(&mut state.tree, root, &id, content) {
                warn!("No updatable element {:?} on this page", id);
            }
            state.dirty = true;
            Vec::new()
        }
        ResponseEnvelope::Malformed { kind, reason } => {
            warn!("Malformed {:?} response: {}", kind, reason);
            Vec::new()
        }
    }
}

/// Re-fetches the current selection without touching history.
pub fn reload(state: &AppState, fade: bool) -> Vec<Action> {
    match state.nav.current() {
        Some(selection) => vec![Action::FetchPage(PageRequest {
            selection: selection.clone(),
            generation: state.nav.generation(),
            fade,
            announce: false,
        })],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::protocol::{ModalOptions, PageData};
    use crate::tree::{EventKind, Handler};
    use serde_json::json;

    fn state_with_page(elements: serde_json::Value) -> AppState {
        let mut state = AppState::new(AppConfig::default());
        state.nav.select("services", 0);
        let page: PageData =
            serde_json::from_value(json!({"title": "Services", "elements": elements})).unwrap();
        state.show_page(&page);
        state
    }

    fn button(state: &AppState) -> NodeId {
        state
            .tree
            .descendants(state.page_root)
            .into_iter()
            .find(|n| state.tree.get(*n).is_some_and(|n| n.handles(EventKind::Click)))
            .unwrap()
    }

    fn restart_form() -> serde_json::Value {
        json!({"type": "form", "options": {
            "elements": {"type": "input", "options": {"name": "unit", "value": "nginx"}},
            "actions": [{"type": "button", "options": {"text": "Restart", "action": {"cmd": "restart", "args": ["now"]}}}]
        }})
    }

    #[test]
    fn test_dispatch_collects_form_data() {
        let mut state = state_with_page(restart_form());
        let node = button(&state);
        let actions = dispatch(&mut state, node, &ActionDescriptor::new("restart", vec!["now".into()]), None);
        match &actions[..] {
            [Action::Dispatch { module, request, origin }] => {
                assert_eq!(module, "services");
                assert_eq!(request.cmd, "restart");
                assert_eq!(request.args, vec!["now"]);
                let data = serde_json::to_value(&request.data).unwrap();
                assert_eq!(data, json!({"unit": "nginx"}));
                assert_eq!(origin.node, node);
                assert_eq!(origin.generation, state.nav.generation());
            }
            other => panic!("unexpected actions {:?}", other),
        }
        assert_eq!(state.phase, Phase::Dispatching);
        assert!(state.busy.contains(&node));
    }

    #[test]
    fn test_disabled_action_is_not_sent() {
        let mut state = state_with_page(restart_form());
        let node = button(&state);
        assert!(dispatch(&mut state, node, &ActionDescriptor::default(), None).is_empty());
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = state_with_page(restart_form());
        let node = button(&state);
        let origin = match dispatch(&mut state, node, &ActionDescriptor::new("x", vec![]), None).pop() {
            Some(Action::Dispatch { origin, .. }) => origin,
            _ => unreachable!(),
        };
        state.nav.select("disks", 0);
        let actions = complete(
            &mut state,
            origin,
            Ok(ResponseEnvelope::Alert {
                title: "t".into(),
                text: "x".into(),
            }),
        );
        assert!(actions.is_empty());
        assert!(state.toasts.is_empty());
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.busy.is_empty());
    }

    #[test]
    fn test_failed_action_reports_and_settles() {
        let mut state = state_with_page(restart_form());
        let node = button(&state);
        let origin = match dispatch(&mut state, node, &ActionDescriptor::new("x", vec![]), None).pop() {
            Some(Action::Dispatch { origin, .. }) => origin,
            _ => unreachable!(),
        };
        let actions = complete(&mut state, origin, Err(ClientError::MissingToken));
        assert!(actions.is_empty());
        assert_eq!(state.status_message.as_deref(), Some("Action failed"));
        assert_eq!(state.phase, Phase::Idle);
    }

    #[test]
    fn test_set_args_fetches_with_fade() {
        let mut state = state_with_page(restart_form());
        let before = state.nav.generation();
        let actions = apply_response(&mut state, ResponseEnvelope::SetArgs { args: vec!["7".into()] });
        match &actions[..] {
            [Action::FetchPage(request)] => {
                assert_eq!(request.selection.args, vec!["7"]);
                assert!(request.fade);
                assert!(!request.announce);
                assert_eq!(request.generation, before + 1);
            }
            other => panic!("unexpected actions {:?}", other),
        }
    }

    #[test]
    fn test_reload_and_unknown_refetch_current() {
        let mut state = state_with_page(restart_form());
        let generation = state.nav.generation();
        for envelope in [
            ResponseEnvelope::Reload,
            ResponseEnvelope::Update,
            ResponseEnvelope::Unrecognized("mystery".into()),
        ] {
            match &apply_response(&mut state, envelope)[..] {
                [Action::FetchPage(request)] => {
                    assert_eq!(request.generation, generation);
                    assert!(!request.fade);
                }
                other => panic!("unexpected actions {:?}", other),
            }
        }
    }

    type Snapshot = Vec<(NodeId, String, Vec<String>, Option<String>)>;

    fn snapshot(state: &AppState) -> Snapshot {
        let tree = &state.tree;
        tree.descendants(state.page_root)
            .into_iter()
            .filter_map(|id| tree.get(id).map(|n| (id, n.tag.clone(), n.classes.clone(), n.text.clone())))
            .collect()
    }

    #[test]
    fn test_alert_adds_toast() {
        let mut state = state_with_page(restart_form());
        let before = snapshot(&state);
        let actions = apply_response(
            &mut state,
            ResponseEnvelope::Alert {
                title: "Done".into(),
                text: "Restarted".into(),
            },
        );
        assert!(actions.is_empty());
        assert_eq!(state.toasts.len(), 1);
        assert_eq!(state.toasts[0].title, "Done");
        assert_eq!(snapshot(&state), before);
    }

    #[test]
    fn test_modal_leaves_page_untouched() {
        let mut state = state_with_page(restart_form());
        let before = snapshot(&state);
        let options: ModalOptions = serde_json::from_value(json!({
            "title": {"text": "Confirm"},
            "content": {"type": "input", "options": {"name": "reason", "value": ""}},
            "actions": [{"type": "button", "options": {"text": "Yes", "action": {"cmd": "yes"}}}]
        }))
        .unwrap();
        let actions = apply_response(&mut state, ResponseEnvelope::Modal(options));
        assert!(actions.is_empty());
        assert_eq!(state.modals.len(), 1);
        assert_eq!(snapshot(&state), before);

        let modal = state.top_modal().unwrap();
        state.close_modal(modal);
        assert_eq!(snapshot(&state), before);
    }

    #[test]
    fn test_response_closes_originating_modal() {
        let mut state = state_with_page(json!({"type": "text", "options": {"text": "hi"}}));
        let options: ModalOptions = serde_json::from_value(json!({
            "title": {"text": "Confirm"},
            "content": {"type": "text", "options": {"text": "Sure?"}},
            "actions": [{"type": "button", "options": {"text": "Yes", "action": {"cmd": "yes"}}}]
        }))
        .unwrap();
        apply_response(&mut state, ResponseEnvelope::Modal(options));
        let modal = state.top_modal().unwrap();
        let yes = state
            .tree
            .descendants(modal)
            .into_iter()
            .find(|n| {
                state.tree.get(*n).is_some_and(|n| {
                    n.handlers_for(EventKind::Click)
                        .any(|h| matches!(h, Handler::Dispatch { .. }))
                })
            })
            .unwrap();
        let origin = match dispatch(&mut state, yes, &ActionDescriptor::new("yes", vec![]), None).pop() {
            Some(Action::Dispatch { origin, .. }) => origin,
            _ => unreachable!(),
        };
        assert_eq!(origin.modal, Some(modal));
        complete(
            &mut state,
            origin,
            Ok(ResponseEnvelope::Alert {
                title: "ok".into(),
                text: String::new(),
            }),
        );
        assert!(state.modals.is_empty());
        assert!(!state.tree.contains(modal));
    }

    #[test]
    fn test_part_update_replaces_container() {
        let mut state = state_with_page(json!({"type": "updated-element", "options": {
            "id": "jobs",
            "element": {"type": "text", "options": {"text": "none"}}
        }}));
        apply_response(
            &mut state,
            ResponseEnvelope::PartUpdate {
                id: "jobs".into(),
                element: serde_json::from_value(json!({"type": "text", "options": {"text": "two"}})).unwrap(),
            },
        );
        let text = state.tree.text_content(state.page_root);
        assert!(text.contains("two"));
        assert!(!text.contains("none"));
    }
}
