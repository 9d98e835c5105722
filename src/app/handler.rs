use crate::app::action::{Action, PageRequest};
use crate::app::dispatch;
use crate::app::event::{AppEvent, SessionId};
use crate::app::interaction;
use crate::app::patch;
use crate::app::state::*;
use crate::client::ClientError;
use crate::protocol::{MainPage, PageData, PushMessage};
use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    match event {
        AppEvent::Terminal(cevent) => {
            state.dirty = true;
            handle_terminal(state, cevent)
        }
        AppEvent::LoginFinished(result) => handle_login(state, result),
        AppEvent::MainLoaded { session, result } => handle_main(state, session, result),
        AppEvent::PageLoaded { request, result } => {
            handle_page(state, request, result, Instant::now())
        }
        AppEvent::ActionCompleted { origin, result } => dispatch::complete(state, origin, result),
        AppEvent::Push { session, message } => handle_push(state, session, message),
        AppEvent::ChannelClosed { session, reason } => {
            if !state.owns_session(session) {
                debug!("Ignoring close of old session {}: {}", session, reason);
                return vec![];
            }
            info!("Session {} ended: {}", session, reason);
            state.end_session();
            state.status_message = Some("Connection lost".to_string());
            vec![Action::EndSession]
        }
        AppEvent::Tick => handle_tick(state, Instant::now()),
    }
}

fn handle_login(state: &mut AppState, result: Result<String, ClientError>) -> Vec<Action> {
    state.login.pending = false;
    match result {
        Ok(token) => {
            let session = state.allocate_session();
            info!("Logged in, opening session {}", session);
            state.login.invalid = false;
            state.login.password.clear();
            state.dirty = true;
            vec![
                Action::StoreCredential {
                    token: token.clone(),
                },
                Action::OpenSession { session, token },
            ]
        }
        Err(e) => {
            warn!("Login failed: {}", e);
            state.login.invalid = true;
            state.dirty = true;
            vec![]
        }
    }
}

fn handle_main(
    state: &mut AppState,
    session: SessionId,
    result: Result<MainPage, ClientError>,
) -> Vec<Action> {
    if state.pending_session != Some(session) {
        debug!("Ignoring main page of stale session {}", session);
        return vec![];
    }
    match result {
        Ok(main) => {
            info!("Session {} connected to {:?}", session, main.host_name);
            state.start_session(session, main);
            vec![]
        }
        Err(e) => {
            warn!("Failed to load main page: {}", e);
            state.end_session();
            vec![Action::EndSession]
        }
    }
}

fn handle_page(
    state: &mut AppState,
    request: PageRequest,
    result: Result<PageData, ClientError>,
    now: Instant,
) -> Vec<Action> {
    if !state.nav.is_current(request.generation) {
        debug!(
            "Discarding page {:?} from generation {}",
            request.selection.module, request.generation
        );
        return vec![];
    }
    let page = match result {
        Ok(page) => page,
        Err(e) => {
            warn!("Failed to load {}: {}", request.selection.module, e);
            state.status_message = Some("Failed to load page".to_string());
            state.dirty = true;
            return vec![];
        }
    };
    let announce = request.announce.then(|| request.selection.clone());
    let fade = Duration::from_millis(state.config.ui.fade_ms);

    if request.fade && !fade.is_zero() {
        state.transition = Some(Transition::FadeOut {
            until: now + fade,
            generation: request.generation,
            page,
            announce,
        });
        state.dirty = true;
        return vec![];
    }
    state.transition = None;
    state.show_page(&page);
    announce.map(location).into_iter().collect()
}

fn location(selection: crate::app::navigation::ModuleSelection) -> Action {
    Action::SetLocation {
        module: selection.module,
        args: selection.args,
    }
}

fn handle_push(state: &mut AppState, session: SessionId, message: PushMessage) -> Vec<Action> {
    if state.session_id() != Some(session) {
        return vec![];
    }
    match message {
        PushMessage::Reload => dispatch::reload(state, false),
        PushMessage::Update(update) => {
            let (page, overlay) = (state.page_root, state.overlay_root);
            if patch::apply_update(&mut state.tree, page, &update)
                || patch::apply_update(&mut state.tree, overlay, &update)
            {
                state.dirty = true;
            }
            vec![]
        }
        PushMessage::Unrecognized(kind) => {
            debug!("Ignoring push message {:?}", kind);
            vec![]
        }
        PushMessage::Malformed { kind, reason } => {
            warn!("Malformed push {:?}: {}", kind, reason);
            vec![]
        }
    }
}

fn handle_tick(state: &mut AppState, now: Instant) -> Vec<Action> {
    let before = state.toasts.len();
    state.toasts.retain(|t| t.expires_at > now);
    if state.toasts.len() != before {
        state.dirty = true;
    }

    let mut actions = Vec::new();
    match state.transition.take() {
        Some(Transition::FadeOut { until, generation, .. })
            if until <= now && !state.nav.is_current(generation) =>
        {
            debug!("Dropping faded page from generation {}", generation);
            state.dirty = true;
        }
        Some(Transition::FadeOut {
            until,
            page,
            announce,
            ..
        }) if until <= now => {
            state.show_page(&page);
            let fade = Duration::from_millis(state.config.ui.fade_ms);
            state.transition = Some(Transition::FadeIn { until: now + fade });
            actions.extend(announce.map(location));
            state.dirty = true;
        }
        Some(Transition::FadeIn { until }) if until <= now => {
            state.dirty = true;
        }
        other => state.transition = other,
    }
    actions
}

fn handle_terminal(state: &mut AppState, event: CEvent) -> Vec<Action> {
    match event {
        CEvent::Key(key) if key.kind != KeyEventKind::Release => handle_key(state, key),
        CEvent::Resize(_, _) => {
            state.dirty = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return vec![Action::Quit];
    }

    match state.screen {
        Screen::Login => handle_login_key(state, key),
        Screen::Main => handle_main_key(state, key),
    }
}

fn handle_login_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    if state.login.pending {
        return vec![];
    }
    let form = &mut state.login;
    match key.code {
        KeyCode::Enter => match form.field {
            LoginField::Login => {
                form.field = LoginField::Password;
                vec![]
            }
            LoginField::Password => {
                form.pending = true;
                form.invalid = false;
                vec![Action::Login {
                    login: form.login.text.clone(),
                    password: form.password.text.clone(),
                }]
            }
        },
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.field = match form.field {
                LoginField::Login => LoginField::Password,
                LoginField::Password => LoginField::Login,
            };
            vec![]
        }
        KeyCode::Char(c) => {
            form.active_mut().insert_char(c);
            vec![]
        }
        KeyCode::Backspace => {
            form.active_mut().delete_back();
            vec![]
        }
        KeyCode::Delete => {
            form.active_mut().delete_forward();
            vec![]
        }
        KeyCode::Left => {
            form.active_mut().move_left();
            vec![]
        }
        KeyCode::Right => {
            form.active_mut().move_right();
            vec![]
        }
        KeyCode::Home => {
            form.active_mut().move_home();
            vec![]
        }
        KeyCode::End => {
            form.active_mut().move_end();
            vec![]
        }
        _ => vec![],
    }
}

fn handle_main_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl && key.code == KeyCode::Char('l') {
        info!("Logging out");
        state.end_session();
        return vec![Action::EndSession];
    }
    if key.code == KeyCode::F(5) {
        return dispatch::reload(state, false);
    }
    if alt && matches!(key.code, KeyCode::Left | KeyCode::Right) {
        let entry = if key.code == KeyCode::Left {
            state.nav.back()
        } else {
            state.nav.forward()
        };
        debug!(
            "History move to {:?} ({} entries)",
            entry.as_ref().map(|s| s.module.as_str()),
            state.nav.history_len()
        );
        return entry
            .map(|selection| {
                Action::FetchPage(PageRequest {
                    selection,
                    generation: state.nav.generation(),
                    fade: true,
                    announce: false,
                })
            })
            .into_iter()
            .collect();
    }

    match state.focus {
        FocusPanel::Modules => handle_sidebar_key(state, key),
        FocusPanel::Page => handle_page_key(state, key),
    }
}

fn handle_sidebar_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let count = state.sidebar_entries().len();
    match key.code {
        KeyCode::Up => {
            state.sidebar_cursor = state.sidebar_cursor.saturating_sub(1);
            vec![]
        }
        KeyCode::Down => {
            if state.sidebar_cursor + 1 < count {
                state.sidebar_cursor += 1;
            }
            vec![]
        }
        KeyCode::Enter => select_module(state),
        KeyCode::Tab | KeyCode::Right => {
            state.focus = FocusPanel::Page;
            vec![]
        }
        _ => vec![],
    }
}

/// Navigates to the sidebar entry under the cursor.
fn select_module(state: &mut AppState) -> Vec<Action> {
    let Some(entry) = state.sidebar_entries().into_iter().nth(state.sidebar_cursor) else {
        return vec![];
    };
    let selection = state.nav.select(&entry.module, entry.sub_module);
    state.focus = FocusPanel::Page;
    state.status_message = None;
    vec![Action::FetchPage(PageRequest {
        selection,
        generation: state.nav.generation(),
        fade: true,
        announce: true,
    })]
}

fn handle_page_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Tab => interaction::focus_step(state, 1),
        KeyCode::BackTab => interaction::focus_step(state, -1),
        KeyCode::Enter => interaction::activate(state, ctrl),
        KeyCode::Esc => {
            if !interaction::dismiss(state) {
                state.focus = FocusPanel::Modules;
            }
            vec![]
        }
        KeyCode::Left => interaction::cycle_option(state, -1),
        KeyCode::Right => interaction::cycle_option(state, 1),
        KeyCode::Backspace => interaction::backspace(state),
        KeyCode::Char(c) if !ctrl => interaction::type_char(state, c),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::protocol::{ElementUpdate, PluginInfo};
    use serde_json::json;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Terminal(CEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn main_state() -> AppState {
        let mut state = AppState::new(AppConfig::default());
        let session = state.allocate_session();
        handle_event(
            &mut state,
            AppEvent::MainLoaded {
                session,
                result: Ok(MainPage {
                    host_name: "nas".into(),
                    host_badge_color: "info".into(),
                    plugins: Some(vec![
                        PluginInfo {
                            id: "services".into(),
                            title: "Services".into(),
                            ..Default::default()
                        },
                        PluginInfo {
                            id: "disks".into(),
                            title: "Disks".into(),
                            ..Default::default()
                        },
                    ]),
                }),
            },
        );
        state
    }

    fn page(v: serde_json::Value) -> PageData {
        serde_json::from_value(v).unwrap()
    }

    fn fetch(actions: Vec<Action>) -> PageRequest {
        match actions.into_iter().next() {
            Some(Action::FetchPage(request)) => request,
            other => panic!("expected a page fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_login_flow() {
        let mut state = AppState::new(AppConfig::default());
        for c in "root".chars() {
            handle_event(&mut state, key(KeyCode::Char(c)));
        }
        assert!(handle_event(&mut state, key(KeyCode::Enter)).is_empty());
        assert_eq!(state.login.field, LoginField::Password);
        handle_event(&mut state, key(KeyCode::Char('x')));
        match &handle_event(&mut state, key(KeyCode::Enter))[..] {
            [Action::Login { login, password }] => {
                assert_eq!(login, "root");
                assert_eq!(password, "x");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(state.login.pending);

        let actions = handle_event(&mut state, AppEvent::LoginFinished(Ok("tok".into())));
        assert!(matches!(actions[0], Action::StoreCredential { .. }));
        assert!(matches!(actions[1], Action::OpenSession { .. }));
        assert!(state.pending_session.is_some());
    }

    #[test]
    fn test_rejected_login_marks_fields_invalid() {
        let mut state = AppState::new(AppConfig::default());
        state.login.pending = true;
        let actions = handle_event(
            &mut state,
            AppEvent::LoginFinished(Err(ClientError::Status(reqwest::StatusCode::FORBIDDEN))),
        );
        assert!(actions.is_empty());
        assert!(state.login.invalid);
        assert!(!state.login.pending);
        assert_eq!(state.screen, Screen::Login);
    }

    #[test]
    fn test_stale_main_page_is_ignored() {
        let mut state = AppState::new(AppConfig::default());
        let old = state.allocate_session();
        state.allocate_session();
        handle_event(
            &mut state,
            AppEvent::MainLoaded {
                session: old,
                result: Ok(MainPage::default()),
            },
        );
        assert_eq!(state.screen, Screen::Login);
    }

    #[test]
    fn test_selecting_module_fetches_and_announces() {
        let mut state = main_state();
        handle_event(&mut state, key(KeyCode::Down));
        let request = fetch(handle_event(&mut state, key(KeyCode::Enter)));
        assert_eq!(request.selection.module, "disks");
        assert!(request.fade && request.announce);
        assert_eq!(state.focus, FocusPanel::Page);

        let now = Instant::now();
        let actions = handle_page(
            &mut state,
            request,
            Ok(page(json!({"title": "Disks", "elements": {"type": "text", "options": {"text": "sda"}}}))),
            now,
        );
        assert!(actions.is_empty());
        assert!(state.is_fading());

        let actions = handle_tick(&mut state, now + Duration::from_secs(1));
        assert!(matches!(&actions[..], [Action::SetLocation { module, .. }] if module == "disks"));
        assert_eq!(state.page_title, "Disks");
        handle_tick(&mut state, now + Duration::from_secs(2));
        assert!(!state.is_fading());
    }

    #[test]
    fn test_selection_during_fade_drops_faded_page() {
        let mut state = main_state();
        let request = fetch(handle_event(&mut state, key(KeyCode::Enter)));
        assert_eq!(request.selection.module, "services");
        let now = Instant::now();
        handle_page(
            &mut state,
            request,
            Ok(page(json!({"title": "Services", "elements": {"type": "text", "options": {"text": "web"}}}))),
            now,
        );
        assert!(state.is_fading());

        handle_event(&mut state, key(KeyCode::Esc));
        handle_event(&mut state, key(KeyCode::Down));
        let next = fetch(handle_event(&mut state, key(KeyCode::Enter)));
        assert_eq!(next.selection.module, "disks");

        let actions = handle_tick(&mut state, now + Duration::from_secs(1));
        assert!(actions.is_empty());
        assert!(state.page_title.is_empty());
        assert!(!state.is_fading());
        assert_eq!(state.nav.current().map(|s| s.module.as_str()), Some("disks"));
    }

    #[test]
    fn test_page_from_older_generation_is_dropped() {
        let mut state = main_state();
        let first = fetch(handle_event(&mut state, key(KeyCode::Enter)));
        handle_event(&mut state, key(KeyCode::Esc));
        handle_event(&mut state, key(KeyCode::Down));
        let second = fetch(handle_event(&mut state, key(KeyCode::Enter)));
        assert!(second.generation > first.generation);

        handle_page(
            &mut state,
            first,
            Ok(page(json!({"title": "Services", "elements": {"type": "text", "options": {"text": "old"}}}))),
            Instant::now(),
        );
        assert!(state.page_title.is_empty());
        assert!(!state.is_fading());
    }

    #[test]
    fn test_history_keys() {
        let mut state = main_state();
        fetch(handle_event(&mut state, key(KeyCode::Enter)));
        state.focus = FocusPanel::Modules;
        handle_event(&mut state, key(KeyCode::Down));
        fetch(handle_event(&mut state, key(KeyCode::Enter)));

        let alt_left = AppEvent::Terminal(CEvent::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT)));
        let request = fetch(handle_event(&mut state, alt_left));
        assert_eq!(request.selection.module, "services");
        assert!(!request.announce);
    }

    #[test]
    fn test_push_progress_patch_and_reload() {
        let mut state = main_state();
        let request = fetch(handle_event(&mut state, key(KeyCode::Enter)));
        state.config.ui.fade_ms = 0;
        handle_page(
            &mut state,
            request,
            Ok(page(json!({"title": "Jobs", "elements": {"type": "progress", "options": {"id": "p", "value": 0}}}))),
            Instant::now(),
        );
        let session = state.session_id().unwrap();
        handle_event(
            &mut state,
            AppEvent::Push {
                session,
                message: PushMessage::Update(ElementUpdate {
                    id: "p".into(),
                    element: "progress".into(),
                    data: json!({"value": 40}),
                }),
            },
        );
        let bar = state
            .tree
            .descendants(state.page_root)
            .into_iter()
            .find(|n| state.tree.get(*n).unwrap().has_class("progress-bar"))
            .unwrap();
        assert_eq!(state.tree.get(bar).unwrap().attr("style"), Some("width: 40%"));

        let reload = fetch(handle_event(
            &mut state,
            AppEvent::Push {
                session,
                message: PushMessage::Reload,
            },
        ));
        assert!(!reload.fade);

        assert!(handle_event(
            &mut state,
            AppEvent::Push {
                session: session + 1,
                message: PushMessage::Reload,
            },
        )
        .is_empty());
    }

    #[test]
    fn test_channel_close_returns_to_login() {
        let mut state = main_state();
        let session = state.session_id().unwrap();
        let actions = handle_event(
            &mut state,
            AppEvent::ChannelClosed {
                session,
                reason: "bye".into(),
            },
        );
        assert!(matches!(&actions[..], [Action::EndSession]));
        assert_eq!(state.screen, Screen::Login);

        // a late close from the same session changes nothing
        assert!(handle_event(
            &mut state,
            AppEvent::ChannelClosed {
                session,
                reason: "again".into(),
            },
        )
        .is_empty());
    }

    #[test]
    fn test_toasts_expire_on_tick() {
        let mut state = main_state();
        let now = Instant::now();
        state.push_toast("Saved".into(), String::new(), now);
        handle_tick(&mut state, now + Duration::from_millis(100));
        assert_eq!(state.toasts.len(), 1);
        handle_tick(&mut state, now + Duration::from_secs(10));
        assert!(state.toasts.is_empty());
    }
}
