mod layout;
mod login;
mod modal;
mod modules;
mod page;
mod status_bar;
mod theme;
mod toasts;

use crate::app::state::{AppState, Screen};
use ratatui::prelude::*;

pub fn render(frame: &mut Frame, state: &AppState) {
    match state.screen {
        Screen::Login => login::render(frame, state),
        Screen::Main => {
            let app_layout = layout::compute_layout(frame.area());
            modules::render(frame, app_layout.sidebar, state);
            page::render(frame, app_layout.page, state);
            status_bar::render(frame, app_layout.status_bar, state);
            modal::render(frame, state);
        }
    }
    toasts::render(frame, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::FocusPanel;
    use crate::config::AppConfig;
    use crate::protocol::{MainPage, ModalOptions, PageData};
    use ratatui::backend::TestBackend;
    use serde_json::json;
    use std::time::Instant;

    fn draw(state: &AppState) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn main_state() -> AppState {
        let mut state = AppState::new(AppConfig::default());
        let main: MainPage = serde_json::from_value(json!({
            "host-name": "nas-01",
            "host-badge-color": "success",
            "plugins": [
                {"id": "services", "title": "Services", "icon": "bi-gear",
                 "sub-pages": [{"title": "Overview"}, {"title": "Timers"}]},
                {"id": "disks", "title": "Disks", "icon": "bi-hdd"}
            ]
        }))
        .unwrap();
        let id = state.allocate_session();
        state.start_session(id, main);
        state.nav.select("services", 0);
        let page: PageData = serde_json::from_value(json!({
            "title": "Services",
            "elements": {"type": "text", "options": {"text": "All units running"}}
        }))
        .unwrap();
        state.show_page(&page);
        state
    }

    #[test]
    fn test_login_screen_renders_fields() {
        let mut state = AppState::new(AppConfig::default());
        state.login.password.text = "hunter2".into();
        state.login.password.cursor = 7;
        let content = draw(&state);
        assert!(content.contains("Log in"));
        assert!(content.contains("Login"));
        assert!(content.contains("*******"));
        assert!(!content.contains("hunter2"));
    }

    #[test]
    fn test_invalid_login_shows_hint() {
        let mut state = AppState::new(AppConfig::default());
        state.login.invalid = true;
        assert!(draw(&state).contains("Invalid login or password"));
    }

    #[test]
    fn test_main_screen_shows_sidebar_page_and_status() {
        let state = main_state();
        let content = draw(&state);
        assert!(content.contains("nas-01"));
        assert!(content.contains("Services"));
        assert!(content.contains("Disks"));
        assert!(content.contains("Timers"));
        assert!(content.contains("All units running"));
        assert!(content.contains("[PAGE]") || content.contains("[MODULES]"));
    }

    #[test]
    fn test_modal_and_toast_overlay_page() {
        let mut state = main_state();
        state.focus = FocusPanel::Page;
        let options: ModalOptions = serde_json::from_value(json!({
            "title": {"text": "Confirm restart"},
            "content": {"type": "text", "options": {"text": "Restart nginx?"}},
            "actions": [{"type": "button", "options": {"text": "Yes", "action": {"cmd": "yes"}}}]
        }))
        .unwrap();
        state.open_modal(&options);
        state.push_toast("Saved".into(), "Settings stored".into(), Instant::now());
        let content = draw(&state);
        assert!(content.contains("Confirm restart"));
        assert!(content.contains("Restart nginx?"));
        assert!(content.contains("[ Yes ]"));
        assert!(content.contains("[MODAL]"));
        assert!(content.contains("Settings stored"));
    }
}
