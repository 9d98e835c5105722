use crate::app::dispatch::Phase;
use crate::app::event::SessionId;
use crate::app::navigation::Navigator;
use crate::catalog::{overlay, Catalog, Controllers, Scope};
use crate::config::AppConfig;
use crate::protocol::{MainPage, ModalOptions, PageData, PluginInfo};
use crate::tree::{self, ContainerDescription, NodeId, Tree};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Default)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn delete_back(&mut self) {
        if self.cursor > 0 {
            let prev = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.text.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.text.len() {
            let next = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
            self.text.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.text[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Login,
    Password,
}

#[derive(Debug)]
pub struct LoginForm {
    pub login: InputState,
    pub password: InputState,
    pub field: LoginField,
    /// Last attempt was rejected; both fields are shown as invalid.
    pub invalid: bool,
    pub pending: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            login: InputState::new(),
            password: InputState::new(),
            field: LoginField::Login,
            invalid: false,
            pending: false,
        }
    }

    pub fn active_mut(&mut self) -> &mut InputState {
        match self.field {
            LoginField::Login => &mut self.login,
            LoginField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub host_name: String,
    pub host_badge_color: String,
    pub plugins: Vec<PluginInfo>,
}

/// One line of the module sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub module: String,
    pub sub_module: usize,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub enum Transition {
    /// Old page fading out; `page` replaces it when the fade ends.
    FadeOut {
        until: Instant,
        /// Selection generation the page was fetched for.
        generation: u64,
        page: PageData,
        announce: Option<crate::app::navigation::ModuleSelection>,
    },
    FadeIn {
        until: Instant,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenModal {
    pub key: u32,
    pub node: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPanel {
    Modules,
    Page,
}

pub struct AppState {
    pub config: AppConfig,
    pub screen: Screen,
    pub login: LoginForm,
    pub session: Option<Session>,
    pub pending_session: Option<SessionId>,
    pub next_session_id: SessionId,
    pub nav: Navigator,
    pub tree: Tree,
    pub page_root: NodeId,
    pub overlay_root: NodeId,
    pub controllers: Controllers,
    pub modals: Vec<OpenModal>,
    pub next_modal_key: u32,
    pub page_title: String,
    pub toasts: Vec<Toast>,
    pub transition: Option<Transition>,
    pub phase: Phase,
    pub in_flight: usize,
    /// Controls whose action is awaiting a response.
    pub busy: HashSet<NodeId>,
    /// Node that kept logical focus while the cursor moved onto a focus-retaining control.
    pub held_focus: Option<NodeId>,
    pub focus: FocusPanel,
    pub sidebar_cursor: usize,
    pub should_quit: bool,
    pub dirty: bool,
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let mut tree = Tree::new();
        let page_root = tree.create_root("main");
        let overlay_root = tree.create_root("body");
        Self {
            config,
            screen: Screen::Login,
            login: LoginForm::new(),
            session: None,
            pending_session: None,
            next_session_id: 0,
            nav: Navigator::new(),
            tree,
            page_root,
            overlay_root,
            controllers: Controllers::new(),
            modals: Vec::new(),
            next_modal_key: 0,
            page_title: String::new(),
            toasts: Vec::new(),
            transition: None,
            phase: Phase::Idle,
            in_flight: 0,
            busy: HashSet::new(),
            held_focus: None,
            focus: FocusPanel::Modules,
            sidebar_cursor: 0,
            should_quit: false,
            dirty: true,
            status_message: None,
        }
    }

    /// Reserves an id for a session that is being opened.
    pub fn allocate_session(&mut self) -> SessionId {
        self.next_session_id += 1;
        self.pending_session = Some(self.next_session_id);
        self.next_session_id
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Whether `id` is the live or the opening session.
    pub fn owns_session(&self, id: SessionId) -> bool {
        self.session_id() == Some(id) || self.pending_session == Some(id)
    }

    pub fn start_session(&mut self, id: SessionId, main: MainPage) {
        self.pending_session = None;
        self.session = Some(Session {
            id,
            host_name: main.host_name,
            host_badge_color: main.host_badge_color,
            plugins: main.plugins.unwrap_or_default(),
        });
        self.screen = Screen::Main;
        self.focus = FocusPanel::Modules;
        self.sidebar_cursor = 0;
        self.login.pending = false;
        self.dirty = true;
    }

    /// Drops everything tied to the session and returns to the login screen.
    pub fn end_session(&mut self) {
        self.session = None;
        self.pending_session = None;
        self.screen = Screen::Login;
        self.login.pending = false;
        self.nav.reset();
        tree::clear(&mut self.tree, self.page_root);
        tree::clear(&mut self.tree, self.overlay_root);
        self.controllers = Controllers::new();
        self.modals.clear();
        self.page_title.clear();
        self.toasts.clear();
        self.transition = None;
        self.phase = Phase::Idle;
        self.in_flight = 0;
        self.busy.clear();
        self.held_focus = None;
        self.focus = FocusPanel::Modules;
        self.dirty = true;
    }

    pub fn sidebar_entries(&self) -> Vec<SidebarEntry> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let mut entries = Vec::new();
        for plugin in &session.plugins {
            entries.push(SidebarEntry {
                module: plugin.id.clone(),
                sub_module: 0,
                title: plugin.title.clone(),
                icon: plugin.icon.clone(),
            });
            for (i, sub) in plugin.sub_pages.iter().flatten().enumerate() {
                entries.push(SidebarEntry {
                    module: plugin.id.clone(),
                    sub_module: i + 1,
                    title: sub.title.clone(),
                    icon: String::new(),
                });
            }
        }
        entries
    }

    /// Rebuilds the page subtree from scratch.
    pub fn show_page(&mut self, page: &PageData) {
        tree::clear(&mut self.tree, self.page_root);
        self.controllers.drop_scope(Scope::Page);
        self.page_title = page.title.clone();

        let mut catalog = Catalog::new(&mut self.controllers, Scope::Page);
        let body = catalog.lower(&page.elements);
        let desc = ContainerDescription::new("div")
            .class("page")
            .child(ContainerDescription::new("h2").with_text(page.title.clone()))
            .children(body);
        tree::render(&mut self.tree, desc, self.page_root);

        self.forget_dead_nodes();
        debug!("Rendered page {:?} ({} nodes)", page.title, self.tree.len());
        self.dirty = true;
    }

    pub fn open_modal(&mut self, options: &ModalOptions) -> NodeId {
        let key = self.next_modal_key;
        self.next_modal_key = self.next_modal_key.wrapping_add(1);
        let desc = overlay::modal(
            &mut Catalog::new(&mut self.controllers, Scope::Modal(key)),
            options,
        );
        let node = tree::render(&mut self.tree, desc, self.overlay_root);
        self.modals.push(OpenModal { key, node });
        self.tree.set_focus(None);
        self.held_focus = None;
        self.dirty = true;
        node
    }

    pub fn close_modal(&mut self, node: NodeId) {
        let Some(index) = self.modals.iter().position(|m| m.node == node) else {
            return;
        };
        let modal = self.modals.remove(index);
        tree::remove(&mut self.tree, modal.node);
        self.controllers.drop_scope(Scope::Modal(modal.key));
        self.forget_dead_nodes();
        self.dirty = true;
    }

    pub fn top_modal(&self) -> Option<NodeId> {
        self.modals.last().map(|m| m.node)
    }

    /// Root of the subtree that currently receives input.
    pub fn interaction_root(&self) -> NodeId {
        self.top_modal().unwrap_or(self.page_root)
    }

    pub fn push_toast(&mut self, title: String, text: String, now: Instant) {
        let lifetime = Duration::from_millis(self.config.ui.toast_lifetime_ms);
        self.toasts.push(Toast {
            title,
            text,
            expires_at: now + lifetime,
        });
        self.dirty = true;
    }

    pub fn is_fading(&self) -> bool {
        self.transition.is_some()
    }

    fn forget_dead_nodes(&mut self) {
        let tree = &self.tree;
        self.busy.retain(|n| tree.contains(*n));
        if self.held_focus.is_some_and(|n| !tree.contains(n)) {
            self.held_focus = None;
        }
    }

    pub fn status_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(session) = &self.session {
            parts.push(session.host_name.clone());
        }
        if let Some(selection) = self.nav.current() {
            let mut location = selection.module.clone();
            if selection.sub_module > 0 {
                location.push_str(&format!(" › {}", selection.sub_module));
            }
            if !selection.args.is_empty() {
                location.push_str(&format!(" [{}]", selection.args.join(", ")));
            }
            parts.push(location);
        }
        match &self.phase {
            Phase::Idle => {}
            Phase::Dispatching => parts.push(format!("working ({})", self.in_flight)),
            Phase::Applying(kind) => parts.push(format!("applying {}", kind)),
        }
        if let Some(msg) = &self.status_message {
            parts.push(msg.clone());
        }
        parts.join(" | ")
    }
}
