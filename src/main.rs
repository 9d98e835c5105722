mod app;
mod catalog;
mod client;
mod config;
mod logging;
mod protocol;
mod tree;
mod ui;

use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::handler;
use crate::app::state::*;
use crate::client::{ApiClient, PushChannel};
use crate::config::CredentialStore;
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    // Load config, writing the defaults on first run
    let cfg = config::load_config()?;
    if !config::config_path().exists() {
        if let Err(e) = config::save_config(&cfg) {
            eprintln!("Could not write default config: {:#}", e);
        }
    }
    if let Err(e) = logging::init(&cfg.logging) {
        eprintln!("Logging disabled: {:#}", e);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, cfg).await;

    // Restore terminal
    restore_terminal()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Executes handler actions: network requests, the push channel and the token file.
struct Runtime {
    api: ApiClient,
    channel: Option<PushChannel>,
    credentials: CredentialStore,
    event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Runtime {
    fn execute(&mut self, state: &mut AppState, action: Action) {
        match action {
            Action::Login { login, password } => {
                let api = self.api.clone();
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let result = api.login(&login, &password).await;
                    let _ = tx.send(AppEvent::LoginFinished(result));
                });
            }
            Action::OpenSession { session, token } => {
                self.api.set_token(Some(token.clone()));
                self.channel = Some(PushChannel::open(
                    self.api.channel_url(),
                    token,
                    session,
                    self.event_tx.clone(),
                ));
                let api = self.api.clone();
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let result = api.main_page().await;
                    let _ = tx.send(AppEvent::MainLoaded { session, result });
                });
            }
            Action::StoreCredential { token } => {
                if let Err(e) = self.credentials.store(&token) {
                    warn!("Failed to store token: {:#}", e);
                }
            }
            Action::EndSession => {
                self.channel = None;
                self.api.set_token(None);
                if let Err(e) = self.credentials.forget() {
                    warn!("Failed to forget token: {:#}", e);
                }
            }
            Action::FetchPage(request) => {
                let api = self.api.clone();
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let selection = &request.selection;
                    let result = api
                        .page(&selection.module, selection.sub_module, &selection.args)
                        .await;
                    let _ = tx.send(AppEvent::PageLoaded { request, result });
                });
            }
            Action::Dispatch {
                module,
                request,
                origin,
            } => {
                let api = self.api.clone();
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let result = api.action(&module, &request).await;
                    let _ = tx.send(AppEvent::ActionCompleted { origin, result });
                });
            }
            Action::SetLocation { module, args } => {
                if let Some(channel) = &self.channel {
                    channel.set_location(module, args);
                }
            }
            Action::Quit => {
                state.should_quit = true;
            }
        }
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: config::AppConfig,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let mut state = AppState::new(cfg.clone());
    let mut runtime = Runtime {
        api: ApiClient::new(
            &cfg.server.url,
            Duration::from_secs(cfg.server.request_timeout_secs),
        ),
        channel: None,
        credentials: CredentialStore::default_location(),
        event_tx: event_tx.clone(),
    };

    // Spawn terminal input task
    let term_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(event)) => {
                    if term_tx.send(AppEvent::Terminal(event)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
            }
        }
    });

    // Spawn tick task
    let tick_tx = event_tx.clone();
    let tick = Duration::from_millis(cfg.ui.tick_ms.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    // Resume a stored session, if any
    match runtime.credentials.load() {
        Ok(Some(token)) => {
            let session = state.allocate_session();
            info!("Resuming stored session against {}", cfg.server.url);
            state.login.pending = true;
            runtime.execute(&mut state, Action::OpenSession { session, token });
        }
        Ok(None) => info!("No stored token, showing login"),
        Err(e) => warn!(
            "Failed to read stored token from {}: {:#}",
            runtime.credentials.path().display(),
            e
        ),
    }

    // Initial render
    terminal.draw(|f| ui::render(f, &state))?;

    // Main event loop
    loop {
        let event = event_rx.recv().await;
        let Some(event) = event else { break };

        let actions = handler::handle_event(&mut state, event);
        for action in actions {
            runtime.execute(&mut state, action);
        }

        if state.should_quit {
            break;
        }

        // Conditional render (only if dirty)
        if state.dirty {
            terminal.draw(|f| ui::render(f, &state))?;
            state.dirty = false;
        }
    }

    Ok(())
}
