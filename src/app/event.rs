use crate::app::action::PageRequest;
use crate::app::dispatch::Origin;
use crate::client::ClientError;
use crate::protocol::{MainPage, PageData, PushMessage, ResponseEnvelope};
use crossterm::event::Event as CrosstermEvent;

/// Identifies one login session; results tagged with an older id are ignored.
pub type SessionId = u64;

#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Terminal(CrosstermEvent),

    /// Login request finished; carries the access token on success
    LoginFinished(Result<String, ClientError>),

    /// Main page (host name and module list) fetched for a session
    MainLoaded {
        session: SessionId,
        result: Result<MainPage, ClientError>,
    },

    /// Page content fetched for a module selection
    PageLoaded {
        request: PageRequest,
        result: Result<PageData, ClientError>,
    },

    /// Server answered a dispatched action
    ActionCompleted {
        origin: Origin,
        result: Result<ResponseEnvelope, ClientError>,
    },

    /// Message received on the push channel
    Push {
        session: SessionId,
        message: PushMessage,
    },

    /// Push channel closed or failed
    ChannelClosed {
        session: SessionId,
        reason: String,
    },

    /// Tick for toasts and fades
    Tick,
}
