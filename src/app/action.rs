use crate::app::dispatch::Origin;
use crate::app::event::SessionId;
use crate::app::navigation::ModuleSelection;
use crate::protocol::ActionRequest;

/// A page fetch, tagged with the navigation generation it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub selection: ModuleSelection,
    pub generation: u64,
    /// Cross-fade from the old page instead of swapping immediately.
    pub fade: bool,
    /// Report the new location on the push channel once shown.
    pub announce: bool,
}

/// Side effects requested by the handler and executed by the main loop.
#[derive(Debug)]
pub enum Action {
    Login { login: String, password: String },
    OpenSession { session: SessionId, token: String },
    StoreCredential { token: String },
    /// Forget the stored token and close the push channel.
    EndSession,
    FetchPage(PageRequest),
    Dispatch { module: String, request: ActionRequest, origin: Origin },
    SetLocation { module: String, args: Vec<String> },
    Quit,
}
