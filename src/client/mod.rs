//! Network side: the HTTP API and the push channel.

pub mod api;
pub mod channel;
pub mod error;

pub use api::ApiClient;
pub use channel::PushChannel;
pub use error::ClientError;
