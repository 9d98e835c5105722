//! The push channel: one WebSocket per session.
//!
//! Inbound messages are posted to the main loop as [`AppEvent::Push`]. When the
//! socket closes or fails, a single [`AppEvent::ChannelClosed`] follows. Dropping
//! the [`PushChannel`] aborts the socket task without posting anything.

use super::error::{ClientError, Result};
use crate::app::event::{AppEvent, SessionId};
use crate::protocol::{LocationMessage, PushMessage};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Protocol version announced ahead of the token during the handshake.
pub const SUBPROTOCOL: &str = "a2";

pub struct PushChannel {
    outbound: mpsc::UnboundedSender<LocationMessage>,
    task: JoinHandle<()>,
}

impl PushChannel {
    pub fn open(
        url: String,
        token: String,
        session: SessionId,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            let reason = match run(&url, &token, session, outbound_rx, &event_tx).await {
                Ok(()) => "connection closed".to_string(),
                Err(e) => e.to_string(),
            };
            let _ = event_tx.send(AppEvent::ChannelClosed { session, reason });
        });
        Self { outbound, task }
    }

    /// Tells the server which module and arguments this client is showing.
    pub fn set_location(&self, module: String, args: Vec<String>) {
        let _ = self.outbound.send(LocationMessage { module, args });
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn handshake_request(url: &str, token: &str) -> Result<Request> {
    let mut request = url.into_client_request()?;
    let protocols = HeaderValue::from_str(&format!("{SUBPROTOCOL}, {token}"))?;
    request
        .headers_mut()
        .insert(SEC_WEBSOCKET_PROTOCOL, protocols);
    Ok(request)
}

async fn run(
    url: &str,
    token: &str,
    session: SessionId,
    mut outbound: mpsc::UnboundedReceiver<LocationMessage>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) -> Result<()> {
    let request = handshake_request(url, token)?;
    let (stream, _) = connect_async(request).await?;
    info!("Push channel connected to {}", url);
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => forward(text.as_str(), session, event_tx),
                Some(Ok(Message::Ping(data))) => write.send(Message::Pong(data)).await?,
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.as_str().to_string())
                        .unwrap_or_default();
                    return Err(ClientError::Closed(reason));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            Some(location) = outbound.recv() => {
                let text = serde_json::to_string(&location)?;
                debug!("Push channel location: {}", text);
                write.send(Message::Text(text.into())).await?;
            }
        }
    }
}

fn forward(text: &str, session: SessionId, event_tx: &mpsc::UnboundedSender<AppEvent>) {
    match serde_json::from_str::<PushMessage>(text) {
        Ok(message) => {
            debug!("Push message: {:?}", message);
            let _ = event_tx.send(AppEvent::Push { session, message });
        }
        Err(e) => warn!("Ignoring malformed push message: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_carries_token_as_subprotocol() {
        let request = handshake_request("ws://panel.local/ws", "s3cret").unwrap();
        assert_eq!(
            request.headers()[SEC_WEBSOCKET_PROTOCOL].to_str().unwrap(),
            "a2, s3cret"
        );
        assert_eq!(request.uri().path(), "/ws");
    }

    #[test]
    fn test_bad_token_header_is_error() {
        let err = handshake_request("ws://panel.local/ws", "bad\ntoken").unwrap_err();
        assert!(matches!(err, ClientError::InvalidHeader(_)));
    }

    #[test]
    fn test_forward_posts_push_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        forward(r#"{"type":"reload"}"#, 4, &tx);
        forward("not json", 4, &tx);
        match rx.try_recv().unwrap() {
            AppEvent::Push { session, message } => {
                assert_eq!(session, 4);
                assert_eq!(message, PushMessage::Reload);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }
}
