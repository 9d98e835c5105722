use tokio_tungstenite::tungstenite;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("login response carried no access token")]
    MissingToken,

    #[error("push channel: {0}")]
    Channel(#[from] tungstenite::Error),

    #[error("invalid handshake header: {0}")]
    InvalidHeader(#[from] tungstenite::http::header::InvalidHeaderValue),

    #[error("push channel closed: {0}")]
    Closed(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
