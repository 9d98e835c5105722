//! HTTP side of the panel protocol.

use super::error::{ClientError, Result};
use crate::protocol::{
    ActionRequest, LoginRequest, LoginResponse, MainPage, PageData, RenderRequest,
    ResponseEnvelope,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const TOKEN_HEADER: &str = "X-access-token";

/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// `ws://` / `wss://` address of the push channel.
    pub fn channel_url(&self) -> String {
        let base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{base}/ws")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<R: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<R> {
        let request = match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::Status(status));
        }
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R> {
        debug!("POST {}", path);
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    /// Exchanges credentials for an access token.
    pub async fn login(&self, login: &str, password: &str) -> Result<String> {
        let response: LoginResponse = self
            .post("/api/login", &LoginRequest { login, password })
            .await?;
        response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingToken)
    }

    pub async fn main_page(&self) -> Result<MainPage> {
        debug!("GET /api/main");
        self.send(self.http.get(self.url("/api/main"))).await
    }

    pub async fn page(&self, module: &str, sub_mod: usize, args: &[String]) -> Result<PageData> {
        self.post(
            &format!("/api/plugins/{module}"),
            &RenderRequest { sub_mod, args },
        )
        .await
    }

    /// An empty or `null` body is a plain reload.
    pub async fn action(&self, module: &str, request: &ActionRequest) -> Result<ResponseEnvelope> {
        let envelope: Option<ResponseEnvelope> = self
            .post(&format!("/api/plugins/{module}/action"), request)
            .await?;
        Ok(envelope.unwrap_or_default())
    }
}
