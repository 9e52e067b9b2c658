use std::time::Duration;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::error::{ReconcileError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP Basic credentials for the index service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub auth: Option<BasicAuth>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            auth: None,
        }
    }
}

/// Status and raw body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Thin wrapper over `reqwest` that speaks JSON to the index service.
pub struct IndexClient {
    http: reqwest::Client,
    auth: Option<BasicAuth>,
}

impl IndexClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| ReconcileError::configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            auth: options.auth,
        })
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url);
        if let Some(auth) = &self.auth {
            req = req.basic_auth(&auth.username, auth.password.as_ref());
        }
        req.header(CONTENT_TYPE, "application/json")
    }

    /// Existence probe; only the status code matters.
    pub async fn probe(&self, url: &str) -> Result<u16> {
        let reply = self.send(Method::GET, url, None).await?;
        Ok(reply.status)
    }

    pub async fn put(&self, url: &str) -> Result<HttpReply> {
        self.send(Method::PUT, url, None).await
    }

    pub async fn delete(&self, url: &str) -> Result<HttpReply> {
        self.send(Method::DELETE, url, None).await
    }

    pub async fn post_json(&self, url: &str, body: &Value) -> Result<HttpReply> {
        self.send(Method::POST, url, Some(body)).await
    }

    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<HttpReply> {
        tracing::debug!(%method, url, "sending request");

        let mut req = self.request(method.clone(), url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|source| ReconcileError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|source| ReconcileError::Transport {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!(%method, url, status, "received response");
        Ok(HttpReply { status, body })
    }
}
