// Backend API client

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong between sending a prompt and getting a reply.
///
/// The `Display` output is what the user sees in the error bubble.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("{0}")]
    Transport(String),
    #[error("Sorry, we couldn't connect. The server responded with status: {0}")]
    Status(u16),
    #[error("{0}")]
    Backend(String),
    #[error("The server sent a response we couldn't read: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Sends one prompt and resolves to the generated reply.
///
/// The returned future owns everything it needs so it can be spawned.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn query(&self, prompt: &str) -> BoxFuture<'static, Result<String, QueryError>>;
}

/// Body returned by `GET /query`.
#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl QueryResponse {
    /// An `error` field wins over `response`, whatever the HTTP status was.
    pub fn into_reply(self) -> Result<String, QueryError> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(QueryError::Backend(error));
        }

        match self.response {
            Some(reply) if !reply.is_empty() => Ok(reply),
            _ => Err(QueryError::Malformed("missing reply".to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: Client,
}

impl BackendClient {
    pub fn new(base_url: &str, request_timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }

    pub async fn send_query(&self, prompt: &str) -> Result<String, QueryError> {
        let response = self
            .client
            .get(self.query_url())
            .query(&[("prompt", prompt)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status(status.as_u16()));
        }

        response
            .json::<QueryResponse>()
            .await
            .map_err(|e| QueryError::Malformed(e.to_string()))?
            .into_reply()
    }
}

impl Transport for BackendClient {
    fn query(&self, prompt: &str) -> BoxFuture<'static, Result<String, QueryError>> {
        let client = self.clone();
        let prompt = prompt.to_string();
        Box::pin(async move { client.send_query(&prompt).await })
    }
}
