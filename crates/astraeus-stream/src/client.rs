//! HTTP client for the insights backend

use std::pin::Pin;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use tokio_stream::Stream;

use crate::{
    decoder::decode_data_stream,
    error::{Error, Result},
};

/// A stream of decoded text payloads for one in-flight response.
///
/// Single consumption per request; not restartable.
pub type PayloadStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Source of streamed answers, the seam between the turn manager and the
/// network. Tests substitute canned implementations.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Issue one query and return its payload stream.
    async fn stream_query(&self, query: &str) -> Result<PayloadStream>;
}

/// Request body sent to the backend.
#[derive(Debug, Serialize)]
struct InsightsQuery<'a> {
    query: &'a str,
}

/// HTTP implementation of [`Backend`].
///
/// Parameterized by a target endpoint string; endpoint selection (which
/// dataset to query) is the caller's concern.
pub struct InsightsClient {
    client: reqwest::Client,
    endpoint: String,
}

impl InsightsClient {
    /// Create a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a client reusing an existing connection pool.
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// The endpoint this client posts queries to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Backend for InsightsClient {
    async fn stream_query(&self, query: &str) -> Result<PayloadStream> {
        tracing::debug!("posting query to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&InsightsQuery { query })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::status(status.as_u16()));
        }

        let bytes = response.bytes_stream().map(|r| r.map_err(Error::from));
        Ok(Box::pin(decode_data_stream(bytes)))
    }
}
