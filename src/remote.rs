//! HTTP access to the remote archive.
//!
//! Everything that talks to the network goes through [`Remote`], so the
//! manifest resolver and fetcher can be driven by an in-memory archive in
//! tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct RemoteError(pub String);

pub type BodyStream = BoxStream<'static, Result<Bytes, RemoteError>>;

/// Status plus a body that has not been read yet.
pub struct RemoteResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Drains the body into a string. Only for small documents such as
    /// manifests.
    pub async fn text(self) -> Result<String, RemoteError> {
        let chunks: Vec<Bytes> = self.body.try_collect().await?;
        let bytes = chunks.concat();

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[async_trait]
pub trait Remote: Send + Sync {
    async fn get(&self, url: &str) -> Result<RemoteResponse, RemoteError>;
}

/// [`Remote`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpRemote {
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new() -> Self {
        HttpRemote {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Remote for HttpRemote {
    async fn get(&self, url: &str) -> Result<RemoteResponse, RemoteError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RemoteError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| RemoteError(format!("Error reading chunk: {}", e))))
            .boxed();

        Ok(RemoteResponse { status, body })
    }
}
