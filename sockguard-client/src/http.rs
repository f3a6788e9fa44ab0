//! reqwest implementation of [`SockApi`].

use crate::{accept, ApiError, Result, SockApi};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use sockguard_core::wire::{Ack, HistoryEnvelope, StatsEnvelope, ToggleAck};
use sockguard_core::{NewSock, Priority, Sock, SockId, StatsReport, WashRecord};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a live sockguard backend.
#[derive(Debug, Clone)]
pub struct HttpSockApi {
    base: Url,
    client: Client,
}

impl HttpSockApi {
    /// Create a client for the server at `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sockguard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {e}")))?;

        Self::with_client(base_url, client)
    }

    /// Create a client around an existing reqwest [`Client`].
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid base URL {base_url}: {e}")))?;

        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "Base URL cannot carry paths: {base_url}"
            )));
        }

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("Base URL cannot carry paths: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode the JSON body as `T`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Response status {} from {}", status, response.url());

        if !status.is_success() {
            warn!("Request to {} failed with status {}", response.url(), status);
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn photo_part(sock: &NewSock) -> Result<Option<Part>> {
        let Some(photo) = &sock.photo else {
            return Ok(None);
        };

        let part = Part::bytes(photo.bytes.clone())
            .file_name(photo.file_name.clone())
            .mime_str(&photo.mime_type)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid photo type: {e}")))?;

        Ok(Some(part))
    }
}

#[async_trait]
impl SockApi for HttpSockApi {
    async fn get_stats(&self) -> Result<StatsReport> {
        let url = self.endpoint(&["api", "stats"])?;
        debug!("Fetching stats from {}", url);

        let envelope: StatsEnvelope = self.send(self.client.get(url)).await?;
        Ok(accept(envelope)?.report)
    }

    async fn load_socks(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
        priority: Priority,
    ) -> Result<Vec<Sock>> {
        let url = self.endpoint(&["api", "load"])?;
        debug!(
            "Loading socks: query={:?} offset={} limit={} priority={}",
            query, offset, limit, priority
        );

        let request = self.client.get(url).query(&[
            ("query", query.to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
            ("priority", priority.as_str().to_string()),
        ]);

        let socks: Vec<Sock> = self.send(request).await?;
        debug!("Loaded {} socks", socks.len());
        Ok(socks)
    }

    async fn get_wash_history(&self, id: &SockId) -> Result<Vec<WashRecord>> {
        let url = self.endpoint(&["api", "wash_history", id.as_str()])?;
        debug!("Fetching wash history for {}", id);

        let envelope: HistoryEnvelope = self.send(self.client.get(url)).await?;
        Ok(accept(envelope)?.history)
    }

    async fn toggle_clean_status(&self, id: &SockId) -> Result<ToggleAck> {
        let url = self.endpoint(&["toggle_clean", id.as_str()])?;
        debug!("Toggling clean status for {}", id);

        let ack: ToggleAck = self.send(self.client.post(url)).await?;
        accept(ack)
    }

    async fn delete_sock(&self, id: &SockId) -> Result<Ack> {
        let url = self.endpoint(&["delete_sock", id.as_str()])?;
        debug!("Deleting sock {}", id);

        let ack: Ack = self.send(self.client.delete(url)).await?;
        accept(ack)
    }

    async fn add_sock(&self, sock: &NewSock) -> Result<Ack> {
        let url = self.endpoint(&["add"])?;
        debug!("Adding sock: color={} style={}", sock.color, sock.style);

        let mut form = Form::new();
        for (name, value) in sock.text_fields() {
            form = form.text(name, value.to_string());
        }
        if let Some(part) = Self::photo_part(sock)? {
            form = form.part("photo", part);
        }

        let ack: Ack = self.send(self.client.post(url).multipart(form)).await?;
        accept(ack)
    }
}
