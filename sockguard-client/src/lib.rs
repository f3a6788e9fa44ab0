//! # sockguard-client
//!
//! Client library for the sockguard REST backend.
//!
//! This crate provides:
//! - [`SockApi`] - Trait covering every backend endpoint
//! - [`HttpSockApi`] - reqwest implementation talking to a live server
//! - [`MockSockApi`] - In-memory backend emulation for testing
//!
//! The client never interprets error bodies: transport failures, non-2xx
//! statuses, `success: false` envelopes and malformed payloads each surface
//! as their own [`ApiError`] variant and are left to the caller to present.
//!
//! ## Example
//!
//! ```no_run
//! use sockguard_client::{HttpSockApi, SockApi};
//! use sockguard_core::Priority;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpSockApi::new("http://localhost:5000")?;
//! let page = api.load_socks("", 0, 10, Priority::Clean).await?;
//! println!("Loaded {} socks", page.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sockguard_core::wire::{Ack, Envelope, ToggleAck};
use sockguard_core::{NewSock, Priority, Sock, SockId, StatsReport, WashRecord};
use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::HttpSockApi;
pub use mock::{MockCall, MockOp, MockSockApi};
pub use sockguard_core::{is_valid_image_file, ImageFile};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (offline, refused, timed out).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The server answered `success: false`.
    #[error("Application error: {}", .message.as_deref().unwrap_or("no message"))]
    Application { message: Option<String> },

    /// The body did not match the expected response shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The request could not be built (bad base URL, bad multipart part).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Reason supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Application { message } => message.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Turn a `success: false` envelope into [`ApiError::Application`].
pub(crate) fn accept<E: Envelope>(envelope: E) -> Result<E> {
    if envelope.success() {
        Ok(envelope)
    } else {
        Err(ApiError::Application {
            message: envelope.message().map(str::to_string),
        })
    }
}

// ============================================================================
// SockApi Trait
// ============================================================================

/// Operations offered by the sockguard backend.
///
/// Implementations hold no list state; every call is a fresh request.
#[async_trait]
pub trait SockApi: Send + Sync {
    /// Aggregate counts and per-color/per-style breakdowns.
    async fn get_stats(&self) -> Result<StatsReport>;

    /// One page of socks matching `query`, sorted by `priority`.
    ///
    /// An empty `query` means no filter. A page shorter than `limit` is the
    /// last one.
    async fn load_socks(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
        priority: Priority,
    ) -> Result<Vec<Sock>>;

    /// Wash records for one sock, newest first. Empty when never washed.
    async fn get_wash_history(&self, id: &SockId) -> Result<Vec<WashRecord>>;

    /// Flip the sock's clean flag on the server.
    async fn toggle_clean_status(&self, id: &SockId) -> Result<ToggleAck>;

    /// Remove a sock. Irreversible.
    async fn delete_sock(&self, id: &SockId) -> Result<Ack>;

    /// Create a sock from form fields and an optional photo.
    async fn add_sock(&self, sock: &NewSock) -> Result<Ack>;
}

#[async_trait]
impl<T: SockApi + ?Sized> SockApi for std::sync::Arc<T> {
    async fn get_stats(&self) -> Result<StatsReport> {
        (**self).get_stats().await
    }

    async fn load_socks(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
        priority: Priority,
    ) -> Result<Vec<Sock>> {
        (**self).load_socks(query, offset, limit, priority).await
    }

    async fn get_wash_history(&self, id: &SockId) -> Result<Vec<WashRecord>> {
        (**self).get_wash_history(id).await
    }

    async fn toggle_clean_status(&self, id: &SockId) -> Result<ToggleAck> {
        (**self).toggle_clean_status(id).await
    }

    async fn delete_sock(&self, id: &SockId) -> Result<Ack> {
        (**self).delete_sock(id).await
    }

    async fn add_sock(&self, sock: &NewSock) -> Result<Ack> {
        (**self).add_sock(sock).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_success() {
        let ack = Ack {
            success: true,
            message: None,
        };
        assert!(accept(ack).is_ok());
    }

    #[test]
    fn test_accept_failure_keeps_message() {
        let ack = Ack {
            success: false,
            message: Some("Носок не найден".to_string()),
        };
        let err = accept(ack).unwrap_err();
        assert_eq!(err.server_message(), Some("Носок не найден"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::Http { status: 404 }.to_string(),
            "HTTP error: status 404"
        );
        assert_eq!(
            ApiError::Application { message: None }.to_string(),
            "Application error: no message"
        );
        assert_eq!(ApiError::Network("offline".into()).server_message(), None);
    }
}
