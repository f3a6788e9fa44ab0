//! Background task that talks to the backend.
//!
//! Controllers never call the API themselves: they hand back a [`Request`],
//! the front-end forwards it to this task over a channel, and the outcome
//! comes back as a [`Response`] that is fed into the controller's `apply`.
//! Every request runs on its own task, so responses may arrive in any order.

use std::sync::Arc;

use sockguard_client::{ApiError, SockApi};
use sockguard_core::wire::{Ack, ToggleAck};
use sockguard_core::{NewSock, Priority, Sock, SockId, StatsReport, WashRecord};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Parameters of one page fetch, tagged with the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub query: String,
    pub priority: Priority,
    pub offset: usize,
    pub limit: usize,
}

/// Messages sent from the UI to the worker.
#[derive(Debug, Clone)]
pub enum Request {
    /// Fetch one page of the listing
    LoadPage(PageRequest),
    /// Flip the clean/dirty state of a sock, tagged with the list generation
    ToggleClean { id: SockId, generation: u64 },
    /// Delete a sock
    Delete(SockId),
    /// Fetch the wash history of a sock
    WashHistory(SockId),
    /// Fetch aggregate statistics
    Stats,
    /// Create a sock
    AddSock(NewSock),
    /// Stop accepting requests
    Shutdown,
}

/// Messages sent from the worker back to the UI.
#[derive(Debug, Clone)]
pub enum Response {
    PageLoaded {
        request: PageRequest,
        result: Result<Vec<Sock>, ApiError>,
    },
    Toggled {
        id: SockId,
        generation: u64,
        result: Result<ToggleAck, ApiError>,
    },
    Deleted {
        id: SockId,
        result: Result<Ack, ApiError>,
    },
    WashHistory {
        id: SockId,
        result: Result<Vec<WashRecord>, ApiError>,
    },
    Stats(Result<StatsReport, ApiError>),
    SockAdded(Result<Ack, ApiError>),
}

/// Run a single request against `api`. Returns `None` for [`Request::Shutdown`].
pub async fn execute<A>(api: &A, request: Request) -> Option<Response>
where
    A: SockApi + ?Sized,
{
    let response = match request {
        Request::LoadPage(page) => {
            let result = api
                .load_socks(&page.query, page.offset, page.limit, page.priority)
                .await;
            Response::PageLoaded {
                request: page,
                result,
            }
        }
        Request::ToggleClean { id, generation } => {
            let result = api.toggle_clean_status(&id).await;
            Response::Toggled {
                id,
                generation,
                result,
            }
        }
        Request::Delete(id) => {
            let result = api.delete_sock(&id).await;
            Response::Deleted { id, result }
        }
        Request::WashHistory(id) => {
            let result = api.get_wash_history(&id).await;
            Response::WashHistory { id, result }
        }
        Request::Stats => Response::Stats(api.get_stats().await),
        Request::AddSock(sock) => Response::SockAdded(api.add_sock(&sock).await),
        Request::Shutdown => return None,
    };

    Some(response)
}

/// Spawn the worker task.
///
/// Requests are read from `req_rx` until it closes or a
/// [`Request::Shutdown`] arrives; each one is executed concurrently and its
/// [`Response`] is sent on `resp_tx`.
pub fn spawn_worker<A>(
    api: Arc<A>,
    mut req_rx: mpsc::UnboundedReceiver<Request>,
    resp_tx: mpsc::UnboundedSender<Response>,
) -> tokio::task::JoinHandle<()>
where
    A: SockApi + ?Sized + 'static,
{
    tokio::spawn(async move {
        while let Some(request) = req_rx.recv().await {
            if matches!(request, Request::Shutdown) {
                info!("Shutting down API worker");
                break;
            }

            debug!("Dispatching {:?}", request_name(&request));
            let api = Arc::clone(&api);
            let resp_tx = resp_tx.clone();
            tokio::spawn(async move {
                if let Some(response) = execute(api.as_ref(), request).await {
                    if resp_tx.send(response).is_err() {
                        warn!("UI dropped before response was delivered");
                    }
                }
            });
        }
    })
}

fn request_name(request: &Request) -> &'static str {
    match request {
        Request::LoadPage(_) => "load_page",
        Request::ToggleClean { .. } => "toggle_clean",
        Request::Delete(_) => "delete",
        Request::WashHistory(_) => "wash_history",
        Request::Stats => "stats",
        Request::AddSock(_) => "add_sock",
        Request::Shutdown => "shutdown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sockguard_client::mock::sample_sock;
    use sockguard_client::{MockOp, MockSockApi};

    #[tokio::test]
    async fn test_execute_load_page() {
        let api = MockSockApi::with_socks(vec![
            sample_sock("a", "Черный", true, 1, "2024-01-01 10:00:00"),
            sample_sock("b", "Белый", false, 2, "2024-01-02 10:00:00"),
        ]);
        let page = PageRequest {
            generation: 3,
            query: String::new(),
            priority: Priority::Clean,
            offset: 0,
            limit: 10,
        };

        let response = execute(&api, Request::LoadPage(page.clone())).await.unwrap();
        match response {
            Response::PageLoaded { request, result } => {
                assert_eq!(request, page);
                assert_eq!(result.unwrap().len(), 2);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_shutdown_yields_nothing() {
        let api = MockSockApi::new();
        assert!(execute(&api, Request::Shutdown).await.is_none());
    }

    #[tokio::test]
    async fn test_worker_round_trip() {
        let api = Arc::new(MockSockApi::new());
        api.fail_next(MockOp::Stats, ApiError::Http { status: 503 });

        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = spawn_worker(Arc::clone(&api), req_rx, resp_tx);

        req_tx.send(Request::Stats).unwrap();
        match resp_rx.recv().await.unwrap() {
            Response::Stats(result) => assert_eq!(result.unwrap_err(), ApiError::Http { status: 503 }),
            other => panic!("unexpected response: {other:?}"),
        }

        req_tx.send(Request::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
