//! Sock list controller.
//!
//! Owns the visible list and its filters, decides which page to fetch next,
//! and folds backend responses into the list. It performs no I/O: every
//! operation that needs the backend returns a [`Request`] for the worker,
//! and the outcome comes back through [`SockListController::apply`].
//!
//! A generation counter guards against late responses. Every reset of the
//! list (new query, new priority, reload) bumps the generation, and a page
//! tagged with an older generation is dropped on arrival.

use sockguard_client::ApiError;
use sockguard_core::wire::{Ack, ToggleAck};
use sockguard_core::{Priority, Sock, SockId, StatsReport, WashRecord};
use tracing::{debug, error, info, warn};

use crate::modal::{Modal, ModalKind, ModalService};
use crate::notify::NotificationService;
use crate::worker::{PageRequest, Request, Response};

const LOAD_FAILED: &str = "Failed to load socks";
const STATS_FAILED: &str = "Failed to load statistics";
const HISTORY_FAILED: &str = "Failed to load wash history";
const TOGGLE_FAILED: &str = "Failed to change status";
const DELETE_FAILED: &str = "Failed to delete sock";
const DELETED: &str = "Sock deleted";
const MARKED_CLEAN: &str = "Marked as clean";
const MARKED_DIRTY: &str = "Marked as dirty";
const STATUS_CHANGED: &str = "Status changed";

/// Loading phase of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A page request is outstanding
    Loading,
    /// The last page request succeeded
    Loaded,
    /// The last page request failed; the list keeps what it had
    Error,
}

/// The visible, ordered list of socks and the filters that produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    socks: Vec<Sock>,
    query: String,
    priority: Priority,
}

impl ListState {
    pub fn socks(&self) -> &[Sock] {
        &self.socks
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Number of socks loaded so far.
    pub fn len(&self) -> usize {
        self.socks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.socks.is_empty()
    }

    pub fn position(&self, id: &SockId) -> Option<usize> {
        self.socks.iter().position(|s| &s.id == id)
    }

    pub fn get(&self, id: &SockId) -> Option<&Sock> {
        self.socks.iter().find(|s| &s.id == id)
    }

    /// Append a page, skipping ids that are already listed.
    fn append(&mut self, page: Vec<Sock>) -> usize {
        let mut added = 0;
        for sock in page {
            if self.get(&sock.id).is_some() {
                warn!("Skipping duplicate sock {} in page", sock.id);
                continue;
            }
            self.socks.push(sock);
            added += 1;
        }
        added
    }

    fn remove(&mut self, id: &SockId) -> Option<Sock> {
        let index = self.position(id)?;
        Some(self.socks.remove(index))
    }
}

/// Drives the sock list.
#[derive(Debug)]
pub struct SockListController {
    list: ListState,
    page_size: usize,
    phase: Phase,
    generation: u64,
    in_flight: Option<PageRequest>,
    exhausted: bool,
    notifications: NotificationService,
    modals: ModalService,
}

impl SockListController {
    /// Create a controller that fetches `page_size` socks per request.
    ///
    /// A `page_size` of zero is treated as one.
    pub fn new(page_size: usize, notifications: NotificationService) -> Self {
        Self {
            list: ListState::default(),
            page_size: page_size.max(1),
            phase: Phase::Idle,
            generation: 0,
            in_flight: None,
            exhausted: false,
            notifications,
            modals: ModalService::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True once a page came back shorter than the page size.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationService {
        &mut self.notifications
    }

    pub fn modals(&self) -> &ModalService {
        &self.modals
    }

    /// Sock at a zero-based row of the visible list.
    pub fn sock_at(&self, row: usize) -> Option<&Sock> {
        self.list.socks.get(row)
    }

    // ========================================================================
    // Listing
    // ========================================================================

    /// Request the first page. Only the first call does anything.
    pub fn init(&mut self) -> Option<Request> {
        if self.phase != Phase::Idle {
            return None;
        }
        info!("Loading initial page (page size {})", self.page_size);
        Some(self.begin_page())
    }

    /// Request the next page at the current offset.
    ///
    /// Ignored while a page request is already outstanding.
    pub fn load_more(&mut self) -> Option<Request> {
        if let Some(pending) = &self.in_flight {
            debug!("Page at offset {} still loading; ignoring load more", pending.offset);
            return None;
        }
        Some(self.begin_page())
    }

    /// Change the priority, reset the list and reload from offset 0.
    pub fn set_priority(&mut self, priority: Priority) -> Request {
        info!("Priority changed to {}", priority);
        self.list.priority = priority;
        self.reset_and_reload()
    }

    /// Apply a new search query.
    ///
    /// The query is trimmed; if it equals the current one nothing happens.
    pub fn search(&mut self, raw: &str) -> Option<Request> {
        let query = raw.trim();
        if query == self.list.query {
            debug!("Query {:?} unchanged; not reloading", query);
            return None;
        }
        info!("Searching for {:?}", query);
        self.list.query = query.to_string();
        Some(self.reset_and_reload())
    }

    /// Drop the query and reload.
    pub fn clear_search(&mut self) -> Request {
        self.list.query.clear();
        self.reset_and_reload()
    }

    /// Reload from offset 0 with the current filters.
    pub fn reload(&mut self) -> Request {
        self.reset_and_reload()
    }

    fn reset_and_reload(&mut self) -> Request {
        self.generation += 1;
        self.list.socks.clear();
        self.in_flight = None;
        self.exhausted = false;
        self.begin_page()
    }

    fn begin_page(&mut self) -> Request {
        let page = PageRequest {
            generation: self.generation,
            query: self.list.query.clone(),
            priority: self.list.priority,
            offset: self.list.len(),
            limit: self.page_size,
        };
        self.in_flight = Some(page.clone());
        self.phase = Phase::Loading;
        Request::LoadPage(page)
    }

    // ========================================================================
    // Item actions
    // ========================================================================

    /// Request a clean/dirty flip for a listed sock.
    pub fn toggle_clean(&self, id: &SockId) -> Option<Request> {
        if self.list.get(id).is_none() {
            warn!("Toggle requested for unlisted sock {}", id);
            return None;
        }
        Some(Request::ToggleClean {
            id: id.clone(),
            generation: self.generation,
        })
    }

    /// Open the delete confirmation for a listed sock.
    pub fn request_delete(&mut self, id: &SockId) -> bool {
        let Some(sock) = self.list.get(id) else {
            warn!("Delete requested for unlisted sock {}", id);
            return false;
        };
        let label = describe(sock);
        self.modals.open(Modal::ConfirmDelete {
            id: id.clone(),
            label,
        });
        true
    }

    /// Close the confirmation and issue the pending delete.
    pub fn confirm_delete(&mut self) -> Option<Request> {
        match self.modals.close(ModalKind::ConfirmDelete)? {
            Modal::ConfirmDelete { id, .. } => Some(Request::Delete(id)),
            _ => None,
        }
    }

    /// Close the confirmation without deleting.
    pub fn cancel_delete(&mut self) {
        self.modals.close(ModalKind::ConfirmDelete);
    }

    /// Request the wash history of a sock. History is always fetched fresh.
    pub fn show_wash_history(&self, id: &SockId) -> Request {
        Request::WashHistory(id.clone())
    }

    pub fn show_stats(&self) -> Request {
        Request::Stats
    }

    /// Close a modal by kind, or the front-most one.
    pub fn close_modal(&mut self, kind: Option<ModalKind>) -> Option<Modal> {
        match kind {
            Some(kind) => self.modals.close(kind),
            None => self.modals.close_top(),
        }
    }

    // ========================================================================
    // Responses
    // ========================================================================

    /// Fold a worker response into the controller state.
    pub fn apply(&mut self, response: Response) {
        match response {
            Response::PageLoaded { request, result } => self.on_page(request, result),
            Response::Toggled {
                id,
                generation,
                result,
            } => self.on_toggled(id, generation, result),
            Response::Deleted { id, result } => self.on_deleted(id, result),
            Response::WashHistory { id, result } => self.on_history(id, result),
            Response::Stats(result) => self.on_stats(result),
            Response::SockAdded(_) => {
                debug!("Add-sock response ignored by list controller");
            }
        }
    }

    fn on_page(&mut self, request: PageRequest, result: Result<Vec<Sock>, ApiError>) {
        if request.generation != self.generation || self.in_flight.as_ref() != Some(&request) {
            debug!(
                "Discarding stale page (generation {} offset {}, current generation {})",
                request.generation, request.offset, self.generation
            );
            return;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                let received = page.len();
                let added = self.list.append(page);
                self.exhausted = received < request.limit;
                self.phase = Phase::Loaded;
                debug!(
                    "Page at offset {}: {} received, {} added, {} total",
                    request.offset,
                    received,
                    added,
                    self.list.len()
                );
            }
            Err(e) => {
                error!("Failed to load page at offset {}: {}", request.offset, e);
                self.phase = Phase::Error;
                self.notifications.error(LOAD_FAILED);
            }
        }
    }

    fn on_toggled(&mut self, id: SockId, generation: u64, result: Result<ToggleAck, ApiError>) {
        let ack = match result {
            Ok(ack) => ack,
            Err(e) => {
                error!("Failed to toggle sock {}: {}", id, e);
                self.notify_failure(&e, TOGGLE_FAILED);
                return;
            }
        };

        // Rows loaded after a reset already carry the server's state.
        if generation != self.generation {
            debug!(
                "Toggle of {} acknowledged after reset (generation {}, current {}); not flipping",
                id, generation, self.generation
            );
            let message = match ack.new_status {
                Some(status) if status.is_clean() => MARKED_CLEAN,
                Some(_) => MARKED_DIRTY,
                None => STATUS_CHANGED,
            };
            self.notifications.success(message);
            return;
        }

        let Some(sock) = self.list.socks.iter_mut().find(|s| s.id == id) else {
            debug!("Toggled sock {} is no longer listed", id);
            return;
        };
        sock.clean = !sock.clean;
        if let Some(status) = ack.new_status {
            if status.is_clean() != sock.clean {
                warn!("Server reports {} as {:?} after toggle", id, status);
            }
        }
        let message = if sock.clean { MARKED_CLEAN } else { MARKED_DIRTY };
        self.notifications.success(message);
    }

    fn on_deleted(&mut self, id: SockId, result: Result<Ack, ApiError>) {
        match result {
            Ok(ack) => {
                if self.list.remove(&id).is_none() {
                    debug!("Deleted sock {} was not listed", id);
                }
                info!("Deleted sock {}", id);
                let message = ack.message.unwrap_or_else(|| DELETED.to_string());
                self.notifications.success(message);
            }
            Err(e) => {
                error!("Failed to delete sock {}: {}", id, e);
                self.notify_failure(&e, DELETE_FAILED);
            }
        }
    }

    fn on_history(&mut self, id: SockId, result: Result<Vec<WashRecord>, ApiError>) {
        match result {
            Ok(records) => {
                let label = self
                    .list
                    .get(&id)
                    .map(describe)
                    .unwrap_or_else(|| id.to_string());
                self.modals.open(Modal::WashHistory { id, label, records });
            }
            Err(e) => {
                error!("Failed to load wash history for {}: {}", id, e);
                self.notify_failure(&e, HISTORY_FAILED);
            }
        }
    }

    fn on_stats(&mut self, result: Result<StatsReport, ApiError>) {
        match result {
            Ok(report) => self.modals.open(Modal::Stats(report)),
            Err(e) => {
                error!("Failed to load stats: {}", e);
                self.notify_failure(&e, STATS_FAILED);
            }
        }
    }

    fn notify_failure(&mut self, error: &ApiError, fallback: &str) {
        let message = error.server_message().unwrap_or(fallback).to_string();
        self.notifications.error(message);
    }
}

/// Short human label for a sock, e.g. "Черный Повседневные (Nike)".
pub fn describe(sock: &Sock) -> String {
    match sock.brand.as_deref().filter(|b| !b.is_empty()) {
        Some(brand) => format!("{} {} ({})", sock.color, sock.style, brand),
        None => format!("{} {}", sock.color, sock.style),
    }
}
