//! In-memory emulation of the sockguard backend.
//!
//! [`MockSockApi`] applies the same filtering, ordering, pagination and
//! mutation rules as the real server so front-end logic can be exercised
//! without a network. Every call is recorded, and failures can be queued per
//! operation.

use crate::{ApiError, Result, SockApi};
use async_trait::async_trait;
use chrono::Local;
use sockguard_core::wire::{Ack, ToggleAck};
use sockguard_core::{
    ColorStat, NewSock, Priority, Sock, SockId, Stats, StatsReport, StyleStat, WashRecord,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Operations that can be made to fail with [`MockSockApi::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Stats,
    Load,
    History,
    Toggle,
    Delete,
    Add,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Stats,
    Load {
        query: String,
        offset: usize,
        limit: usize,
        priority: Priority,
    },
    History(SockId),
    Toggle(SockId),
    Delete(SockId),
    Add { color: String, has_photo: bool },
}

#[derive(Debug, Default)]
struct MockState {
    socks: Vec<Sock>,
    history: HashMap<SockId, Vec<WashRecord>>,
    failures: HashMap<MockOp, VecDeque<ApiError>>,
    calls: Vec<MockCall>,
}

impl MockState {
    fn take_failure(&mut self, op: MockOp) -> Option<ApiError> {
        self.failures.get_mut(&op).and_then(VecDeque::pop_front)
    }
}

/// In-memory backend for tests and offline demos.
#[derive(Debug, Clone, Default)]
pub struct MockSockApi {
    state: Arc<Mutex<MockState>>,
}

impl MockSockApi {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend holding `socks`.
    pub fn with_socks(socks: Vec<Sock>) -> Self {
        let api = Self::new();
        api.state().socks = socks;
        api
    }

    /// Add a wash record for `id`. Records are kept newest first, so the
    /// most recent insertion is returned first.
    pub fn with_wash(self, id: &SockId, wash_date: impl Into<String>) -> Self {
        self.state()
            .history
            .entry(id.clone())
            .or_default()
            .insert(0, WashRecord { wash_date: wash_date.into() });
        self
    }

    /// Make the next call of `op` fail with `error`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, op: MockOp, error: ApiError) {
        self.state().failures.entry(op).or_default().push_back(error);
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Number of listing calls made so far.
    pub fn load_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, MockCall::Load { .. }))
            .count()
    }

    /// Current server-side contents, in insertion order.
    pub fn socks(&self) -> Vec<Sock> {
        self.state().socks.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches_query(sock: &Sock, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [Some(&sock.color), Some(&sock.style), sock.brand.as_ref()]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Ordering used by the listing endpoint: the priority key, then newest first.
fn sort_for(priority: Priority, socks: &mut [Sock]) {
    socks.sort_by(|a, b| {
        let primary = match priority {
            Priority::Clean => b.clean.cmp(&a.clean),
            Priority::Dirty => a.clean.cmp(&b.clean),
            Priority::Frequent => b.wear_count.cmp(&a.wear_count),
        };
        primary.then_with(|| b.created_at.cmp(&a.created_at))
    });
}

fn now_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[async_trait]
impl SockApi for MockSockApi {
    async fn get_stats(&self) -> Result<StatsReport> {
        let mut state = self.state();
        state.calls.push(MockCall::Stats);
        if let Some(err) = state.take_failure(MockOp::Stats) {
            return Err(err);
        }

        let socks = &state.socks;
        let total = socks.len() as u64;
        let clean = socks.iter().filter(|s| s.clean).count() as u64;
        let total_wears: u64 = socks.iter().map(|s| s.wear_count).sum();

        let mut color_stats: Vec<ColorStat> = Vec::new();
        let mut style_stats: Vec<StyleStat> = Vec::new();
        for sock in socks {
            let hex = Some(sock.color_hex.as_str());
            match color_stats
                .iter_mut()
                .find(|c| c.color == sock.color && c.color_hex.as_deref() == hex)
            {
                Some(stat) => {
                    stat.count += 1;
                    stat.clean_count += u64::from(sock.clean);
                }
                None => color_stats.push(ColorStat {
                    color: sock.color.clone(),
                    color_hex: Some(sock.color_hex.clone()),
                    count: 1,
                    clean_count: u64::from(sock.clean),
                }),
            }
            match style_stats.iter_mut().find(|s| s.style == sock.style) {
                Some(stat) => stat.count += 1,
                None => style_stats.push(StyleStat {
                    style: sock.style.clone(),
                    count: 1,
                }),
            }
        }
        color_stats.sort_by(|a, b| b.count.cmp(&a.count));
        style_stats.sort_by(|a, b| b.count.cmp(&a.count));

        let stats = Stats {
            total,
            clean,
            dirty: total - clean,
            avg_wear_count: (total > 0).then(|| total_wears as f64 / total as f64),
            colors_count: Some(color_stats.len() as u64),
            styles_count: Some(style_stats.len() as u64),
            total_wears: Some(total_wears),
        };

        Ok(StatsReport {
            stats,
            color_stats,
            style_stats,
        })
    }

    async fn load_socks(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
        priority: Priority,
    ) -> Result<Vec<Sock>> {
        let mut state = self.state();
        state.calls.push(MockCall::Load {
            query: query.to_string(),
            offset,
            limit,
            priority,
        });
        if let Some(err) = state.take_failure(MockOp::Load) {
            return Err(err);
        }

        let needle = query.to_lowercase();
        let mut matching: Vec<Sock> = state
            .socks
            .iter()
            .filter(|s| matches_query(s, &needle))
            .cloned()
            .collect();
        sort_for(priority, &mut matching);

        let page: Vec<Sock> = matching.into_iter().skip(offset).take(limit).collect();
        debug!("Mock served {} socks at offset {}", page.len(), offset);
        Ok(page)
    }

    async fn get_wash_history(&self, id: &SockId) -> Result<Vec<WashRecord>> {
        let mut state = self.state();
        state.calls.push(MockCall::History(id.clone()));
        if let Some(err) = state.take_failure(MockOp::History) {
            return Err(err);
        }

        Ok(state.history.get(id).cloned().unwrap_or_default())
    }

    async fn toggle_clean_status(&self, id: &SockId) -> Result<ToggleAck> {
        let mut state = self.state();
        state.calls.push(MockCall::Toggle(id.clone()));
        if let Some(err) = state.take_failure(MockOp::Toggle) {
            return Err(err);
        }

        let now = now_timestamp();
        let sock = state
            .socks
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or(ApiError::Http { status: 404 })?;

        sock.clean = !sock.clean;
        let new_status = sock.status();
        if sock.clean {
            sock.wear_count += 1;
            sock.last_washed = Some(now.clone());
            state
                .history
                .entry(id.clone())
                .or_default()
                .insert(0, WashRecord { wash_date: now });
        }

        Ok(ToggleAck {
            success: true,
            message: None,
            new_status: Some(new_status),
        })
    }

    async fn delete_sock(&self, id: &SockId) -> Result<Ack> {
        let mut state = self.state();
        state.calls.push(MockCall::Delete(id.clone()));
        if let Some(err) = state.take_failure(MockOp::Delete) {
            return Err(err);
        }

        state.socks.retain(|s| &s.id != id);
        state.history.remove(id);

        Ok(Ack {
            success: true,
            message: Some("Носок успешно удален".to_string()),
        })
    }

    async fn add_sock(&self, sock: &NewSock) -> Result<Ack> {
        let mut state = self.state();
        state.calls.push(MockCall::Add {
            color: sock.color.clone(),
            has_photo: sock.photo.is_some(),
        });
        if let Some(err) = state.take_failure(MockOp::Add) {
            return Err(err);
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = now_timestamp();
        let photo_url = sock
            .photo
            .as_ref()
            .map(|p| format!("/static/uploads/{}_{}", &id[..8], p.file_name));

        state.socks.push(Sock {
            id: SockId::new(id),
            color: sock.color.clone(),
            color_hex: sock.color_hex.clone(),
            style: sock.style.clone(),
            pattern: Some(sock.pattern.clone()),
            material: Some(sock.material.clone()),
            size: sock.size.clone(),
            brand: Some(sock.brand.clone()),
            photo_url,
            clean: true,
            wear_count: 0,
            created_at: Some(now.clone()),
            created_at_formatted: None,
            last_washed: Some(now),
            last_washed_formatted: None,
            notes: None,
        });

        Ok(Ack {
            success: true,
            message: Some("Носок успешно добавлен!".to_string()),
        })
    }
}

/// Build a sock with the given id and status, for tests and demos.
pub fn sample_sock(id: &str, color: &str, clean: bool, wear_count: u64, created_at: &str) -> Sock {
    Sock {
        id: SockId::new(id),
        color: color.to_string(),
        color_hex: sockguard_core::catalog::hex_for(color).to_string(),
        style: "Повседневные".to_string(),
        pattern: Some("Однотонные".to_string()),
        material: Some("Хлопок".to_string()),
        size: "M".to_string(),
        brand: Some("Unknown".to_string()),
        photo_url: None,
        clean,
        wear_count,
        created_at: Some(created_at.to_string()),
        created_at_formatted: None,
        last_washed: None,
        last_washed_formatted: None,
        notes: None,
    }
}
