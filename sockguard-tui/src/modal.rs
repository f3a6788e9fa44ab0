//! Named modal registry.
//!
//! Each modal carries the data it displays or acts on, so a confirmation
//! knows which sock it is about and a stats report lives exactly as long as
//! its modal stays open.

use sockguard_core::{SockId, StatsReport, WashRecord};

/// Identifies a modal slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalKind {
    ConfirmDelete,
    Stats,
    WashHistory,
}

/// An open modal and its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Asks before an irreversible delete.
    ConfirmDelete { id: SockId, label: String },
    /// Aggregate counts.
    Stats(StatsReport),
    /// Wash records of one sock, newest first.
    WashHistory {
        id: SockId,
        label: String,
        records: Vec<WashRecord>,
    },
}

impl Modal {
    pub fn kind(&self) -> ModalKind {
        match self {
            Modal::ConfirmDelete { .. } => ModalKind::ConfirmDelete,
            Modal::Stats(_) => ModalKind::Stats,
            Modal::WashHistory { .. } => ModalKind::WashHistory,
        }
    }
}

/// Tracks which modals are open, most recently opened last.
#[derive(Debug, Clone, Default)]
pub struct ModalService {
    open: Vec<Modal>,
}

impl ModalService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `modal`, replacing any open modal of the same kind.
    pub fn open(&mut self, modal: Modal) {
        let kind = modal.kind();
        self.open.retain(|m| m.kind() != kind);
        self.open.push(modal);
    }

    /// Close the modal of `kind`, returning its payload.
    pub fn close(&mut self, kind: ModalKind) -> Option<Modal> {
        let index = self.open.iter().position(|m| m.kind() == kind)?;
        Some(self.open.remove(index))
    }

    /// Close the most recently opened modal.
    pub fn close_top(&mut self) -> Option<Modal> {
        self.open.pop()
    }

    pub fn close_all(&mut self) {
        self.open.clear();
    }

    pub fn is_open(&self, kind: ModalKind) -> bool {
        self.open.iter().any(|m| m.kind() == kind)
    }

    pub fn get(&self, kind: ModalKind) -> Option<&Modal> {
        self.open.iter().find(|m| m.kind() == kind)
    }

    /// The modal in front.
    pub fn top(&self) -> Option<&Modal> {
        self.open.last()
    }
}
