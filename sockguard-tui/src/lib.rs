//! # sockguard-tui
//!
//! Terminal front-end for sockguard.
//!
//! This crate provides:
//! - [`controller::SockListController`] - Paginated, filterable sock list
//! - [`add_form::AddSockForm`] - Validated add-sock form
//! - [`notify::NotificationService`] and [`modal::ModalService`] - Transient UI state
//! - [`worker`] - Background task executing controller requests against a `SockApi`
//! - [`view`] - Wide table and narrow card renderings
//! - [`command`] - Prompt command parsing
//! - [`config`] - Configuration file handling
//!
//! Controllers are synchronous and perform no I/O. Each operation that needs
//! the backend returns a [`worker::Request`]; the worker answers with a
//! [`worker::Response`] which is folded back in with `apply`.

pub mod add_form;
pub mod app;
pub mod command;
pub mod config;
pub mod controller;
pub mod modal;
pub mod notify;
pub mod time;
pub mod view;
pub mod worker;

pub use app::{App, Outcome};
pub use controller::SockListController;
pub use worker::{spawn_worker, Request, Response};
