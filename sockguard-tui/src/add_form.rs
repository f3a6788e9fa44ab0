//! Add-sock form.
//!
//! Collects a color from the palette plus one value from each fixed option
//! set, with an optional photo. Submitting yields a [`Request::AddSock`];
//! the outcome arrives through [`AddSockForm::apply`].

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use sockguard_client::ApiError;
use sockguard_core::catalog::{self, ColorOption};
use sockguard_core::wire::Ack;
use sockguard_core::{is_valid_image_file, ImageFile, NewSock, MAX_IMAGE_SIZE};
use thiserror::Error;
use tracing::{info, warn};

use crate::notify::NotificationService;
use crate::worker::Request;

/// How many recently added socks the form remembers.
pub const RECENT_LIMIT: usize = 3;

const ADDED: &str = "Sock added";
const ADD_FAILED: &str = "Failed to add sock";

/// Categorical fields chosen from fixed option sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Style,
    Pattern,
    Material,
    Size,
    Brand,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Style,
        FormField::Pattern,
        FormField::Material,
        FormField::Size,
        FormField::Brand,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormField::Style => "style",
            FormField::Pattern => "pattern",
            FormField::Material => "material",
            FormField::Size => "size",
            FormField::Brand => "brand",
        }
    }

    pub fn options(&self) -> &'static [&'static str] {
        match self {
            FormField::Style => &catalog::STYLES,
            FormField::Pattern => &catalog::PATTERNS,
            FormField::Material => &catalog::MATERIALS,
            FormField::Size => &catalog::SIZES,
            FormField::Brand => &catalog::BRANDS,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

/// Reasons a form edit or submission is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Pick a color first")]
    MissingColor,

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Choose a {0}")]
    MissingField(FormField),

    #[error("{value:?} is not a valid {field}")]
    InvalidOption { field: FormField, value: String },

    #[error("Photo {file_name} must be PNG, JPEG or WebP and at most {max} bytes")]
    InvalidPhoto { file_name: String, max: u64 },

    #[error("The sock is being saved")]
    Busy,

    #[error("The sock was already added; start another one")]
    AlreadySubmitted,
}

/// Where the form is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Editing,
    Submitting,
    /// Saved; waiting for "add another"
    Submitted,
}

/// Summary of a sock added through this form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentSock {
    pub color: &'static str,
    pub color_hex: &'static str,
    pub style: &'static str,
}

/// State of the add-sock form.
#[derive(Debug)]
pub struct AddSockForm {
    color: Option<&'static ColorOption>,
    fields: HashMap<FormField, &'static str>,
    photo: Option<ImageFile>,
    phase: FormPhase,
    pending: Option<RecentSock>,
    recent: VecDeque<RecentSock>,
    notifications: NotificationService,
}

impl AddSockForm {
    pub fn new(notifications: NotificationService) -> Self {
        Self {
            color: None,
            fields: HashMap::new(),
            photo: None,
            phase: FormPhase::Editing,
            pending: None,
            recent: VecDeque::with_capacity(RECENT_LIMIT),
            notifications,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn color(&self) -> Option<&'static ColorOption> {
        self.color
    }

    pub fn field(&self, field: FormField) -> Option<&'static str> {
        self.fields.get(&field).copied()
    }

    pub fn photo(&self) -> Option<&ImageFile> {
        self.photo.as_ref()
    }

    /// Recently added socks, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &RecentSock> {
        self.recent.iter()
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationService {
        &mut self.notifications
    }

    // ========================================================================
    // Editing
    // ========================================================================

    pub fn select_color(&mut self, name: &str) -> Result<&'static ColorOption, FormError> {
        self.ensure_editable()?;
        let color = catalog::find_color(name).ok_or_else(|| FormError::UnknownColor(name.to_string()))?;
        self.color = Some(color);
        Ok(color)
    }

    /// Set a categorical field. Requires a color to be chosen first.
    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<&'static str, FormError> {
        self.ensure_editable()?;
        if self.color.is_none() {
            return Err(FormError::MissingColor);
        }
        let value = catalog::canonical(field.options(), value).ok_or_else(|| FormError::InvalidOption {
            field,
            value: value.to_string(),
        })?;
        self.fields.insert(field, value);
        Ok(value)
    }

    /// Set a field by name, treating "color" as the palette choice.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        if name.trim().eq_ignore_ascii_case("color") {
            self.select_color(value)?;
        } else {
            self.set_field(name.parse()?, value)?;
        }
        Ok(())
    }

    /// Attach a photo. A file of the wrong type or size is not attached and
    /// the user is notified.
    pub fn attach_photo(&mut self, file: ImageFile) -> Result<(), FormError> {
        self.ensure_editable()?;
        if !is_valid_image_file(&file) {
            warn!(
                "Rejected photo {} ({}, {} bytes)",
                file.file_name,
                file.mime_type,
                file.size()
            );
            let error = FormError::InvalidPhoto {
                file_name: file.file_name,
                max: MAX_IMAGE_SIZE,
            };
            self.photo = None;
            self.notifications.error(error.to_string());
            return Err(error);
        }
        self.photo = Some(file);
        Ok(())
    }

    pub fn remove_photo(&mut self) {
        self.photo = None;
    }

    fn ensure_editable(&self) -> Result<(), FormError> {
        match self.phase {
            FormPhase::Editing => Ok(()),
            FormPhase::Submitting => Err(FormError::Busy),
            FormPhase::Submitted => Err(FormError::AlreadySubmitted),
        }
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Validate the form and produce the add request.
    ///
    /// Validation failures are also shown as an error notification.
    pub fn submit(&mut self) -> Result<Request, FormError> {
        let sock = match self.build() {
            Ok(sock) => sock,
            Err(e) => {
                if !matches!(e, FormError::Busy | FormError::AlreadySubmitted) {
                    self.notifications.error(e.to_string());
                }
                return Err(e);
            }
        };

        info!("Submitting new sock: {} {}", sock.color, sock.style);
        self.phase = FormPhase::Submitting;
        Ok(Request::AddSock(sock))
    }

    fn build(&mut self) -> Result<NewSock, FormError> {
        self.ensure_editable()?;
        let color = self.color.ok_or(FormError::MissingColor)?;
        let value = |field: FormField| self.field(field).ok_or(FormError::MissingField(field));

        let style = value(FormField::Style)?;
        let sock = NewSock {
            color: color.name.to_string(),
            color_hex: color.hex.to_string(),
            style: style.to_string(),
            pattern: value(FormField::Pattern)?.to_string(),
            material: value(FormField::Material)?.to_string(),
            size: value(FormField::Size)?.to_string(),
            brand: value(FormField::Brand)?.to_string(),
            photo: self.photo.clone(),
        };

        self.pending = Some(RecentSock {
            color: color.name,
            color_hex: color.hex,
            style,
        });
        Ok(sock)
    }

    /// Fold the outcome of a submission into the form.
    pub fn apply(&mut self, result: Result<Ack, ApiError>) {
        if self.phase != FormPhase::Submitting {
            warn!("Add response arrived with no submission pending");
            return;
        }

        match result {
            Ok(ack) => {
                if let Some(added) = self.pending.take() {
                    self.recent.push_front(added);
                    self.recent.truncate(RECENT_LIMIT);
                }
                self.phase = FormPhase::Submitted;
                self.notifications
                    .success(ack.message.unwrap_or_else(|| ADDED.to_string()));
            }
            Err(e) => {
                warn!("Failed to add sock: {}", e);
                self.pending = None;
                self.phase = FormPhase::Editing;
                let message = e.server_message().unwrap_or(ADD_FAILED).to_string();
                self.notifications.error(message);
            }
        }
    }

    /// Clear every field to start another sock. Recent additions are kept.
    pub fn add_another(&mut self) {
        self.color = None;
        self.fields.clear();
        self.photo = None;
        self.pending = None;
        self.phase = FormPhase::Editing;
    }
}
