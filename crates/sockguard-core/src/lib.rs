//! # sockguard-core
//!
//! Core types shared by the sockguard client and front-end.
//!
//! This crate defines the data model the backend speaks:
//!
//! - [`Sock`] - A tracked item with identity, descriptive attributes and clean/dirty status
//! - [`WashRecord`] - A single past wash event
//! - [`StatsReport`] - Aggregate counts and per-color/per-style breakdowns
//! - [`Priority`] - Server-side sort mode for listing socks
//! - [`NewSock`] / [`ImageFile`] - Payload for creating a sock, with photo validation
//!
//! The [`catalog`] module holds the fixed option sets offered by the add form,
//! and [`wire`] holds the JSON envelopes returned by the mutation endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod catalog;
pub mod image;
pub mod wire;

pub use image::{is_valid_image, is_valid_image_file, ImageFile, ALLOWED_IMAGE_TYPES, MAX_IMAGE_SIZE};

// ============================================================================
// Core ID Types
// ============================================================================

/// Server-assigned identifier for a sock.
///
/// The backend may emit ids as JSON strings or integers; both are normalized
/// to an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SockId(pub String);

impl SockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for SockId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => SockId(s),
            RawId::Int(n) => SockId(n.to_string()),
        })
    }
}

// ============================================================================
// Listing Parameters
// ============================================================================

/// Sort mode used by the server when listing socks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Clean socks first
    #[default]
    Clean,
    /// Dirty socks first
    Dirty,
    /// Most worn first
    Frequent,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Clean, Priority::Dirty, Priority::Frequent];

    /// Value sent in the `priority` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Clean => "clean",
            Priority::Dirty => "dirty",
            Priority::Frequent => "frequent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown priority name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority(pub String);

impl fmt::Display for UnknownPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown priority '{}', expected one of: clean, dirty, frequent",
            self.0
        )
    }
}

impl std::error::Error for UnknownPriority {}

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clean" => Ok(Priority::Clean),
            "dirty" => Ok(Priority::Dirty),
            "frequent" | "worn" => Ok(Priority::Frequent),
            _ => Err(UnknownPriority(s.to_string())),
        }
    }
}

/// Clean/dirty status as reported by the toggle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanStatus {
    Clean,
    Dirty,
}

impl CleanStatus {
    pub fn is_clean(&self) -> bool {
        matches!(self, CleanStatus::Clean)
    }
}

impl From<bool> for CleanStatus {
    fn from(clean: bool) -> Self {
        if clean {
            CleanStatus::Clean
        } else {
            CleanStatus::Dirty
        }
    }
}

// ============================================================================
// Sock and History Types
// ============================================================================

/// A tracked sock.
///
/// Descriptive attributes are server-defined strings and are treated as
/// opaque. Timestamps are kept in the server's own format; the `*_formatted`
/// fields are display strings the server prepares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sock {
    pub id: SockId,
    pub color: String,
    pub color_hex: String,
    pub style: String,
    pub pattern: Option<String>,
    pub material: Option<String>,
    #[serde(default)]
    pub size: String,
    pub brand: Option<String>,
    pub photo_url: Option<String>,
    #[serde(deserialize_with = "bool_or_int")]
    pub clean: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub wear_count: u64,
    pub created_at: Option<String>,
    pub created_at_formatted: Option<String>,
    pub last_washed: Option<String>,
    pub last_washed_formatted: Option<String>,
    pub notes: Option<String>,
}

impl Sock {
    /// Status matching the `clean` flag.
    pub fn status(&self) -> CleanStatus {
        CleanStatus::from(self.clean)
    }
}

/// A single wash event.
///
/// The history endpoint returns either bare timestamp strings or
/// `{"wash_date": ...}` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WashRecord {
    pub wash_date: String,
}

impl<'de> Deserialize<'de> for WashRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawRecord {
            Bare(String),
            Object { wash_date: String },
        }

        Ok(match RawRecord::deserialize(deserializer)? {
            RawRecord::Bare(wash_date) | RawRecord::Object { wash_date } => WashRecord { wash_date },
        })
    }
}

// ============================================================================
// Stats
// ============================================================================

/// Aggregate counts over all socks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub clean: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub dirty: u64,
    #[serde(default, deserialize_with = "lenient_average")]
    pub avg_wear_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_count")]
    pub colors_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_optional_count")]
    pub styles_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_optional_count")]
    pub total_wears: Option<u64>,
}

/// Per-color breakdown row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStat {
    pub color: String,
    pub color_hex: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub clean_count: u64,
}

impl ColorStat {
    pub fn dirty_count(&self) -> u64 {
        self.count.saturating_sub(self.clean_count)
    }
}

/// Per-style breakdown row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleStat {
    pub style: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
}

/// Everything the stats view shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub stats: Stats,
    #[serde(default)]
    pub color_stats: Vec<ColorStat>,
    #[serde(default)]
    pub style_stats: Vec<StyleStat>,
}

/// Share of `count` in `total` as a percentage with one decimal place.
///
/// Returns `"0"` when `total` is zero.
pub fn percentage(count: u64, total: u64) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{:.1}", count as f64 / total as f64 * 100.0)
}

// ============================================================================
// New Sock Payload
// ============================================================================

/// Fields submitted to create a sock.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSock {
    pub color: String,
    pub color_hex: String,
    pub style: String,
    pub pattern: String,
    pub material: String,
    pub size: String,
    pub brand: String,
    pub photo: Option<ImageFile>,
}

impl NewSock {
    /// Text form fields in submission order.
    pub fn text_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("color", &self.color),
            ("color_hex", &self.color_hex),
            ("style", &self.style),
            ("pattern", &self.pattern),
            ("material", &self.material),
            ("size", &self.size),
            ("brand", &self.brand),
        ]
    }
}

// ============================================================================
// Lenient Deserializers
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl RawNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Int(n) => Some(*n as f64),
            RawNumber::Signed(n) => Some(*n as f64),
            RawNumber::Float(f) => Some(*f),
            RawNumber::Text(s) => s.trim().parse().ok(),
            RawNumber::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }

    fn as_count(&self) -> Option<u64> {
        match self {
            RawNumber::Int(n) => Some(*n),
            RawNumber::Signed(n) => Some((*n).max(0) as u64),
            other => other.as_f64().map(|f| f.max(0.0).round() as u64),
        }
    }
}

/// Accepts a JSON boolean or a `0`/`1` integer.
fn bool_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBool {
        Bool(bool),
        Int(i64),
    }

    Ok(match RawBool::deserialize(deserializer)? {
        RawBool::Bool(b) => b,
        RawBool::Int(n) => n != 0,
    })
}

/// Counts may be null (SQL `SUM` over no rows), floats or decimal strings.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|n| n.as_count()).unwrap_or(0))
}

fn lenient_optional_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|n| n.as_count()))
}

fn lenient_average<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|n| n.as_f64()))
}

// ============================================================================
// Tests
// ============================================================================
