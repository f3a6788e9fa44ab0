//! JSON envelopes returned by the backend.
//!
//! Every endpoint except the sock listing wraps its payload in an object
//! carrying `success` and an optional `message`.

use crate::{CleanStatus, StatsReport, WashRecord};
use serde::{Deserialize, Serialize};

/// Common accessors for `{success, message?}` envelopes.
pub trait Envelope {
    fn success(&self) -> bool;
    fn message(&self) -> Option<&str>;
}

/// Bare acknowledgement from a mutation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `POST /toggle_clean/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub new_status: Option<CleanStatus>,
}

/// Response of `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub report: StatsReport,
}

/// Response of `GET /api/wash_history/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<WashRecord>,
}

macro_rules! impl_envelope {
    ($($ty:ty),*) => {
        $(impl Envelope for $ty {
            fn success(&self) -> bool {
                self.success
            }

            fn message(&self) -> Option<&str> {
                self.message.as_deref()
            }
        })*
    };
}

impl_envelope!(Ack, ToggleAck, StatsEnvelope, HistoryEnvelope);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toggle_ack_with_status() {
        let ack: ToggleAck =
            serde_json::from_value(json!({"success": true, "new_status": "dirty"})).unwrap();
        assert!(ack.success());
        assert_eq!(ack.new_status, Some(CleanStatus::Dirty));
        assert_eq!(ack.message(), None);
    }

    #[test]
    fn test_ack_failure_message() {
        let ack: Ack =
            serde_json::from_value(json!({"success": false, "message": "Носок не найден"}))
                .unwrap();
        assert!(!ack.success());
        assert_eq!(ack.message(), Some("Носок не найден"));
    }

    #[test]
    fn test_ack_requires_success_flag() {
        let result: Result<Ack, _> = serde_json::from_value(json!({"message": "ok"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_envelope_flattens_report() {
        let envelope: StatsEnvelope = serde_json::from_value(json!({
            "success": true,
            "stats": {"total": 3, "clean": 2, "dirty": 1, "avg_wear_count": 4.5},
            "style_stats": [{"style": "Бизнес", "count": 3}]
        }))
        .unwrap();

        assert_eq!(envelope.report.stats.total, 3);
        assert_eq!(envelope.report.stats.avg_wear_count, Some(4.5));
        assert_eq!(envelope.report.style_stats.len(), 1);
        assert!(envelope.report.color_stats.is_empty());
    }

    #[test]
    fn test_history_envelope_defaults_to_empty() {
        let envelope: HistoryEnvelope =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert!(envelope.history.is_empty());
    }
}
