//! Time formatting for server timestamps.
//!
//! The backend stores naive local times as `YYYY-MM-DD HH:MM:SS`; older
//! endpoints may emit RFC 2822 or RFC 3339 strings instead. Anything that
//! does not parse is shown as-is.

use chrono::{DateTime, Local, NaiveDateTime};

const SERVER_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a server timestamp into a naive local time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, SERVER_FORMAT) {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts);
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|ts| ts.naive_local())
}

/// Format a wash timestamp as `DD.MM.YYYY HH:MM`.
pub fn format_wash_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Format a timestamp as `DD.MM.YYYY`.
pub fn format_date(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Format a timestamp relative to now (e.g., "3 days ago").
pub fn format_relative(raw: &str) -> String {
    format_relative_to(raw, Local::now().naive_local())
}

/// Format a timestamp relative to `now`.
pub fn format_relative_to(raw: &str, now: NaiveDateTime) -> String {
    let Some(ts) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 60 {
        "just now".to_string()
    } else if duration.num_minutes() < 60 {
        let mins = duration.num_minutes();
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if duration.num_hours() < 24 {
        let hours = duration.num_hours();
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if duration.num_days() < 30 {
        let days = duration.num_days();
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if duration.num_days() < 365 {
        let months = duration.num_days() / 30;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = duration.num_days() / 365;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, SERVER_FORMAT).unwrap()
    }

    #[test]
    fn test_format_wash_date() {
        assert_eq!(format_wash_date("2024-03-02 09:05:00"), "02.03.2024 09:05");
        assert_eq!(format_wash_date("Sat, 02 Mar 2024 09:05:00 GMT"), "02.03.2024 09:05");
        assert_eq!(format_wash_date("2024-03-02T09:05:00"), "02.03.2024 09:05");
    }

    #[test]
    fn test_unparseable_passes_through() {
        assert_eq!(format_wash_date("вчера"), "вчера");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-12-31 23:59:59"), "31.12.2024");
    }

    #[test]
    fn test_format_relative() {
        let now = at("2024-03-10 12:00:00");
        assert_eq!(format_relative_to("2024-03-10 11:59:30", now), "just now");
        assert_eq!(format_relative_to("2024-03-10 11:00:00", now), "1 hour ago");
        assert_eq!(format_relative_to("2024-03-07 12:00:00", now), "3 days ago");
        assert_eq!(format_relative_to("2022-03-10 12:00:00", now), "2 years ago");
    }
}
