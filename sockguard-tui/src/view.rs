//! Plain-text rendering of the list, modals and toasts.
//!
//! The list has two interchangeable presentations behind [`RenderStrategy`]:
//! a one-row-per-sock table for wide terminals and stacked cards for narrow
//! ones. Both number rows from 1 so commands like `:toggle 3` can refer to
//! them.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sockguard_core::{percentage, Sock, StatsReport, WashRecord};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::add_form::{AddSockForm, FormField, FormPhase};
use crate::controller::{Phase, SockListController};
use crate::modal::Modal;
use crate::notify::Toast;
use crate::time::{format_date, format_relative, format_wash_date};

/// Width at which `auto` switches from cards to the table.
pub const WIDE_MIN_WIDTH: u16 = 100;

const BAR_CELLS: usize = 10;

/// Which list presentation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Auto,
    Wide,
    Narrow,
}

/// A way of drawing the sock list.
pub trait RenderStrategy {
    fn name(&self) -> &'static str;
    fn render(&self, socks: &[Sock]) -> String;
}

/// Pick the list presentation for a layout setting and terminal width.
pub fn strategy_for(layout: Layout, width: u16) -> Box<dyn RenderStrategy> {
    match layout {
        Layout::Wide => Box::new(WideTable),
        Layout::Narrow => Box::new(NarrowCards),
        Layout::Auto if width >= WIDE_MIN_WIDTH => Box::new(WideTable),
        Layout::Auto => Box::new(NarrowCards),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Pad or truncate `s` to exactly `width` display columns.
pub fn fit(s: &str, width: usize) -> String {
    let actual = UnicodeWidthStr::width(s);
    if actual <= width {
        return format!("{s}{}", " ".repeat(width - actual));
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    if width > 0 {
        out.push('…');
        used += 1;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Wear level as a ten-cell bar: each wear fills one cell, capped at full.
pub fn wear_bar(wear_count: u64) -> String {
    let filled = wear_count.min(BAR_CELLS as u64) as usize;
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled),
        "░".repeat(BAR_CELLS - filled),
        filled * 10
    )
}

fn status_label(sock: &Sock) -> &'static str {
    if sock.clean {
        "✓ clean"
    } else {
        "✗ dirty"
    }
}

fn last_washed(sock: &Sock) -> String {
    match (&sock.last_washed_formatted, &sock.last_washed) {
        (Some(formatted), _) if !formatted.is_empty() => formatted.clone(),
        (_, Some(raw)) => format_date(raw),
        _ => "never".to_string(),
    }
}

fn added_on(sock: &Sock) -> String {
    match (&sock.created_at_formatted, &sock.created_at) {
        (Some(formatted), _) if !formatted.is_empty() => formatted.clone(),
        (_, Some(raw)) => format_date(raw),
        _ => "-".to_string(),
    }
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("-")
}

// ============================================================================
// List strategies
// ============================================================================

/// One row per sock.
pub struct WideTable;

impl RenderStrategy for WideTable {
    fn name(&self) -> &'static str {
        "wide"
    }

    fn render(&self, socks: &[Sock]) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {} {} {} {} {} {} {}",
            fit("#", 4),
            fit("Color", 12),
            fit("Style", 16),
            fit("Brand", 14),
            fit("Size", 5),
            fit("Status", 9),
            fit("Wear", 16),
            "Last washed"
        );
        for (i, sock) in socks.iter().enumerate() {
            let _ = writeln!(
                out,
                "{} {} {} {} {} {} {} {}",
                fit(&(i + 1).to_string(), 4),
                fit(&sock.color, 12),
                fit(&sock.style, 16),
                fit(opt(&sock.brand), 14),
                fit(&sock.size, 5),
                fit(status_label(sock), 9),
                fit(&wear_bar(sock.wear_count), 16),
                last_washed(sock)
            );
        }
        out
    }
}

/// A small block per sock.
pub struct NarrowCards;

impl RenderStrategy for NarrowCards {
    fn name(&self) -> &'static str {
        "narrow"
    }

    fn render(&self, socks: &[Sock]) -> String {
        let mut out = String::new();
        for (i, sock) in socks.iter().enumerate() {
            let _ = writeln!(out, "[{}] {} {} · {}", i + 1, sock.color, sock.style, status_label(sock));
            let _ = writeln!(
                out,
                "    {} / {} / {} / {}",
                opt(&sock.brand),
                sock.size,
                opt(&sock.pattern),
                opt(&sock.material)
            );
            let _ = writeln!(out, "    wear {}", wear_bar(sock.wear_count));
            let washed = match &sock.last_washed {
                Some(raw) => format!("{} ({})", last_washed(sock), format_relative(raw)),
                None => last_washed(sock),
            };
            let _ = writeln!(out, "    washed {} · added {}", washed, added_on(sock));
        }
        out
    }
}

// ============================================================================
// Screen parts
// ============================================================================

/// One-line summary of the list state.
pub fn status_line(ctl: &SockListController) -> String {
    let list = ctl.list();
    let mut line = format!("{} socks · priority {}", list.len(), list.priority());
    if !list.query().is_empty() {
        let _ = write!(line, " · search {:?}", list.query());
    }
    let tail = match ctl.phase() {
        Phase::Idle => "",
        Phase::Loading => " · loading…",
        Phase::Error => " · load failed (:more to retry)",
        Phase::Loaded if ctl.is_exhausted() => " · end of list",
        Phase::Loaded => " · :more for next page",
    };
    line.push_str(tail);
    line
}

/// The list, or a placeholder when it is empty.
pub fn render_list(ctl: &SockListController, strategy: &dyn RenderStrategy) -> String {
    let list = ctl.list();
    if list.is_empty() {
        return match ctl.phase() {
            Phase::Loading | Phase::Idle => "Loading…\n".to_string(),
            Phase::Error => "Could not load socks. :more to retry.\n".to_string(),
            _ if list.query().is_empty() => "No socks yet. Use :add to create one.\n".to_string(),
            _ => format!("No socks match {:?}.\n", list.query()),
        };
    }
    strategy.render(list.socks())
}

pub fn render_stats(report: &StatsReport) -> String {
    let stats = &report.stats;
    let mut out = String::from("── Statistics ──\n");
    let _ = writeln!(out, "Total:  {}", stats.total);
    let _ = writeln!(
        out,
        "Clean:  {} ({}%)",
        stats.clean,
        percentage(stats.clean, stats.total)
    );
    let _ = writeln!(
        out,
        "Dirty:  {} ({}%)",
        stats.dirty,
        percentage(stats.dirty, stats.total)
    );
    if let Some(avg) = stats.avg_wear_count {
        let _ = writeln!(out, "Average wear: {avg:.1}");
    }
    if let Some(total_wears) = stats.total_wears {
        let _ = writeln!(out, "Total wears:  {total_wears}");
    }

    if !report.color_stats.is_empty() {
        out.push_str("\nBy color:\n");
        for color in &report.color_stats {
            let _ = writeln!(
                out,
                "  {} {:>3}  ({}%)  clean {:>3}  dirty {:>3}",
                fit(&color.color, 12),
                color.count,
                percentage(color.count, stats.total),
                color.clean_count,
                color.dirty_count()
            );
        }
    }

    if !report.style_stats.is_empty() {
        out.push_str("\nBy style:\n");
        for style in &report.style_stats {
            let _ = writeln!(
                out,
                "  {} {:>3}  ({}%)",
                fit(&style.style, 16),
                style.count,
                percentage(style.count, stats.total)
            );
        }
    }
    out
}

pub fn render_history(label: &str, records: &[WashRecord]) -> String {
    let mut out = format!("── Wash history: {label} ──\n");
    if records.is_empty() {
        out.push_str("No washes recorded yet.\n");
        return out;
    }
    let total = records.len();
    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", total - i, format_wash_date(&record.wash_date));
    }
    out
}

pub fn render_modal(modal: &Modal) -> String {
    match modal {
        Modal::ConfirmDelete { label, .. } => {
            format!("Delete {label}? This cannot be undone. [:yes / :no]\n")
        }
        Modal::Stats(report) => render_stats(report),
        Modal::WashHistory { label, records, .. } => render_history(label, records),
    }
}

pub fn render_toast(toast: &Toast) -> String {
    format!("{} {}", toast.kind.symbol(), toast.message)
}

/// Current contents of the add form and recent additions.
pub fn render_form(form: &AddSockForm) -> String {
    let mut out = String::from("── New sock ──\n");
    let color = form
        .color()
        .map(|c| format!("{} ({})", c.name, c.hex))
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "  {} {}", fit("color", 9), color);
    for field in FormField::ALL {
        let _ = writeln!(out, "  {} {}", fit(field.name(), 9), form.field(field).unwrap_or("-"));
    }
    let photo = form
        .photo()
        .map(|p| p.file_name.as_str())
        .unwrap_or("-");
    let _ = writeln!(out, "  {} {}", fit("photo", 9), photo);

    if form.phase() == FormPhase::Submitted {
        out.push_str("Saved. :again to add another.\n");
    }

    let mut recent = form.recent().peekable();
    if recent.peek().is_some() {
        out.push_str("Recently added:\n");
        for sock in recent {
            let _ = writeln!(out, "  {} {} ({})", sock.color, sock.style, sock.color_hex);
        }
    }
    out
}
