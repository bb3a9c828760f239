//! Read-only analytics dashboard. All aggregation happens on the backend; this
//! module only joins the two fetches and formats numbers for display.

use tracing::{info, warn};

use crate::api::{ApiError, Backend};
use crate::models::{DashboardStats, LegacyStats, VerseAnalytics};
use crate::state::{Notice, Outcome, Sequencer};
use crate::worker::Request;

/// Message shown in place of the dashboard when loading fails.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading analytics.";

/// Both aggregate projections, fetched together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyticsSnapshot {
    pub dashboard: DashboardStats,
    pub verses: VerseAnalytics,
    /// Built from the combined `/stats` endpoint of an older backend.
    pub legacy: bool,
}

/// Fetch the dashboard and verse analytics. A backend without the analytics
/// routes (404 on the dashboard) is served from `/stats` instead.
pub fn load_snapshot<B: Backend + ?Sized>(backend: &B) -> Result<AnalyticsSnapshot, ApiError> {
    match backend.dashboard_stats() {
        Ok(dashboard) => {
            let verses = backend.verse_analytics()?;
            Ok(AnalyticsSnapshot {
                dashboard,
                verses,
                legacy: false,
            })
        }
        Err(err) if err.is_not_found() => {
            info!("analytics routes missing; falling back to /stats");
            let legacy = backend.legacy_stats()?;
            Ok(AnalyticsSnapshot {
                verses: verse_analytics_from_legacy(&legacy),
                dashboard: legacy.into(),
                legacy: true,
            })
        }
        Err(err) => Err(err),
    }
}

fn verse_analytics_from_legacy(legacy: &LegacyStats) -> VerseAnalytics {
    VerseAnalytics {
        total_verses: legacy.total_verses,
        by_category: legacy.verse_by_category.clone(),
        ..VerseAnalytics::default()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DashboardView {
    #[default]
    NotLoaded,
    Loading,
    Ready(AnalyticsSnapshot),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardMsg {
    Mounted,
    Loaded {
        ticket: u64,
        result: Result<AnalyticsSnapshot, ApiError>,
    },
}

#[derive(Debug, Default)]
pub struct Dashboard {
    view: DashboardView,
    tickets: Sequencer,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, msg: DashboardMsg) -> Outcome {
        match msg {
            DashboardMsg::Mounted => {
                self.view = DashboardView::Loading;
                Outcome::request(Request::LoadAnalytics {
                    ticket: self.tickets.next(),
                })
            }
            DashboardMsg::Loaded { ticket, result } => {
                if !self.tickets.is_current(ticket) {
                    return Outcome::none();
                }
                match result {
                    Ok(snapshot) => {
                        self.view = DashboardView::Ready(snapshot);
                        Outcome::none()
                    }
                    Err(err) => {
                        warn!(error = %err, "loading analytics failed");
                        self.view = DashboardView::Failed;
                        Outcome::notice(Notice::error(err.to_string()))
                    }
                }
            }
        }
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }
}

/// `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
}

/// `12,345`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Horizontal bar scaled against `max`, at most `width` cells.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 || width == 0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round().clamp(1.0, width as f64) as usize;
    "█".repeat(filled)
}
