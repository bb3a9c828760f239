//! Wire-level domain types exchanged with the ONIMIX backend. The structs
//! decode leniently: older backends omit most of the production metadata, so
//! every field falls back to its default instead of failing the whole list.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Buckets a verse can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerseCategory {
    Album,
    #[default]
    Freestyle,
    Hooks,
    CompleteSongs,
    Drafts,
    Collaborations,
}

impl VerseCategory {
    pub const ALL: [VerseCategory; 6] = [
        VerseCategory::Album,
        VerseCategory::Freestyle,
        VerseCategory::Hooks,
        VerseCategory::CompleteSongs,
        VerseCategory::Drafts,
        VerseCategory::Collaborations,
    ];

    /// Value used in query strings and payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            VerseCategory::Album => "album",
            VerseCategory::Freestyle => "freestyle",
            VerseCategory::Hooks => "hooks",
            VerseCategory::CompleteSongs => "complete_songs",
            VerseCategory::Drafts => "drafts",
            VerseCategory::Collaborations => "collaborations",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VerseCategory::Album => "Album",
            VerseCategory::Freestyle => "Freestyle",
            VerseCategory::Hooks => "Hooks",
            VerseCategory::CompleteSongs => "Complete Songs",
            VerseCategory::Drafts => "Drafts",
            VerseCategory::Collaborations => "Collaborations",
        }
    }

    /// Step through the categories in declaration order, wrapping around.
    pub fn cycle(self, forward: bool) -> Self {
        cycle_in(&Self::ALL, self, forward)
    }
}

impl fmt::Display for VerseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Production urgency of a verse. Ordering follows urgency so sorting by
/// priority puts `Urgent` last in ascending order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }

    pub fn cycle(self, forward: bool) -> Self {
        cycle_in(&Self::ALL, self, forward)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A lyric-writing draft with its creative and production metadata, as the
/// backend returns it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Verse {
    pub id: String,
    pub title: String,
    pub lyrics: String,
    pub category: VerseCategory,
    pub beat_name: Option<String>,
    pub beat_external_link: Option<String>,
    /// Uploaded beat location. Read-only from the dashboard.
    pub beat_file_url: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub bpm: Option<u32>,
    pub key: Option<String>,
    pub mood: Option<String>,
    pub priority: Priority,
    pub collaborators: Vec<String>,
    pub recording_notes: Option<String>,
    pub is_complete: bool,
    /// Canonical counts persisted by the backend.
    pub word_count: Option<u32>,
    pub line_count: Option<u32>,
    pub version: u32,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Verse {
    /// Beat link trimmed, or `None` when the verse has nothing to open.
    pub fn beat_link(&self) -> Option<&str> {
        self.beat_external_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }

    /// Prefer the backend's count; older records may lack it.
    pub fn display_word_count(&self) -> usize {
        self.word_count
            .map(|count| count as usize)
            .unwrap_or_else(|| crate::verses::word_count(&self.lyrics))
    }

    /// First characters of the lyrics for list cards.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let flattened = self.lyrics.split_whitespace().collect::<Vec<_>>().join(" ");
        if flattened.chars().count() <= max_chars {
            flattened
        } else {
            let mut cut: String = flattened.chars().take(max_chars).collect();
            cut.push_str("...");
            cut
        }
    }
}

/// Body of `POST /verses` and `PUT /verses/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersePayload {
    pub title: String,
    pub lyrics: String,
    pub category: VerseCategory,
    pub beat_name: Option<String>,
    pub beat_external_link: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub bpm: Option<u32>,
    pub key: Option<String>,
    pub mood: Option<String>,
    pub priority: Priority,
    pub collaborators: Vec<String>,
    pub recording_notes: Option<String>,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    #[default]
    TechTools,
    SongRecords,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 2] =
        [ProductCategory::TechTools, ProductCategory::SongRecords];

    pub fn label(self) -> &'static str {
        match self {
            ProductCategory::TechTools => "Tech Tools",
            ProductCategory::SongRecords => "Song Records",
        }
    }

    pub fn cycle(self, forward: bool) -> Self {
        cycle_in(&Self::ALL, self, forward)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    Digital,
    Physical,
}

impl ProductType {
    pub const ALL: [ProductType; 2] = [ProductType::Digital, ProductType::Physical];

    pub fn label(self) -> &'static str {
        match self {
            ProductType::Digital => "Digital",
            ProductType::Physical => "Physical",
        }
    }

    pub fn cycle(self, forward: bool) -> Self {
        cycle_in(&Self::ALL, self, forward)
    }
}

/// A storefront item. Stock is only ever changed by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: ProductCategory,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<NaiveDateTime>,
}

fn default_active() -> bool {
    true
}

/// Body of `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: ProductCategory,
    pub product_type: ProductType,
    pub image_url: Option<String>,
    pub download_url: Option<String>,
    pub stock_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RevenuePoint {
    pub date: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TopProduct {
    pub name: String,
    pub units_sold: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub timestamp: Option<String>,
}

/// Aggregates from `GET /analytics/dashboard`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_verses: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub verse_by_category: BTreeMap<String, u64>,
    pub revenue_series: Vec<RevenuePoint>,
    pub top_products: Vec<TopProduct>,
    pub recent_activity: Vec<ActivityEntry>,
}

/// Aggregates from `GET /analytics/verses`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct VerseAnalytics {
    pub total_verses: u64,
    pub complete_verses: u64,
    pub total_words: u64,
    pub average_words: f64,
    pub by_category: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
    pub by_mood: BTreeMap<String, u64>,
}

/// Shape of the older combined `GET /stats` endpoint.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LegacyStats {
    pub total_verses: u64,
    pub total_products: u64,
    pub total_orders: u64,
    pub verse_by_category: BTreeMap<String, u64>,
}

impl From<LegacyStats> for DashboardStats {
    fn from(legacy: LegacyStats) -> Self {
        Self {
            total_verses: legacy.total_verses,
            total_products: legacy.total_products,
            total_orders: legacy.total_orders,
            verse_by_category: legacy.verse_by_category,
            ..Self::default()
        }
    }
}

/// Render targets offered by `GET /verses/{id}/export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn as_param(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

/// Rendered export blob.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportedVerse {
    pub content: String,
    pub filename: String,
}

fn cycle_in<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let len = all.len();
    let idx = all.iter().position(|item| *item == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    all[next]
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    /// Accept RFC 3339 as well as the naive ISO form the backend emits for
    /// UTC timestamps. Anything else decodes to `None`.
    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDateTime> {
        DateTime::parse_from_rfc3339(raw)
            .map(|stamp| stamp.naive_utc())
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
    }
}
