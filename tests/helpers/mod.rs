//! In-memory backend plus small drivers that feed worker responses back into
//! the reducers, so workflows run end to end without a network.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use onimix_dashboard::analytics::{AnalyticsSnapshot, Dashboard, DashboardMsg, DashboardView};
use onimix_dashboard::models::{
    DashboardStats, ExportFormat, ExportedVerse, LegacyStats, Product, ProductPayload, Verse,
    VerseAnalytics, VersePayload,
};
use onimix_dashboard::state::{Notice, Outcome};
use onimix_dashboard::store::{Store, StoreMsg};
use onimix_dashboard::verses::{
    line_count, word_count, VerseFilters, VerseManager, VerseMsg, VerseSort,
};
use onimix_dashboard::worker::{execute, Request, Response};
use onimix_dashboard::{ApiError, Backend};

#[derive(Default)]
pub struct FakeState {
    pub verses: Vec<Verse>,
    pub products: Vec<Product>,
    /// Every call, e.g. `"PUT /verses/v1"`.
    pub calls: Vec<String>,
    pub requests: Vec<Request>,
    pub last_verse_payload: Option<VersePayload>,
    pub last_product_payload: Option<ProductPayload>,
    pub last_list_params: Option<(VerseFilters, VerseSort)>,
    /// Fails the next recorded call with this error.
    pub fail_next: Option<ApiError>,
    /// Older backends answer 404 on the analytics routes.
    pub legacy_only: bool,
    /// Every analytics route fails.
    pub analytics_down: bool,
    next_id: u32,
}

/// Shared handle so a test can inspect state after moving a clone into the
/// worker.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verses(verses: Vec<Verse>) -> Self {
        let backend = Self::new();
        backend.state().verses = verses;
        backend
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn fail_next(&self, err: ApiError) {
        self.state().fail_next = Some(err);
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(call);
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        body: "{\"detail\":\"Not Found\"}".to_string(),
    }
}

pub fn verse(id: &str, title: &str, lyrics: &str) -> Verse {
    Verse {
        id: id.to_string(),
        title: title.to_string(),
        lyrics: lyrics.to_string(),
        version: 1,
        ..Verse::default()
    }
}

fn verse_from_payload(id: String, payload: &VersePayload, version: u32) -> Verse {
    Verse {
        id,
        title: payload.title.clone(),
        lyrics: payload.lyrics.clone(),
        category: payload.category,
        beat_name: payload.beat_name.clone(),
        beat_external_link: payload.beat_external_link.clone(),
        tags: payload.tags.clone(),
        notes: payload.notes.clone(),
        bpm: payload.bpm,
        key: payload.key.clone(),
        mood: payload.mood.clone(),
        priority: payload.priority,
        collaborators: payload.collaborators.clone(),
        recording_notes: payload.recording_notes.clone(),
        is_complete: payload.is_complete,
        word_count: Some(word_count(&payload.lyrics) as u32),
        line_count: Some(line_count(&payload.lyrics) as u32),
        version,
        ..Verse::default()
    }
}

fn category_counts(verses: &[Verse]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for verse in verses {
        *counts.entry(verse.category.as_str().to_string()).or_insert(0) += 1;
    }
    counts
}

impl Backend for FakeBackend {
    fn list_verses(&self, filters: &VerseFilters, sort: VerseSort) -> Result<Vec<Verse>, ApiError> {
        self.record("GET /verses".to_string())?;
        let mut state = self.state();
        state.last_list_params = Some((filters.clone(), sort));
        // Behaves like the first backend revision: only `search` is honored.
        let needle = filters.search.to_lowercase();
        Ok(state
            .verses
            .iter()
            .filter(|verse| needle.is_empty() || verse.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    fn create_verse(&self, payload: &VersePayload) -> Result<Verse, ApiError> {
        self.record("POST /verses".to_string())?;
        let mut state = self.state();
        state.next_id += 1;
        let created = verse_from_payload(format!("new-{}", state.next_id), payload, 1);
        state.last_verse_payload = Some(payload.clone());
        state.verses.push(created.clone());
        Ok(created)
    }

    fn update_verse(&self, id: &str, payload: &VersePayload) -> Result<Verse, ApiError> {
        self.record(format!("PUT /verses/{id}"))?;
        let mut state = self.state();
        state.last_verse_payload = Some(payload.clone());
        let Some(slot) = state.verses.iter_mut().find(|verse| verse.id == id) else {
            return Err(not_found());
        };
        *slot = verse_from_payload(id.to_string(), payload, slot.version + 1);
        Ok(slot.clone())
    }

    fn delete_verse(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("DELETE /verses/{id}"))?;
        let mut state = self.state();
        let before = state.verses.len();
        state.verses.retain(|verse| verse.id != id);
        if state.verses.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    fn bulk_delete_verses(&self, ids: &[String]) -> Result<(), ApiError> {
        self.record(format!("POST /verses/bulk-delete {}", ids.join(",")))?;
        self.state().verses.retain(|verse| !ids.contains(&verse.id));
        Ok(())
    }

    fn export_verse(&self, id: &str, format: ExportFormat) -> Result<ExportedVerse, ApiError> {
        self.record(format!("GET /verses/{id}/export?format={}", format.as_param()))?;
        let state = self.state();
        let Some(verse) = state.verses.iter().find(|verse| verse.id == id) else {
            return Err(not_found());
        };
        let content = match format {
            ExportFormat::Text => format!("{}\n\n{}", verse.title, verse.lyrics),
            ExportFormat::Markdown => format!("# {}\n\n{}", verse.title, verse.lyrics),
            ExportFormat::Json => format!("{{\"title\":\"{}\"}}", verse.title),
        };
        Ok(ExportedVerse {
            content,
            filename: format!("{}.{}", verse.id, format.as_param()),
        })
    }

    fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.record("GET /products".to_string())?;
        Ok(self.state().products.clone())
    }

    fn create_product(&self, payload: &ProductPayload) -> Result<Product, ApiError> {
        self.record("POST /products".to_string())?;
        let mut state = self.state();
        state.next_id += 1;
        let product = Product {
            id: format!("p-{}", state.next_id),
            name: payload.name.clone(),
            description: payload.description.clone(),
            price: payload.price,
            category: payload.category,
            product_type: payload.product_type,
            image_url: payload.image_url.clone(),
            download_url: payload.download_url.clone(),
            stock_quantity: payload.stock_quantity,
            is_active: true,
            created_at: None,
        };
        state.last_product_payload = Some(payload.clone());
        state.products.push(product.clone());
        Ok(product)
    }

    fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.state().calls.push("GET /analytics/dashboard".to_string());
        let state = self.state();
        if state.analytics_down {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        if state.legacy_only {
            return Err(not_found());
        }
        Ok(DashboardStats {
            total_verses: state.verses.len() as u64,
            total_products: state.products.len() as u64,
            total_revenue: state.products.iter().map(|p| p.price).sum(),
            verse_by_category: category_counts(&state.verses),
            ..DashboardStats::default()
        })
    }

    fn verse_analytics(&self) -> Result<VerseAnalytics, ApiError> {
        self.state().calls.push("GET /analytics/verses".to_string());
        let state = self.state();
        let total_words: u64 = state
            .verses
            .iter()
            .map(|verse| verse.display_word_count() as u64)
            .sum();
        Ok(VerseAnalytics {
            total_verses: state.verses.len() as u64,
            complete_verses: state.verses.iter().filter(|v| v.is_complete).count() as u64,
            total_words,
            by_category: category_counts(&state.verses),
            ..VerseAnalytics::default()
        })
    }

    fn legacy_stats(&self) -> Result<LegacyStats, ApiError> {
        self.state().calls.push("GET /stats".to_string());
        let state = self.state();
        if state.analytics_down {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(LegacyStats {
            total_verses: state.verses.len() as u64,
            total_products: state.products.len() as u64,
            total_orders: 7,
            verse_by_category: category_counts(&state.verses),
        })
    }
}

/// What a driven workflow surfaced besides state changes.
#[derive(Debug, Default)]
pub struct Trace {
    pub notices: Vec<Notice>,
    pub exports: Vec<ExportedVerse>,
}

/// Run every request `outcome` produces (and every follow-up) against
/// `backend`, feeding responses back into the manager.
pub fn drive_verses(backend: &FakeBackend, manager: &mut VerseManager, outcome: Outcome) -> Trace {
    let mut trace = Trace::default();
    let mut pending = vec![outcome];
    while let Some(outcome) = pending.pop() {
        trace.notices.extend(outcome.notice);
        for request in outcome.requests {
            backend.state().requests.push(request.clone());
            let msg = match execute(backend, request) {
                Response::VersesListed { ticket, result } => {
                    VerseMsg::ListLoaded { ticket, result }
                }
                Response::VerseSaved(Ok(verse)) => VerseMsg::SubmitSucceeded(verse),
                Response::VerseSaved(Err(err)) => VerseMsg::SubmitFailed(err),
                Response::VersesDeleted { ids, bulk, result } => {
                    VerseMsg::DeleteFinished { ids, bulk, result }
                }
                Response::VerseExported(result) => {
                    match result {
                        Ok(exported) => trace.exports.push(exported),
                        Err(err) => trace.notices.push(Notice::error(err.to_string())),
                    }
                    continue;
                }
                other => panic!("unexpected response for the verse manager: {other:?}"),
            };
            pending.push(manager.update(msg));
        }
    }
    trace
}

/// Apply `msg` and drive whatever it triggers.
pub fn send_verse(backend: &FakeBackend, manager: &mut VerseManager, msg: VerseMsg) -> Trace {
    let outcome = manager.update(msg);
    drive_verses(backend, manager, outcome)
}

pub fn send_store(backend: &FakeBackend, store: &mut Store, msg: StoreMsg) -> Vec<Notice> {
    let outcome = store.update(msg);
    drive_store(backend, store, outcome)
}

pub fn drive_store(backend: &FakeBackend, store: &mut Store, outcome: Outcome) -> Vec<Notice> {
    let mut notices = Vec::new();
    let mut pending = vec![outcome];
    while let Some(outcome) = pending.pop() {
        notices.extend(outcome.notice);
        for request in outcome.requests {
            backend.state().requests.push(request.clone());
            let msg = match execute(backend, request) {
                Response::ProductsListed { ticket, result } => StoreMsg::Loaded { ticket, result },
                Response::ProductCreated(Ok(product)) => StoreMsg::SubmitSucceeded(product),
                Response::ProductCreated(Err(err)) => StoreMsg::SubmitFailed(err),
                other => panic!("unexpected response for the store: {other:?}"),
            };
            pending.push(store.update(msg));
        }
    }
    notices
}

pub fn drive_dashboard(backend: &FakeBackend, dashboard: &mut Dashboard) -> Vec<Notice> {
    let mut notices = Vec::new();
    let mut pending = vec![dashboard.update(DashboardMsg::Mounted)];
    while let Some(outcome) = pending.pop() {
        notices.extend(outcome.notice);
        for request in outcome.requests {
            let msg = match execute(backend, request) {
                Response::AnalyticsLoaded { ticket, result } => {
                    DashboardMsg::Loaded { ticket, result }
                }
                other => panic!("unexpected response for the dashboard: {other:?}"),
            };
            pending.push(dashboard.update(msg));
        }
    }
    notices
}

pub fn ready_snapshot(dashboard: &Dashboard) -> AnalyticsSnapshot {
    match dashboard.view() {
        DashboardView::Ready(snapshot) => snapshot.clone(),
        other => panic!("dashboard not ready: {other:?}"),
    }
}
