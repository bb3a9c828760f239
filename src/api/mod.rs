//! Backend access split across logical submodules.

mod client;
mod error;

pub use client::HttpBackend;
pub use error::ApiError;

use crate::models::{
    DashboardStats, ExportFormat, ExportedVerse, LegacyStats, Product, ProductPayload, Verse,
    VerseAnalytics, VersePayload,
};
use crate::verses::{VerseFilters, VerseSort};

/// Every REST call the dashboard makes. The worker owns one implementation;
/// tests substitute an in-memory one.
pub trait Backend {
    /// `GET /verses` with filter and sort parameters.
    fn list_verses(&self, filters: &VerseFilters, sort: VerseSort) -> Result<Vec<Verse>, ApiError>;
    /// `POST /verses`
    fn create_verse(&self, payload: &VersePayload) -> Result<Verse, ApiError>;
    /// `PUT /verses/{id}`
    fn update_verse(&self, id: &str, payload: &VersePayload) -> Result<Verse, ApiError>;
    /// `DELETE /verses/{id}`
    fn delete_verse(&self, id: &str) -> Result<(), ApiError>;
    /// `POST /verses/bulk-delete` with the id list as body.
    fn bulk_delete_verses(&self, ids: &[String]) -> Result<(), ApiError>;
    /// `GET /verses/{id}/export?format=`
    fn export_verse(&self, id: &str, format: ExportFormat) -> Result<ExportedVerse, ApiError>;
    /// `GET /products`
    fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    /// `POST /products`
    fn create_product(&self, payload: &ProductPayload) -> Result<Product, ApiError>;
    /// `GET /analytics/dashboard`
    fn dashboard_stats(&self) -> Result<DashboardStats, ApiError>;
    /// `GET /analytics/verses`
    fn verse_analytics(&self) -> Result<VerseAnalytics, ApiError>;
    /// `GET /stats`, kept for backends that predate the analytics routes.
    fn legacy_stats(&self) -> Result<LegacyStats, ApiError>;
}
