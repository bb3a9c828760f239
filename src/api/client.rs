use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::{ApiError, Backend};
use crate::models::{
    DashboardStats, ExportFormat, ExportedVerse, LegacyStats, Product, ProductPayload, Verse,
    VerseAnalytics, VersePayload,
};
use crate::verses::{VerseFilters, VerseSort};

const USER_AGENT: &str = concat!("onimix-dashboard/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client rooted at `{backend_url}/api`.
pub struct HttpBackend {
    client: Client,
    api_base: String,
}

impl HttpBackend {
    pub fn new(backend_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let api_base = api_base(backend_url)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        Ok(Self { client, api_base })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = dispatch(request)?;
        response.json::<T>().map_err(|err| ApiError::Decode(err.to_string()))
    }

    fn execute(&self, request: RequestBuilder) -> Result<(), ApiError> {
        dispatch(request).map(|_| ())
    }
}

/// Normalize the configured base URL and append the `/api` prefix.
fn api_base(backend_url: &str) -> Result<String, ApiError> {
    let trimmed = backend_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::Url("backend URL is empty".to_string()));
    }
    Url::parse(trimmed).map_err(|err| ApiError::Url(format!("{trimmed}: {err}")))?;
    Ok(format!("{trimmed}/api"))
}

/// Send the request and turn non-2xx statuses into `ApiError::Status` with the
/// response body attached.
fn dispatch(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send()?;
    let status = response.status();
    debug!(url = %response.url(), status = status.as_u16(), "backend responded");

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let err = ApiError::Status {
        status: status.as_u16(),
        body,
    };
    if err.is_client_error() {
        warn!(error = %err, "backend rejected the request");
    } else {
        error!(error = %err, "backend returned an error status");
    }
    Err(err)
}

impl Backend for HttpBackend {
    fn list_verses(&self, filters: &VerseFilters, sort: VerseSort) -> Result<Vec<Verse>, ApiError> {
        let params = filters.query_pairs(sort);
        self.fetch(self.client.get(self.url("/verses")).query(&params))
    }

    fn create_verse(&self, payload: &VersePayload) -> Result<Verse, ApiError> {
        self.fetch(self.client.post(self.url("/verses")).json(payload))
    }

    fn update_verse(&self, id: &str, payload: &VersePayload) -> Result<Verse, ApiError> {
        self.fetch(
            self.client
                .put(self.url(&format!("/verses/{id}")))
                .json(payload),
        )
    }

    fn delete_verse(&self, id: &str) -> Result<(), ApiError> {
        self.execute(self.client.delete(self.url(&format!("/verses/{id}"))))
    }

    fn bulk_delete_verses(&self, ids: &[String]) -> Result<(), ApiError> {
        self.execute(self.client.post(self.url("/verses/bulk-delete")).json(ids))
    }

    fn export_verse(&self, id: &str, format: ExportFormat) -> Result<ExportedVerse, ApiError> {
        self.fetch(
            self.client
                .get(self.url(&format!("/verses/{id}/export")))
                .query(&[("format", format.as_param())]),
        )
    }

    fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.fetch(self.client.get(self.url("/products")))
    }

    fn create_product(&self, payload: &ProductPayload) -> Result<Product, ApiError> {
        self.fetch(self.client.post(self.url("/products")).json(payload))
    }

    fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.fetch(self.client.get(self.url("/analytics/dashboard")))
    }

    fn verse_analytics(&self) -> Result<VerseAnalytics, ApiError> {
        self.fetch(self.client.get(self.url("/analytics/verses")))
    }

    fn legacy_stats(&self) -> Result<LegacyStats, ApiError> {
        self.fetch(self.client.get(self.url("/stats")))
    }
}
