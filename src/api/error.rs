use thiserror::Error;

/// Failures surfaced by the backend client. Variants carry rendered strings so
/// errors can travel from the worker thread back into UI state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid backend URL: {0}")]
    Url(String),

    #[error("could not reach the backend: {0}")]
    Transport(String),

    #[error("{} (HTTP {status}): {body}", status_kind(.status))]
    Status { status: u16, body: String },

    #[error("unexpected response from the backend: {0}")]
    Decode(String),
}

impl ApiError {
    /// 4xx responses mean the request itself was refused (validation, missing
    /// record) rather than the backend failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if is_client_status(*status))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

fn is_client_status(status: u16) -> bool {
    (400..500).contains(&status)
}

fn status_kind(status: &u16) -> &'static str {
    if is_client_status(*status) {
        "backend rejected the request"
    } else {
        "backend failed"
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
