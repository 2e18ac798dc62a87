use thiserror::Error;
use zone_core::GeometryError;

/// Every way a live request can fail. None of these reach the caller of the
/// zone or forecast fetches; they are absorbed into a mock fallback.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("backend unreachable: {0}")]
    NetworkUnavailable(#[source] reqwest::Error),
    #[error("backend not ready: {0}")]
    BackendNotReady(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error(transparent)]
    InvalidGeometry(#[from] GeometryError),
}

impl FetchError {
    /// Short label used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NetworkUnavailable(_) => "network_unavailable",
            FetchError::BackendNotReady(_) => "backend_not_ready",
            FetchError::MalformedResponse(_) => "malformed_response",
            FetchError::InvalidGeometry(_) => "invalid_geometry",
        }
    }
}
