//! Error taxonomy shared by every provider adapter.
//!
//! Adapters translate provider-specific failures (HTTP status codes,
//! transport errors, malformed bodies) into this taxonomy; nothing panics
//! or throws across the library boundary. The ticket service passes these
//! through to callers unchanged.

use thiserror::Error;

/// All failure categories a provider operation can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Bad or missing credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Identifier not resolvable within the configured scope.
    #[error("not found: {0}")]
    NotFound(String),

    /// Provider throttling. Not auto-retried; the caller decides.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Transport-level failure (DNS, TLS, connection reset).
    #[error("network error: {0}")]
    Network(String),

    /// Provider response did not match the expected shape.
    #[error("unexpected provider response: {0}")]
    Validation(String),

    /// Unmapped provider state or other configuration bug. Fatal, not
    /// retryable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Maps an HTTP response status to the matching error category.
    ///
    /// `detail` should describe the failed operation and carry any message
    /// the provider returned; it must never contain credentials.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, detail: String) -> Self {
        match status.as_u16() {
            401 | 403 => Self::Auth(detail),
            404 => Self::NotFound(detail),
            429 => Self::RateLimited(detail),
            400..=499 => Self::Validation(detail),
            _ => Self::Network(detail),
        }
    }

    /// Wraps a transport error from the HTTP client.
    #[must_use]
    pub fn from_transport(context: &str, err: &reqwest::Error) -> Self {
        Self::Network(format!("{context}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn unauthorized_maps_to_auth() {
        let err = ProviderError::from_status(StatusCode::UNAUTHORIZED, "bad token".into());
        assert_eq!(err, ProviderError::Auth("bad token".into()));
    }

    #[test]
    fn not_found_maps_to_not_found() {
        let err = ProviderError::from_status(StatusCode::NOT_FOUND, "PROJ-42".into());
        assert_eq!(err, ProviderError::NotFound("PROJ-42".into()));
    }

    #[test]
    fn too_many_requests_maps_to_rate_limited() {
        let err = ProviderError::from_status(StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert_eq!(err, ProviderError::RateLimited("slow down".into()));
    }

    #[test]
    fn other_client_errors_map_to_validation() {
        let err = ProviderError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad body".into());
        assert_eq!(err, ProviderError::Validation("bad body".into()));
    }

    #[test]
    fn server_errors_map_to_network() {
        let err = ProviderError::from_status(StatusCode::BAD_GATEWAY, "upstream".into());
        assert_eq!(err, ProviderError::Network("upstream".into()));
    }

    #[test]
    fn display_includes_category_prefix() {
        let err = ProviderError::RateLimited("retry later".into());
        assert_eq!(err.to_string(), "rate limited: retry later");
    }
}
