#[cfg(feature = "server")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
#[cfg(feature = "server")]
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("WHOIS_API_KEY not configured")]
    Configuration,

    #[error("Invalid WHOIS API key")]
    UpstreamAuth,

    #[error("WHOIS rate limit exceeded")]
    UpstreamRateLimited,

    #[error("Failed to fetch WHOIS data: {0}")]
    UpstreamUnavailable(String),

    #[error("Domain information not found")]
    NotFound,

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl LookupError {
    /// Stable label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::Configuration => "configuration",
            LookupError::UpstreamAuth => "upstream_auth",
            LookupError::UpstreamRateLimited => "upstream_rate_limited",
            LookupError::UpstreamUnavailable(_) => "upstream_unavailable",
            LookupError::NotFound => "not_found",
            LookupError::InvalidDomain(_) => "invalid_domain",
            LookupError::Internal(_) => "internal",
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::UpstreamUnavailable("request timed out".to_string())
        } else {
            LookupError::UpstreamUnavailable(e.to_string())
        }
    }
}

#[cfg(feature = "server")]
impl LookupError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LookupError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            LookupError::UpstreamAuth => StatusCode::UNAUTHORIZED,
            LookupError::UpstreamRateLimited => StatusCode::TOO_MANY_REQUESTS,
            LookupError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            LookupError::NotFound => StatusCode::NOT_FOUND,
            LookupError::InvalidDomain(_) => StatusCode::BAD_REQUEST,
            LookupError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(feature = "server")]
impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            LookupError::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;

    #[test]
    fn upstream_auth_and_rate_limit_are_distinct_and_not_500() {
        let auth = LookupError::UpstreamAuth.status_code();
        let limited = LookupError::UpstreamRateLimited.status_code();

        assert_eq!(auth, StatusCode::UNAUTHORIZED);
        assert_eq!(limited, StatusCode::TOO_MANY_REQUESTS);
        assert_ne!(auth, limited);
        assert_ne!(LookupError::UpstreamAuth.kind(), LookupError::UpstreamRateLimited.kind());
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let response = LookupError::Internal("pool poisoned".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("pool poisoned"));

        let body: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["status"], 500);
    }
}
