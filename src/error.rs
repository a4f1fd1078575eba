/// Error types for talking to the fire-risk API
use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for API calls
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("{message}")]
    Http {
        status: StatusCode,
        message: String,
        body: String,
    },

    /// The body was not the JSON shape we expected
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Could not build a request URL from the configured base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request thread could not be started
    #[error("Could not start request: {0}")]
    Worker(#[from] std::io::Error),
}

impl ApiError {
    /// Builds the error for a non-2xx response. The body text is the
    /// message; an empty body falls back to the status code.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            format!("Request failed with {}", status.as_u16())
        } else {
            body.clone()
        };
        ApiError::Http {
            status,
            message,
            body,
        }
    }

    /// The `error` field of a JSON error body, if the backend sent one.
    pub fn backend_message(&self) -> Option<String> {
        let ApiError::Http { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value
            .get("error")
            .and_then(|e| e.as_str())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_falls_back_to_status() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "  ".to_string());
        assert_eq!(err.to_string(), "Request failed with 502");
    }

    #[test]
    fn body_text_is_the_message() {
        let err = ApiError::from_status(
            StatusCode::NOT_FOUND,
            r#"{"detail":"Area weather not found"}"#.to_string(),
        );
        assert_eq!(err.to_string(), r#"{"detail":"Area weather not found"}"#);
        assert_eq!(err.backend_message(), None);
    }

    #[test]
    fn extracts_backend_error_field() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":"n_stations must be > 0"}"#.to_string(),
        );
        assert_eq!(err.backend_message().as_deref(), Some("n_stations must be > 0"));

        let plain = ApiError::from_status(StatusCode::BAD_REQUEST, "nope".to_string());
        assert_eq!(plain.backend_message(), None);
    }
}
