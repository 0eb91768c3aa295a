use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Unauthorized - access token rejected even after refresh")]
    AuthorizationExhausted,

    #[error("Request failed{}: {}", status_label(.status), .cause)]
    RequestFailed {
        status: Option<StatusCode>,
        cause: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

fn status_label(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => format!(" with status {}", status),
        None => String::new(),
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build a `RequestFailed` from a non-success, non-401 response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let cause = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        } else {
            Self::truncate_body(body)
        };
        ApiError::RequestFailed {
            status: Some(status),
            cause,
        }
    }

    /// Build a `RequestFailed` from a transport-level failure.
    pub fn transport(err: reqwest::Error) -> Self {
        ApiError::RequestFailed {
            status: err.status(),
            cause: err.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Errors scoped to a single item that orchestration may skip.
    /// Authentication errors are never item-level.
    pub fn is_item_level(&self) -> bool {
        matches!(self, ApiError::RequestFailed { .. })
    }
}
