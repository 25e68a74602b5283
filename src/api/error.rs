use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{detail}")]
    Status { status: StatusCode, detail: String },

    #[error("Your session has expired. Please sign in again.")]
    Unauthorized,

    #[error("Unexpected response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

/// Extracts the server's `detail` (or `message`) from an error body.
pub fn error_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .detail
                .map(|value| match value {
                    serde_json::Value::String(text) => text,
                    other => other.to_string(),
                })
                .or(parsed.message)
        })
        .filter(|text| !text.trim().is_empty())
}

impl ApiError {
    /// Builds the error for a non-2xx response, preferring the server's
    /// `detail` or `message` over the bare status line.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }

        let detail = error_detail(body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        ApiError::Status { status, detail }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
