use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::db::StoreError;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    RateLimited(String),
    Internal(String),
    Store(StoreError),
    Provider(ProviderError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::RateLimited(msg) => write!(f, "Rate Limited: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Store(err) => write!(f, "Store Error: {err}"),
            AppError::Provider(err) => write!(f, "Provider Error: {err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Store(err) => match err {
                StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                StoreError::Conflict(msg) | StoreError::InvalidState(msg) => {
                    (StatusCode::CONFLICT, msg.clone())
                }
            },
            AppError::Provider(err) => match err {
                ProviderError::NotConfigured(_) => {
                    tracing::warn!("{err}");
                    (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
                }
                ProviderError::Rejected { .. } => {
                    tracing::warn!("{err}");
                    (StatusCode::BAD_GATEWAY, err.to_string())
                }
                _ => {
                    tracing::error!("Provider error: {err}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "Upstream provider request failed".to_string(),
                    )
                }
            },
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Provider(err)
    }
}

/// Failures talking to an outside service (SMTP relay, SMS, payments, LLM).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} rejected the request: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },

    #[error("invalid email address: {0}")]
    Address(String),

    #[error("email delivery failed: {0}")]
    Smtp(String),
}

impl ProviderError {
    pub fn http(provider: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ProviderError::Http { provider, source }
    }

    pub fn rejected(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::Rejected {
            provider,
            message: message.into(),
        }
    }
}
