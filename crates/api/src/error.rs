//! API error types, HTTP response mapping and the error envelope.
//!
//! Handlers return [`ApiError`]; its `IntoResponse` impl records the status
//! and message as a response extension, and the [`error_envelope`] middleware
//! rewrites any such response into the wire format
//! `{ statusCode, timestamp, path, message, requestId }`.

use application::ApplicationError;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// Request body failed field validation; one message per violation.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),
    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::NotFound(msg) => ApiError::NotFound(msg),
            ApplicationError::Validation(domain_err) => {
                ApiError::Validation(vec![domain_err.to_string()])
            }
            ApplicationError::CascadeIncomplete => ApiError::Internal(err.to_string()),
            ApplicationError::Storage(storage_err) => ApiError::Internal(storage_err.to_string()),
        }
    }
}

/// Status and message carried from the handler to [`error_envelope`]
/// through response extensions.
#[derive(Debug, Clone)]
pub(crate) struct ErrorBody {
    pub status: StatusCode,
    pub message: serde_json::Value,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::Value::String(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::Value::String(msg)),
            ApiError::Validation(messages) => {
                (StatusCode::BAD_REQUEST, serde_json::json!(messages))
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::Value::String("Internal server error".to_string()),
                )
            }
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(ErrorBody { status, message });
        response
    }
}

const REJECTION_BODY_LIMIT: usize = 64 * 1024;

/// Wraps error responses in the JSON envelope and tags every request with
/// a generated request id.
pub async fn error_envelope(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let request_id = uuid::Uuid::new_v4().to_string();

    let mut response = next.run(req).await;

    let status = response.status();
    let taken = response.extensions_mut().remove::<ErrorBody>();
    let body = match taken {
        Some(body) => body,
        // Rejections produced by extractors (malformed JSON, bad path
        // params) carry no ErrorBody; wrap their plain-text body so every
        // error response uses the same envelope.
        None if status.is_client_error() || status.is_server_error() => {
            let message = match axum::body::to_bytes(response.into_body(), REJECTION_BODY_LIMIT)
                .await
            {
                Ok(bytes) if !bytes.is_empty() => {
                    serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => serde_json::Value::String(
                    status.canonical_reason().unwrap_or("Unknown error").to_string(),
                ),
            };
            ErrorBody { status, message }
        }
        None => return response,
    };

    if body.status.is_server_error() {
        tracing::error!(
            %method,
            %path,
            request_id = %request_id,
            status = body.status.as_u16(),
            "request failed"
        );
    } else {
        tracing::warn!(
            %method,
            %path,
            request_id = %request_id,
            status = body.status.as_u16(),
            message = %body.message,
            "request rejected"
        );
    }

    let payload = serde_json::json!({
        "statusCode": body.status.as_u16(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "path": path,
        "message": body.message,
        "requestId": request_id,
    });
    (body.status, axum::Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_errors_map_to_statuses() {
        let not_found = ApiError::from(ApplicationError::NotFound("x".to_string()));
        assert!(matches!(not_found, ApiError::NotFound(_)));

        let cascade = ApiError::from(ApplicationError::CascadeIncomplete);
        assert!(matches!(cascade, ApiError::Internal(_)));

        let validation = ApiError::from(ApplicationError::Validation(
            domain::DomainError::InvalidDocument,
        ));
        match validation {
            ApiError::Validation(messages) => {
                assert_eq!(messages, vec!["Documento deve ser um CPF ou CNPJ válido"]);
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
