use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sanctum_core::error::CoreError;
use sanctum_core::lifecycle::TransitionError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{ "error": ..., "code": ... }`, with extra fields for lifecycle
/// and reference failures so the dashboard can re-prompt.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sanctum_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
                CoreError::InvalidReferences { errors } => {
                    let body = json!({
                        "error": core.to_string(),
                        "code": "INVALID_REFERENCES",
                        "errors": errors,
                    });
                    return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
                }
                CoreError::Transition(err) => return transition_response(err),
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Lifecycle refusals are 422s; invalid transitions list the legal next states.
fn transition_response(err: &TransitionError) -> Response {
    let body = match err {
        TransitionError::InvalidTransition { from, to, allowed } => json!({
            "error": err.to_string(),
            "code": "INVALID_TRANSITION",
            "from": from,
            "to": to,
            "allowed": allowed,
        }),
        TransitionError::MissingCustodian { .. } => json!({
            "error": err.to_string(),
            "code": "MISSING_CUSTODIAN",
        }),
        TransitionError::InvalidValuation { current_value, .. } => json!({
            "error": err.to_string(),
            "code": "INVALID_VALUATION",
            "current_value": current_value,
        }),
    };
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
}
