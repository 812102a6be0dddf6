use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::errors::DomainError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    DomainError(DomainError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::DomainError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            ApiError::DomainError(err) => domain_error_response(err),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

fn domain_error_response(err: DomainError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    let (status, code) = match err {
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        DomainError::NotHost => (StatusCode::FORBIDDEN, "NOT_HOST"),
        DomainError::NotSeatOwner => (StatusCode::FORBIDDEN, "NOT_SEAT_OWNER"),
        DomainError::DraftLocked(_) => (StatusCode::CONFLICT, "DRAFT_LOCKED"),
        DomainError::DraftFull => (StatusCode::CONFLICT, "DRAFT_FULL"),
        DomainError::AlreadyJoined => (StatusCode::CONFLICT, "ALREADY_JOINED"),
        DomainError::InvalidSelection(_) => (StatusCode::BAD_REQUEST, "INVALID_SELECTION"),
        DomainError::StateChanged => (StatusCode::CONFLICT, "STATE_CHANGED"),
        DomainError::TooFewPlayers => (StatusCode::BAD_REQUEST, "TOO_FEW_PLAYERS"),
        DomainError::StorageUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE"),
        DomainError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        DomainError::InternalError(_) => {
            tracing::error!(error = %message, "internal error");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };
    (status, code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let error = ApiError::NotFound("draft not found".to_string());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn not_host_maps_to_403() {
        let error = ApiError::from(DomainError::NotHost);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn state_changed_maps_to_409() {
        let error = ApiError::from(DomainError::StateChanged);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_unavailable_maps_to_503() {
        let error = ApiError::from(DomainError::StorageUnavailable("pool exhausted".to_string()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
