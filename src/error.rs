use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    /// Cancellation requested after the rent period has begun.
    #[error("{0}")]
    RentAlreadyStarted(String),
    /// Transient backing-store failure; the caller may retry.
    #[error("storage temporarily unavailable, please retry")]
    StorageUnavailable,
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) | AppError::RentAlreadyStarted(_) => StatusCode::CONFLICT,
            AppError::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err {
            // Connection-level failures are retryable; everything else is a bug
            // or a constraint we should have checked first.
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => AppError::StorageUnavailable,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal detail is logged server-side, never sent to the caller.
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(serde_json::json!({
                "success": false,
                "message": message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::RentAlreadyStarted("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::StorageUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_transient_db_errors_are_retryable() {
        let err: AppError = DbErr::Conn(sea_orm::RuntimeErr::Internal("refused".into())).into();
        assert!(matches!(err, AppError::StorageUnavailable));

        let err: AppError = DbErr::Custom("corrupt row".into()).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
