//! Boundary error type: wraps the shared [`ErrorKind`] taxonomy with a
//! human message, and converts to both REST and WS wire shapes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use table_protocol::{ErrorKind, ServerFrame};

#[derive(Debug, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::InternalError, err.to_string())
    }

    pub fn to_frame(&self) -> ServerFrame {
        ServerFrame::Error {
            code: self.kind.code().to_string(),
            message: self.message.clone(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Unauthorized
            | ErrorKind::InvalidApiKey
            | ErrorKind::SessionExpired
            | ErrorKind::InvalidSession => StatusCode::UNAUTHORIZED,
            ErrorKind::TableNotFound | ErrorKind::AgentNotFound => StatusCode::NOT_FOUND,
            ErrorKind::TableFull
            | ErrorKind::AlreadySeated
            | ErrorKind::InvalidTableState
            | ErrorKind::TableEnded => StatusCode::CONFLICT,
            ErrorKind::ValidationError
            | ErrorKind::OutdatedClient
            | ErrorKind::NotYourTurn
            | ErrorKind::InvalidAction
            | ErrorKind::StaleSeq
            | ErrorKind::NotSeated => StatusCode::BAD_REQUEST,
            ErrorKind::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = table_protocol::ErrorBody {
            code: self.kind.code().to_string(),
            message: self.message,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
