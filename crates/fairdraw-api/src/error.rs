use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fairdraw_types::{ErrorKind, FairdrawError};
use thiserror::Error;

/// Errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] FairdrawError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(err) => engine_status(err),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => ErrorKind::InvalidArgument.as_str(),
            ApiError::Engine(err) => err.kind().as_str(),
        }
    }
}

fn engine_status(err: &FairdrawError) -> StatusCode {
    match err {
        FairdrawError::RoundNotOpen(_)
        | FairdrawError::NotFinalized(_)
        | FairdrawError::UnknownRequest(_) => StatusCode::NOT_FOUND,
        FairdrawError::RevealTooEarly { .. } => {
            StatusCode::from_u16(425).unwrap_or(StatusCode::CONFLICT)
        }
        FairdrawError::RevealWindowExpired { .. } | FairdrawError::BlockHashUnavailable { .. } => {
            StatusCode::GONE
        }
        _ => match err.kind() {
            ErrorKind::Sequencing => StatusCode::CONFLICT,
            ErrorKind::Authentication => StatusCode::FORBIDDEN,
            ErrorKind::Window => StatusCode::CONFLICT,
            ErrorKind::Exhaustion => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::External => StatusCode::BAD_GATEWAY,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, Json(body)).into_response()
    }
}
