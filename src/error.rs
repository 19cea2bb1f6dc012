use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::parser::ParseError;
use crate::validate::ValidationError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request body: {0}")]
    MultipartRejected(#[from] MultipartRejection),

    #[error("request body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    UpstreamTransport(String),

    #[error("unexpected IqDB response: {0}")]
    UpstreamParse(#[from] ParseError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MultipartRejected(e) => e.status(),
            AppError::Multipart(e) => e.status(),
            AppError::UpstreamTransport(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %error, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %error, "request rejected");
        }

        let body = ErrorBody {
            status: status.as_u16(),
            error,
        };
        (status, Json(body)).into_response()
    }
}
