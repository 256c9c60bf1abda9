use axum::{
    Json,
    extract::{
        multipart::MultipartError,
        rejection::{FormRejection, JsonRejection},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use crate::models::MovieId;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    TooLarge(String),
    #[error("movie {0} not found")]
    NotFound(MovieId),
    #[error("{0}")]
    InvalidState(&'static str),
    #[error("could not read image: {0}")]
    Decode(String),
    #[error("storage error: {0:#}")]
    Storage(#[source] anyhow::Error),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    BadRequest,
    TooLarge,
    NotFound,
    InvalidState,
    Decode,
    Storage,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::BadRequest(_) => ErrorKind::BadRequest,
            AppError::TooLarge(_) => ErrorKind::TooLarge,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::InvalidState(_) => ErrorKind::InvalidState,
            AppError::Decode(_) => ErrorKind::Decode,
            AppError::Storage(_) => ErrorKind::Storage,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::BadRequest | ErrorKind::Decode => StatusCode::BAD_REQUEST,
            ErrorKind::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidState => StatusCode::CONFLICT,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show outside the process.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Storage(_) => "storage unavailable".to_string(),
            other => other.to_string(),
        }
    }

    fn rejected(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge(message)
        } else {
            Self::BadRequest(message)
        }
    }

    fn log(&self) {
        match self {
            AppError::Storage(err) => {
                tracing::error!(error = %format!("{err:#}"), "storage failure")
            },
            other => tracing::debug!(kind = ?other.kind(), error = %other, "request failed"),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Storage(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(anyhow::Error::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(anyhow::Error::new(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        Self::rejected(err.status(), err.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(err: FormRejection) -> Self {
        Self::rejected(err.status(), err.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::rejected(err.status(), err.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    kind: ErrorKind,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let body =
            ErrorBody { error: ErrorDetail { kind: self.kind(), message: self.public_message() } };
        (self.status(), Json(body)).into_response()
    }
}

/// HTML rendering of an [`AppError`] for the catalog pages.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.0.log();
        let body = crate::templates::error_page(&self.0.public_message());
        (self.0.status(), Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_detail_stays_internal() {
        let err = AppError::from(anyhow::anyhow!("disk on fire at /var/lib/marquee"));
        assert_eq!(err.public_message(), "storage unavailable");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(AppError::NotFound(3).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::InvalidState("busy").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Decode("bad".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound(3).public_message(), "movie 3 not found");
    }
}
