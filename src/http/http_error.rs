use actix_web::error::BlockingError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use core::fmt;
use log::error;
use serde_json::json;

#[derive(Debug)]
pub enum HttpError {
    NotFound { id: i32 },
    Internal(anyhow::Error),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "Email {id} not found"),
            // The underlying error is logged but never sent to the client
            Self::Internal(_) => f.write_str(
                StatusCode::INTERNAL_SERVER_ERROR
                    .canonical_reason()
                    .unwrap_or("unknown"),
            ),
        }
    }
}

impl std::error::Error for HttpError {}

impl From<anyhow::Error> for HttpError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl From<BlockingError> for HttpError {
    fn from(err: BlockingError) -> Self {
        Self::Internal(anyhow::anyhow!("Database task was canceled: {err}"))
    }
}

impl ResponseError for HttpError {
    fn error_response(&self) -> HttpResponse {
        if let Self::Internal(err) = self {
            error!("{err:?}");
        }
        HttpResponse::build(self.status_code()).json(json!({ "detail": self.to_string() }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
