use crate::validate::FieldError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    // Duplicate tags report 401, not 409; clients rely on it.
    #[error("tag is taken")]
    TagTaken,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ApiErrBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::TagTaken | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => {
                HttpResponse::build(self.status_code()).json(errors)
            }
            ApiError::TagTaken => HttpResponse::build(self.status_code()).json(vec![FieldError {
                path: "tag".into(),
                message: "This tag is taken already".into(),
            }]),
            ApiError::BadRequest(msg) | ApiError::Forbidden(msg) | ApiError::NotFound(msg) => {
                HttpResponse::build(self.status_code()).json(ApiErrBody { error: msg.clone() })
            }
            other => HttpResponse::build(self.status_code()).json(ApiErrBody {
                error: other.to_string(),
            }),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        log::error!("db error: {e:?}");
        ApiError::Internal
    }
}
