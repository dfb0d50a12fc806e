use crate::book_store::BookStoreError;
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            )],
            bytes,
        )
            .into_response(),
        Err(err) => {
            error!("Failed to serialize response body: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] BookStoreError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => {
                warn!("Rejecting request: {}", message);
                (StatusCode::BAD_REQUEST, message.clone())
            }
            ApiError::Store(err @ BookStoreError::InvalidBook(_)) => {
                warn!("Rejecting book: {}", err);
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Store(err @ BookStoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            ApiError::Store(err @ BookStoreError::StorageUnavailable { .. }) => {
                error!("{}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Book storage unavailable".to_string(),
                )
            }
        };
        json_response(status, &ErrorBody { error: &message })
    }
}
