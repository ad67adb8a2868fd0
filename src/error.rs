use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::store::StoreError;

/// Body shared by hard failures. Business-rule failures never come through
/// here: the API reports those as HTTP 200 with `success: false` so the
/// mobile client only treats transport-level problems as errors.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    #[allow(dead_code)]
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    fn body(message: &str) -> Json<ErrorBody> {
        Json(ErrorBody {
            success: false,
            message: message.to_string(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ApiError::body(&msg)).into_response()
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::body(&msg)).into_response()
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::body(&msg)).into_response()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(format!("db error: {e}"))
    }
}
