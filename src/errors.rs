//! HTTP error envelope shared by every route
//!
//! Domain errors convert into [`ApiError`], which renders as
//! `{"message": "..."}` with a status picked per variant.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::activations::catalog::CatalogError;
use crate::activations::features::FeatureError;
use crate::activations::media::MediaError;
use crate::types::InvalidId;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "Request failed");
        }
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<InvalidId> for ApiError {
    fn from(err: InvalidId) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::InvalidIdentifier(_)
            | CatalogError::ParentNotFound(_)
            | CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::CategoryNotFound(_)
            | CatalogError::NodeNotFound(_)
            | CatalogError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<FeatureError> for ApiError {
    fn from(err: FeatureError) -> Self {
        let status = match &err {
            FeatureError::Validation(_) => StatusCode::BAD_REQUEST,
            FeatureError::NotFound(_) => StatusCode::NOT_FOUND,
            FeatureError::AlreadyExists { .. } => StatusCode::CONFLICT,
            FeatureError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        let status = match &err {
            MediaError::NoFiles | MediaError::TooManyFiles(_) | MediaError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            MediaError::Upload(_) | MediaError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// `Json` body extractor whose failures render as [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` extractor whose failures render as [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
