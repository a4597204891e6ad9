// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StoreError;

pub const EMPTY_FILE: &str = "The file field is required";
pub const FILE_NOT_FOUND: &str = "The file has not been found";
pub const FORMAT_NOT_ALLOWED: &str = "The file format to be uploaded is not allowed";
pub const INVALID_FILENAME: &str = "The uploaded file name has no extension";
pub const AUTHORIZATION_REQUIRED: &str = "The client secret is a required header";
pub const FORBIDDEN: &str = "The client secret does not own this resource";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidFilename(_) => Self::bad_request(INVALID_FILENAME),
            StoreError::UnsupportedFormat(_) => Self::bad_request(FORMAT_NOT_ALLOWED),
            StoreError::AuthorizationRequired => Self::forbidden(AUTHORIZATION_REQUIRED),
            StoreError::Forbidden(_) => Self::forbidden(FORBIDDEN),
            StoreError::NotFound(_) => Self::not_found(FILE_NOT_FOUND),
            StoreError::CryptoFailure(_) | StoreError::StorageFailure(_) => {
                // Details stay in the log; clients only see a generic 500.
                tracing::error!(error = %err, "File store failure");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
