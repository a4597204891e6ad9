// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request-side types for the file endpoints. The listing row
//! ([`FileEntry`](crate::storage::FileEntry)) lives with the store because
//! the store produces it.

use axum::body::Bytes;
use utoipa::ToSchema;

/// Header carrying the caller's ownership secret.
pub const CLIENT_SECRET_HEADER: &str = "client_secret";

/// Name of the multipart field holding the upload.
pub const FILE_FIELD: &str = "file";

/// Multipart form accepted by `POST /file` and `PUT /file/{id}`.
///
/// Only used for the OpenAPI document; handlers decode the stream directly
/// into [`FileUpload`].
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// File content. The part's `Content-Type` must be one of
    /// `application/pdf`, `image/jpeg`, `image/gif`, `image/png`, and its
    /// file name must carry an extension.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// The `file` part of an upload after multipart decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub bytes: Bytes,
    /// Declared `Content-Type` of the part.
    pub content_type: Option<String>,
    /// Declared file name of the part.
    pub file_name: Option<String>,
}

impl FileUpload {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
