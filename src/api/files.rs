// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File API endpoints.
//!
//! Uploads arrive as `multipart/form-data` with the content in the `file`
//! field. Mutations require the `client_secret` header; reads do not.
//!
//! Upload checks run in a fixed order: missing or empty file (400), declared
//! format (400), `client_secret` presence (403), then the store's own
//! existence and ownership checks.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{
        ApiError, AUTHORIZATION_REQUIRED, EMPTY_FILE, FILE_NOT_FOUND, FORMAT_NOT_ALLOWED,
    },
    models::{FileUpload, UploadForm, CLIENT_SECRET_HEADER, FILE_FIELD},
    state::AppState,
    storage::{format, FileEntry, StoreError},
};

/// Run a synchronous store call on the blocking pool.
async fn run_blocking<T, F>(op: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "File store task failed");
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}

/// Read the `client_secret` header. Missing or non-text values are rejected.
pub(crate) fn client_secret(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(CLIENT_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| ApiError::forbidden(AUTHORIZATION_REQUIRED))
}

/// Pull the `file` part out of a multipart body.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<FileUpload, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(%rejection, "Upload is not a multipart body");
        ApiError::bad_request(EMPTY_FILE)
    })?;

    loop {
        let field = multipart.next_field().await.map_err(multipart_error)?;
        let Some(field) = field else {
            return Err(ApiError::bad_request(EMPTY_FILE));
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let upload = FileUpload {
            bytes,
            content_type,
            file_name,
        };
        if upload.is_empty() {
            return Err(ApiError::bad_request(EMPTY_FILE));
        }
        return Ok(upload);
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    let status = err.status();
    tracing::debug!(error = %err, %status, "Failed to decode multipart body");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(status, "The file exceeds the maximum upload size")
    } else {
        ApiError::bad_request(EMPTY_FILE)
    }
}

/// Validate an upload up to (and including) the secret header.
async fn validated_upload(
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(FileUpload, String), ApiError> {
    let upload = read_upload(multipart).await?;
    if !format::is_allowed(upload.content_type.as_deref()) {
        return Err(ApiError::bad_request(FORMAT_NOT_ALLOWED));
    }
    let secret = client_secret(headers)?;
    Ok((upload, secret))
}

/// Download and decrypt a file.
#[utoipa::path(
    get,
    path = "/file/{id}",
    params(
        ("id" = String, Path, description = "Identifier returned by the upload")
    ),
    tag = "Files",
    responses(
        (status = 200, description = "Decrypted file content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found")
    )
)]
pub async fn get_file(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let store = Arc::clone(&state.store);
    let lookup = id.clone();
    let file = run_blocking(move || store.retrieve(&lookup)).await?;

    let disposition = HeaderValue::from_str(&format!("attachment;filename={id}"))
        .map_err(|_| ApiError::not_found(FILE_NOT_FOUND))?;
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, file.bytes).into_response())
}

/// Upload a new file.
#[utoipa::path(
    post,
    path = "/file",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    params(
        ("client_secret" = String, Header, description = "Secret that will own the file")
    ),
    tag = "Files",
    responses(
        (status = 201, description = "Identifier of the stored file", body = String, content_type = "text/plain"),
        (status = 400, description = "Empty file, unsupported format, or file name without extension"),
        (status = 403, description = "Missing client secret")
    )
)]
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, String), ApiError> {
    let (upload, secret) = validated_upload(&headers, multipart).await?;

    let store = Arc::clone(&state.store);
    let id = run_blocking(move || {
        store.create(
            &upload.bytes,
            upload.content_type.as_deref(),
            upload.file_name.as_deref(),
            Some(&secret),
        )
    })
    .await?;

    Ok((StatusCode::CREATED, id))
}

/// Replace the content of a file owned by the caller.
#[utoipa::path(
    put,
    path = "/file/{id}",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    params(
        ("id" = String, Path, description = "Identifier of the file to replace"),
        ("client_secret" = String, Header, description = "Secret that owns the file")
    ),
    tag = "Files",
    responses(
        (status = 200, description = "File replaced"),
        (status = 400, description = "Empty file or unsupported format"),
        (status = 403, description = "Missing client secret or not the owner"),
        (status = 404, description = "File not found")
    )
)]
pub async fn update_file(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ApiError> {
    let (upload, secret) = validated_upload(&headers, multipart).await?;

    let store = Arc::clone(&state.store);
    run_blocking(move || {
        store.replace(&id, &upload.bytes, upload.content_type.as_deref(), &secret)
    })
    .await?;

    Ok(StatusCode::OK)
}

/// List every file stored by this process.
#[utoipa::path(
    get,
    path = "/files",
    tag = "Files",
    responses((status = 200, body = [FileEntry]))
)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileEntry>>, ApiError> {
    let store = Arc::clone(&state.store);
    let files = run_blocking(move || Ok(store.list())).await?;
    Ok(Json(files))
}

/// Delete a file owned by the caller.
#[utoipa::path(
    delete,
    path = "/file/{id}",
    params(
        ("id" = String, Path, description = "Identifier of the file to delete"),
        ("client_secret" = String, Header, description = "Secret that owns the file")
    ),
    tag = "Files",
    responses(
        (status = 200, description = "File deleted"),
        (status = 403, description = "Missing client secret or not the owner"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let secret = client_secret(&headers)?;

    let store = Arc::clone(&state.store);
    run_blocking(move || store.delete(&id, &secret)).await?;

    Ok(StatusCode::OK)
}
