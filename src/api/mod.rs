// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{models::UploadForm, state::AppState, storage::FileEntry};

pub mod files;
pub mod health;

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    let routes = Router::new()
        .route("/file", post(files::upload_file))
        .route(
            "/file/{id}",
            get(files::get_file)
                .put(files::update_file)
                .delete(files::delete_file),
        )
        .route("/files", get(files::list_files))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        files::get_file,
        files::upload_file,
        files::update_file,
        files::list_files,
        files::delete_file,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            FileEntry,
            UploadForm,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Files", description = "Encrypted file storage"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
