// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end tests of the HTTP surface against a temporary storage root.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use sealed_file_server::{
    api::router,
    state::AppState,
    storage::{crypto::CIPHERTEXT_OVERHEAD, FileStore, StoragePaths},
};
use tower::ServiceExt;

const BOUNDARY: &str = "sealed-file-server-test-boundary";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR-test";
const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF-test";

struct TestApp {
    _dir: tempfile::TempDir,
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        Self::with_limit(None)
    }

    fn with_limit(limit: Option<usize>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::initialize(StoragePaths::new(dir.path().join("files")), false)
            .unwrap();
        let mut state = AppState::new(store);
        if let Some(limit) = limit {
            state = state.with_max_upload_bytes(limit);
        }
        Self {
            _dir: dir,
            app: router(state),
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

/// A `multipart/form-data` part.
struct Part<'a> {
    field: &'a str,
    file_name: Option<&'a str>,
    content_type: Option<&'a str>,
    bytes: &'a [u8],
}

impl<'a> Part<'a> {
    fn file(file_name: &'a str, content_type: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            field: "file",
            file_name: Some(file_name),
            content_type: Some(content_type),
            bytes,
        }
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.field);
        if let Some(name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(method: &str, uri: &str, secret: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(secret) = secret {
        builder = builder.header("client_secret", secret);
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete_request(uri: &str, secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(secret) = secret {
        builder = builder.header("client_secret", secret);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn error_message(response: Response) -> String {
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    json["error"].as_str().unwrap().to_string()
}

async fn upload_png(app: &TestApp, secret: &str) -> String {
    let response = app
        .send(upload_request(
            "POST",
            "/file",
            Some(secret),
            &[Part::file("image.png", "image/png", PNG_BYTES)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    String::from_utf8(body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn get_unknown_file_is_404() {
    let app = TestApp::new();
    let response = app.send(get_request("/file/filename.pdf")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(response).await, "The file has not been found");
}

#[tokio::test]
async fn upload_returns_uuid_with_extension() {
    let app = TestApp::new();
    let id = upload_png(&app, "user").await;

    let (stem, ext) = id.rsplit_once('.').unwrap();
    assert_eq!(ext, "png");
    assert!(uuid::Uuid::parse_str(stem).is_ok(), "{id}");
}

#[tokio::test]
async fn upload_without_file_part_is_400() {
    let app = TestApp::new();
    let response = app
        .send(upload_request(
            "POST",
            "/file",
            Some("user"),
            &[Part {
                field: "other",
                file_name: None,
                content_type: None,
                bytes: b"value",
            }],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "The file field is required");
}

#[tokio::test]
async fn upload_empty_file_is_400() {
    let app = TestApp::new();
    let response = app
        .send(upload_request(
            "POST",
            "/file",
            Some("user"),
            &[Part::file("empty.png", "image/png", b"")],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "The file field is required");
}

#[tokio::test]
async fn upload_non_multipart_is_400() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/file")
        .header("client_secret", "user")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_text_file_is_400() {
    let app = TestApp::new();
    let response = app
        .send(upload_request(
            "POST",
            "/file",
            Some("user"),
            &[Part::file("notes.txt", "text/plain", b"hello")],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(response).await,
        "The file format to be uploaded is not allowed"
    );
}

#[tokio::test]
async fn upload_format_is_checked_before_secret() {
    let app = TestApp::new();
    let response = app
        .send(upload_request(
            "POST",
            "/file",
            None,
            &[Part::file("notes.txt", "text/plain", b"hello")],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_without_secret_is_403() {
    let app = TestApp::new();
    let response = app
        .send(upload_request(
            "POST",
            "/file",
            None,
            &[Part::file("image.png", "image/png", PNG_BYTES)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        error_message(response).await,
        "The client secret is a required header"
    );
}

#[tokio::test]
async fn upload_without_extension_is_400() {
    let app = TestApp::new();
    let response = app
        .send(upload_request(
            "POST",
            "/file",
            Some("user"),
            &[Part::file("image", "image/png", PNG_BYTES)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(response).await,
        "The uploaded file name has no extension"
    );
}

#[tokio::test]
async fn upload_over_limit_is_413() {
    let app = TestApp::with_limit(Some(1024));
    let big = vec![0u8; 4096];
    let response = app
        .send(upload_request(
            "POST",
            "/file",
            Some("user"),
            &[Part::file("big.png", "image/png", &big)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn download_returns_plaintext_and_headers() {
    let app = TestApp::new();
    let id = upload_png(&app, "user").await;

    let response = app.send(get_request(&format!("/file/{id}"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment;filename={id}").as_str()
    );
    assert_eq!(body_bytes(response).await, PNG_BYTES);
}

#[tokio::test]
async fn put_unknown_file_is_404() {
    let app = TestApp::new();
    let response = app
        .send(upload_request(
            "PUT",
            "/file/filename.png",
            Some("user"),
            &[Part::file("image.png", "image/png", PNG_BYTES)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_checks_file_format_and_secret() {
    let app = TestApp::new();
    let id = upload_png(&app, "user").await;
    let uri = format!("/file/{id}");

    let empty = app
        .send(upload_request("PUT", &uri, Some("user"), &[Part::file("a.png", "image/png", b"")]))
        .await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let text = app
        .send(upload_request("PUT", &uri, Some("user"), &[Part::file("a.txt", "text/plain", b"x")]))
        .await;
    assert_eq!(text.status(), StatusCode::BAD_REQUEST);

    let missing = app
        .send(upload_request("PUT", &uri, None, &[Part::file("a.png", "image/png", PNG_BYTES)]))
        .await;
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    let wrong = app
        .send(upload_request("PUT", &uri, Some("1"), &[Part::file("a.png", "image/png", PNG_BYTES)]))
        .await;
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        error_message(wrong).await,
        "The client secret does not own this resource"
    );
}

#[tokio::test]
async fn delete_requires_secret_and_ownership() {
    let app = TestApp::new();
    let missing = app.send(delete_request("/file/filename.png", None)).await;
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    let unknown = app.send(delete_request("/file/filename.png", Some("user"))).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let id = upload_png(&app, "user").await;
    let wrong = app.send(delete_request(&format!("/file/{id}"), Some("1"))).await;
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_files_reports_entries() {
    let app = TestApp::new();
    let empty = app.send(get_request("/files")).await;
    assert_eq!(empty.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(empty).await).unwrap();
    assert_eq!(json, serde_json::json!([]));

    let id = upload_png(&app, "user").await;
    let response = app.send(get_request("/files")).await;
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], id.as_str());
    assert_eq!(entries[0]["type"], "png");
    // Size is the on-disk ciphertext: nonce and tag on top of the plaintext.
    assert_eq!(entries[0]["size"], (PNG_BYTES.len() + CIPHERTEXT_OVERHEAD) as u64);
    assert!(entries[0]["path"].as_str().unwrap().ends_with(&id));
}

#[tokio::test]
async fn full_file_lifecycle() {
    let app = TestApp::new();
    let id = upload_png(&app, "user").await;
    let uri = format!("/file/{id}");

    let response = app.send(get_request(&uri)).await;
    assert_eq!(body_bytes(response).await, PNG_BYTES);

    let replaced = app
        .send(upload_request(
            "PUT",
            &uri,
            Some("user"),
            &[Part::file("photo.jpg", "image/jpeg", JPEG_BYTES)],
        ))
        .await;
    assert_eq!(replaced.status(), StatusCode::OK);

    // The identifier keeps its extension; only the content changes.
    let response = app.send(get_request(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, JPEG_BYTES);

    let wrong = app.send(delete_request(&uri, Some("1"))).await;
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let deleted = app.send(delete_request(&uri, Some("user"))).await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = app.send(get_request(&uri)).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new();
    let response = app.send(get_request("/health/live")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/health/live")
        .header("x-request-id", "fixed-id")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.headers()["x-request-id"], "fixed-id");
}

#[tokio::test]
async fn readiness_probe_is_ok() {
    let app = TestApp::new();
    let response = app.send(get_request("/health/ready")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();
    let response = app.send(get_request("/api-doc/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(json["paths"]["/file/{id}"].is_object());
}
