// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sealed File Server - encrypted, ownership-gated file storage over HTTP
//!
//! Clients upload, download, replace, list and delete files. Content is
//! encrypted at rest with a key that exists only for the lifetime of the
//! process, and every mutation must present the `client_secret` that
//! created the file.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup
//! - `storage` - Encrypted file store, ownership ledger, crypto engine
//! - `tls` - Optional rustls termination

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
pub mod tls;
