// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Optional HTTPS termination with rustls.
//!
//! When `TLS_CERT_PATH` and `TLS_KEY_PATH` are both set the server only
//! speaks HTTPS; otherwise it serves plain HTTP (for use behind a
//! TLS-terminating proxy).

use std::io;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsPaths;

/// Install the ring crypto provider for rustls.
///
/// Must run before any TLS configuration is built. Repeated calls are
/// harmless.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }
}

/// Load the PEM certificate chain and private key.
pub async fn load_rustls_config(paths: &TlsPaths) -> io::Result<RustlsConfig> {
    let config = RustlsConfig::from_pem_file(&paths.cert, &paths.key).await?;
    tracing::info!(
        cert = %paths.cert.display(),
        "Loaded TLS certificate"
    );
    Ok(config)
}
