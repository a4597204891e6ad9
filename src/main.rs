// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use sealed_file_server::{
    api::router,
    config::AppConfig,
    logging::init_tracing,
    state::AppState,
    storage::{FileStore, StoragePaths},
    tls,
};

/// Grace period for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Invalid configuration");
    init_tracing(config.log_format);

    // The key and ownership ledger are process-lifetime only: files from a
    // previous run stay on disk but cannot be decrypted or mutated.
    let store = FileStore::initialize(StoragePaths::new(&config.data_dir), config.purge_on_start)
        .expect("Failed to initialize file store");

    let state = AppState::new(store).with_max_upload_bytes(config.max_upload_bytes);
    let app = router(state);
    let addr = config.bind_addr();

    let handle = axum_server::Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, draining connections");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    match &config.tls {
        Some(paths) => {
            tls::install_crypto_provider();
            let tls_config = tls::load_rustls_config(paths)
                .await
                .expect("Failed to load TLS certificate");

            tracing::info!(%addr, "Sealed file server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        None => {
            tracing::info!(%addr, "Sealed file server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
