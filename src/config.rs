// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AppConfig`] loaded from them once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for encrypted file storage | `upload-dir` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `MAX_UPLOAD_BYTES` | Maximum request body size | `20971520` (20 MiB) |
//! | `PURGE_DATA_ON_START` | Wipe `DATA_DIR` before serving | `false` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | unset |
//! | `TLS_KEY_PATH` | PEM private key | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::logging::LogFormat;
use crate::storage::paths::DEFAULT_ROOT;

/// Environment variable name for the storage root.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
/// When true, everything under `DATA_DIR` is deleted at startup.
pub const PURGE_DATA_ON_START_ENV: &str = "PURGE_DATA_ON_START";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_PORT: u16 = 8080;
/// 20 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("{present} is set but {missing} is not; TLS needs both")]
    IncompleteTls {
        present: &'static str,
        missing: &'static str,
    },
}

/// Certificate and key locations for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub purge_on_start: bool,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_ROOT),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            purge_on_start: false,
            tls: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let host = parse_or(get(HOST_ENV), HOST_ENV, defaults.host)?;
        let port = parse_or(get(PORT_ENV), PORT_ENV, defaults.port)?;
        let max_upload_bytes = parse_or(
            get(MAX_UPLOAD_BYTES_ENV),
            MAX_UPLOAD_BYTES_ENV,
            defaults.max_upload_bytes,
        )?;
        let purge_on_start = match get(PURGE_DATA_ON_START_ENV) {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                var: PURGE_DATA_ON_START_ENV,
                value,
            })?,
            None => defaults.purge_on_start,
        };
        let log_format = match get(LOG_FORMAT_ENV) {
            Some(value) => value.parse::<LogFormat>().map_err(|_| ConfigError::InvalidValue {
                var: LOG_FORMAT_ENV,
                value,
            })?,
            None => defaults.log_format,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::IncompleteTls {
                    present: TLS_CERT_PATH_ENV,
                    missing: TLS_KEY_PATH_ENV,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteTls {
                    present: TLS_KEY_PATH_ENV,
                    missing: TLS_CERT_PATH_ENV,
                })
            }
        };

        Ok(Self {
            data_dir,
            host,
            port,
            max_upload_bytes,
            purge_on_start,
            tls,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
