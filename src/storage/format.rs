// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Accepted upload formats and extension-based content type probing.
//!
//! Decisions are made on the declared content type only. The payload is
//! never sniffed.

/// File kinds the store accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Jpeg,
    Gif,
    Png,
}

impl FileFormat {
    pub const ALL: [FileFormat; 4] = [
        FileFormat::Pdf,
        FileFormat::Jpeg,
        FileFormat::Gif,
        FileFormat::Png,
    ];

    pub fn mime_type(self) -> &'static str {
        match self {
            FileFormat::Pdf => "application/pdf",
            FileFormat::Jpeg => "image/jpeg",
            FileFormat::Gif => "image/gif",
            FileFormat::Png => "image/png",
        }
    }

    /// Exact, case-sensitive match on the declared MIME type.
    pub fn from_mime(declared: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.mime_type() == declared)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(FileFormat::Pdf),
            "jpg" | "jpeg" => Some(FileFormat::Jpeg),
            "gif" => Some(FileFormat::Gif),
            "png" => Some(FileFormat::Png),
            _ => None,
        }
    }
}

/// Content type used when the extension is unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Whether a declared content type is on the allow-list.
pub fn is_allowed(declared: Option<&str>) -> bool {
    declared.and_then(FileFormat::from_mime).is_some()
}

/// Extension of a stored identifier (text after the last dot).
pub fn extension_of(id: &str) -> Option<&str> {
    match id.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Guess the response content type of a stored file from its identifier.
pub fn probe_content_type(id: &str) -> &'static str {
    extension_of(id)
        .and_then(FileFormat::from_extension)
        .map(FileFormat::mime_type)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// Extension to use for a new identifier, taken from the uploaded file name.
///
/// The segment after the first dot is used (`scan.v2.pdf` gives `v2`). It
/// must be non-empty ASCII alphanumeric so the resulting identifier stays a
/// single safe path component.
pub fn upload_extension(original_filename: &str) -> Option<&str> {
    let ext = original_filename.split('.').nth(1)?;
    if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}
