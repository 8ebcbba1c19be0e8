// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use thiserror::Error;

/// Top-level error type for all Folio operations.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Working set --
    #[error("working set is limited to {cap} images; {skipped} skipped")]
    CapacityExceeded { cap: usize, skipped: usize },

    #[error("{name} is not an image (declared type: {content_type})")]
    UnsupportedFile { name: String, content_type: String },

    // -- Composition --
    #[error("failed to load image {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("layout failed: {0}")]
    Layout(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("composition cancelled")]
    Cancelled,

    #[error("background task failed: {0}")]
    Task(String),

    // -- Configuration / persistence --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FolioError {
    /// Name of the asset that caused the failure, when there is one.
    pub fn asset_name(&self) -> Option<&str> {
        match self {
            Self::Decode { name, .. } | Self::UnsupportedFile { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
