// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Folio image-to-PDF binder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an image in the working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub Uuid);

impl AssetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a declared content type names a raster image (`image/*`).
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Infer a content type from a file extension.
///
/// Unknown extensions map to `application/octet-stream`, which the working
/// set treats as "not an image".
pub fn content_type_from_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Named physical page formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PageFormat {
    /// Every format in the catalog.
    pub const ALL: [PageFormat; 6] = [
        Self::A3,
        Self::A4,
        Self::A5,
        Self::Letter,
        Self::Legal,
        Self::Tabloid,
    ];

    /// Portrait dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match self {
            Self::A3 => (297.0, 420.0),
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::Tabloid => (279.4, 431.8),
        }
    }

    /// Lowercase catalog name ("a4", "letter", ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::A3 => "a3",
            Self::A4 => "a4",
            Self::A5 => "a5",
            Self::Letter => "letter",
            Self::Legal => "legal",
            Self::Tabloid => "tabloid",
        }
    }

    /// Parse a catalog name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|format| format.name() == wanted)
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "portrait" => Some(Self::Portrait),
            "landscape" => Some(Self::Landscape),
            _ => None,
        }
    }
}

/// Page size and orientation for one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageConfig {
    pub format: PageFormat,
    pub orientation: Orientation,
}

impl PageConfig {
    pub fn new(format: PageFormat, orientation: Orientation) -> Self {
        Self {
            format,
            orientation,
        }
    }

    /// Oriented page dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f32, f32) {
        let (w, h) = self.format.dimensions_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Where one image lands on its page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Document information written into every produced PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub title: &'static str,
    pub subject: &'static str,
    pub author: &'static str,
    pub creator: &'static str,
    pub producer: &'static str,
}

impl DocumentMetadata {
    pub const STANDARD: DocumentMetadata = DocumentMetadata {
        title: "Images to PDF",
        subject: "Generated PDF from images",
        author: "Folio Tools",
        creator: "Folio PDF Generator",
        producer: "Folio PDF Generator",
    };
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// File name offered to the output consumer: `{prefix}-{unix millis}.pdf`.
pub fn suggested_file_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}-{}.pdf", at.timestamp_millis())
}
