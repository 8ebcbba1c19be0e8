// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::types::{PageConfig, PageFormat};

/// Binder settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Maximum number of images the working set holds.
    pub max_images: usize,
    /// Margin kept clear on every side of each page, in millimetres.
    pub margin_mm: f32,
    /// Page format and orientation used when the caller does not choose one.
    pub default_page: PageConfig,
    /// Prefix of the suggested output file name.
    pub file_name_prefix: String,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            max_images: 20,
            margin_mm: 10.0,
            default_page: PageConfig::default(),
            file_name_prefix: "images-to-pdf".into(),
        }
    }
}

impl FolioConfig {
    /// Read a JSON configuration file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), raw)?;
        Ok(())
    }

    /// Reject settings no composition could satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.max_images == 0 {
            return Err(FolioError::Config("max_images must be at least 1".into()));
        }
        if !self.margin_mm.is_finite() || self.margin_mm < 0.0 {
            return Err(FolioError::Config(format!(
                "margin_mm must be a non-negative number, got {}",
                self.margin_mm
            )));
        }
        // The smallest side in the catalog bounds the usable margin.
        let smallest_side = PageFormat::ALL
            .iter()
            .map(|format| {
                let (w, h) = format.dimensions_mm();
                w.min(h)
            })
            .fold(f32::INFINITY, f32::min);
        if 2.0 * self.margin_mm >= smallest_side {
            return Err(FolioError::Config(format!(
                "margin_mm {} leaves no printable area on a {smallest_side}mm page side",
                self.margin_mm
            )));
        }
        if self.file_name_prefix.trim().is_empty() {
            return Err(FolioError::Config("file_name_prefix must not be empty".into()));
        }
        Ok(())
    }
}
