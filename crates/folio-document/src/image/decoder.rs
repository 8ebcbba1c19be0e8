// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image decoder — turns encoded payloads (JPEG, PNG, GIF, ...) into pixel
// dimensions and flattened RGB8 buffers ready for PDF embedding. Uses the
// `image` crate.

use std::io::Cursor;

use folio_core::error::{FolioError, Result};
use image::{DynamicImage, ImageReader};
use tracing::{debug, instrument};

/// A fully decoded image, flattened to opaque RGB8.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triplets, `width * height * 3` bytes.
    pub rgb: Vec<u8>,
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Decoding seam between the working set / compositor and a concrete codec.
///
/// Implementations are called from blocking worker threads, so they must be
/// `Send + Sync` and may take as long as the codec needs.
pub trait ImageDecoder: Send + Sync {
    /// Read only the header and return the intrinsic (width, height).
    fn probe(&self, name: &str, bytes: &[u8]) -> Result<(u32, u32)>;

    /// Decode the whole payload into pixels.
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedImage>;
}

/// `ImageDecoder` backed by the `image` crate, with the format guessed from
/// the payload's magic bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl RasterDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ImageDecoder for RasterDecoder {
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    fn probe(&self, name: &str, bytes: &[u8]) -> Result<(u32, u32)> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|err| decode_error(name, err))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|err| decode_error(name, err))?;
        ensure_non_empty(name, width, height)?;
        debug!(width, height, "Image header probed");
        Ok((width, height))
    }

    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedImage> {
        let image = image::load_from_memory(bytes).map_err(|err| decode_error(name, err))?;
        ensure_non_empty(name, image.width(), image.height())?;
        let decoded = flatten_to_rgb(image);
        debug!(
            width = decoded.width,
            height = decoded.height,
            "Image decoded"
        );
        Ok(decoded)
    }
}

fn decode_error(name: &str, err: impl std::fmt::Display) -> FolioError {
    FolioError::Decode {
        name: name.to_string(),
        reason: err.to_string(),
    }
}

fn ensure_non_empty(name: &str, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(FolioError::Decode {
            name: name.to_string(),
            reason: format!("image has no pixels ({width}x{height})"),
        });
    }
    Ok(())
}

/// Convert to RGB8, compositing any transparency over white paper.
fn flatten_to_rgb(image: DynamicImage) -> DecodedImage {
    let width = image.width();
    let height = image.height();

    if !image.color().has_alpha() {
        return DecodedImage {
            width,
            height,
            rgb: image.to_rgb8().into_raw(),
        };
    }

    let rgba = image.to_rgba8();
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u16::from(a);
        for channel in [r, g, b] {
            // c * a + 255 * (1 - a), rounded.
            let blended = (u16::from(channel) * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    DecodedImage { width, height, rgb }
}
