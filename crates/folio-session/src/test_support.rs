// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for the session tests: synthetic PNGs and decoders with
// controllable timing.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use folio_core::error::Result;
use folio_document::{DecodedImage, ImageDecoder, RasterDecoder};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::working_set::CandidateFile;

/// Encode a solid grey PNG of the given size.
pub(crate) fn png(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 90, 90])));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode test PNG");
    bytes
}

pub(crate) fn png_candidate(name: &str, width: u32, height: u32) -> CandidateFile {
    CandidateFile::new(name, "image/png", png(width, height))
}

pub(crate) fn raster() -> Arc<dyn ImageDecoder> {
    Arc::new(RasterDecoder)
}

/// Probes of files named `slow*` take noticeably longer than the rest.
#[derive(Default)]
pub(crate) struct SlowFirstDecoder;

impl ImageDecoder for SlowFirstDecoder {
    fn probe(&self, name: &str, bytes: &[u8]) -> Result<(u32, u32)> {
        if name.starts_with("slow") {
            std::thread::sleep(Duration::from_millis(150));
        }
        RasterDecoder.probe(name, bytes)
    }

    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedImage> {
        RasterDecoder.decode(name, bytes)
    }
}

/// Records the order of full decodes and optionally delays each one.
pub(crate) struct RecordingDecoder {
    pub(crate) decoded: Mutex<Vec<String>>,
    delay: Duration,
}

impl RecordingDecoder {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            decoded: Mutex::new(Vec::new()),
            delay,
        }
    }

    pub(crate) fn decoded_names(&self) -> Vec<String> {
        self.decoded.lock().expect("decoder log").clone()
    }
}

impl ImageDecoder for RecordingDecoder {
    fn probe(&self, name: &str, bytes: &[u8]) -> Result<(u32, u32)> {
        RasterDecoder.probe(name, bytes)
    }

    fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedImage> {
        std::thread::sleep(self.delay);
        self.decoded.lock().expect("decoder log").push(name.to_string());
        RasterDecoder.decode(name, bytes)
    }
}
