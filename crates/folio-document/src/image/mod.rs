// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — header probing and full decoding of raster payloads.

pub mod decoder;

pub use decoder::{DecodedImage, ImageDecoder, RasterDecoder};
