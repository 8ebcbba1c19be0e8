// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — Document processing for the Folio image-to-PDF binder.
//
// Provides the decoding seam (header probe, full decode to RGB), the layout
// engine that fits an image inside a page's printable area, and PDF output
// (page accumulation with `printpdf`, inspection with `lopdf`).

pub mod image;
pub mod layout;
pub mod pdf;

// Re-export the primary structs so callers can use `folio_document::PdfWriter` etc.
pub use self::image::decoder::{DecodedImage, ImageDecoder, RasterDecoder};
pub use layout::{LayoutEngine, PageGeometry};
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
