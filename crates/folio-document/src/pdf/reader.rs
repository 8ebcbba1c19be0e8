// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspect produced documents (page count, page sizes, document
// information) using the `lopdf` crate.

use std::path::Path;

use folio_core::error::{FolioError, Result};
use lopdf::{Document, Object};
use tracing::{debug, info, instrument};

const MM_PER_PT: f32 = 25.4 / 72.0;

/// Read-only view over an existing PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            FolioError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            FolioError::Pdf(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// (width, height) of every page in millimetres, in page order, read from
    /// each page's /MediaBox.
    pub fn page_sizes_mm(&self) -> Result<Vec<(f32, f32)>> {
        // get_pages() is keyed by 1-indexed page number, so iteration is ordered.
        self.document
            .get_pages()
            .into_iter()
            .map(|(page_number, page_id)| {
                let media_box = self
                    .document
                    .get_dictionary(page_id)
                    .and_then(|dict| dict.get(b"MediaBox"))
                    .and_then(Object::as_array)
                    .map_err(|err| {
                        FolioError::Pdf(format!("page {page_number} has no /MediaBox: {err}"))
                    })?;

                let coords = media_box
                    .iter()
                    .map(Object::as_float)
                    .collect::<std::result::Result<Vec<f32>, _>>()
                    .map_err(|err| {
                        FolioError::Pdf(format!("page {page_number} /MediaBox is malformed: {err}"))
                    })?;
                match coords.as_slice() {
                    [x0, y0, x1, y1] => {
                        Ok(((x1 - x0).abs() * MM_PER_PT, (y1 - y0).abs() * MM_PER_PT))
                    }
                    _ => Err(FolioError::Pdf(format!(
                        "page {page_number} /MediaBox has {} entries",
                        coords.len()
                    ))),
                }
            })
            .collect()
    }

    /// A text entry of the /Info dictionary (e.g. `Title`, `Author`).
    ///
    /// Returns `None` if the document has no /Info or the key is absent.
    pub fn info_string(&self, key: &str) -> Option<String> {
        let info = match self.document.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.document.get_dictionary(*id).ok()?,
            Object::Dictionary(dict) => dict,
            _ => return None,
        };
        match info.get(key.as_bytes()).ok()? {
            Object::String(bytes, _) => Some(decode_pdf_text(bytes)),
            _ => None,
        }
    }
}

/// Decode a PDF text string: UTF-16BE when it carries a byte-order mark,
/// otherwise treated as (near-)ASCII.
fn decode_pdf_text(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    String::from_utf8_lossy(bytes).into_owned()
}
