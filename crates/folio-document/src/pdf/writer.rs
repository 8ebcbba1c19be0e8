// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — accumulate one-image pages into a document using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: images are registered as XObjects on
// the document, pages are `PdfPage` structs holding `Vec<Op>` operation lists,
// and the whole thing is serialised once via `PdfDocument::save()`.

use folio_core::error::{FolioError, Result};
use folio_core::{DocumentMetadata, Placement};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

use crate::image::DecodedImage;
use crate::layout::PageGeometry;

/// At 72 DPI one image pixel is one PDF point before scaling.
const EMBED_DPI: f32 = 72.0;

/// Single mutable accumulator for an image-per-page PDF.
///
/// Pages are appended one at a time; nothing is serialised until
/// [`PdfWriter::finish`], so a writer dropped half-way leaves no output.
pub struct PdfWriter {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
}

impl PdfWriter {
    /// Start an empty document carrying the given metadata.
    pub fn new(metadata: &DocumentMetadata) -> Self {
        let mut doc = PdfDocument::new(metadata.title);
        let info = &mut doc.metadata.info;
        info.subject = metadata.subject.to_string();
        info.author = metadata.author.to_string();
        info.creator = metadata.creator.to_string();
        info.producer = metadata.producer.to_string();
        Self {
            doc,
            pages: Vec::new(),
        }
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a page of `geometry`'s size holding `image` at `placement`.
    ///
    /// `placement` is measured from the top-left corner; PDF user space starts
    /// bottom-left, so the vertical offset is flipped here.
    #[instrument(skip(self, image), fields(page = self.pages.len() + 1, width = image.width, height = image.height))]
    pub fn push_image_page(
        &mut self,
        geometry: &PageGeometry,
        image: &DecodedImage,
        placement: &Placement,
    ) -> Result<()> {
        let expected_len = image.width as usize * image.height as usize * 3;
        if image.rgb.len() != expected_len {
            return Err(FolioError::Pdf(format!(
                "pixel buffer holds {} bytes, expected {expected_len} for {}x{}",
                image.rgb.len(),
                image.width,
                image.height
            )));
        }

        let raw = RawImage {
            pixels: RawImageData::U8(image.rgb.clone()),
            width: image.width as usize,
            height: image.height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = self.doc.add_image(&raw);

        let bottom_mm = geometry.page_height_mm - placement.y_mm - placement.height_mm;
        let scale_x = Mm(placement.width_mm).into_pt().0 / image.width as f32;
        let scale_y = Mm(placement.height_mm).into_pt().0 / image.height as f32;

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Mm(placement.x_mm).into_pt()),
                translate_y: Some(Mm(bottom_mm).into_pt()),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(EMBED_DPI),
                rotate: None,
            },
        }];

        self.pages.push(PdfPage::new(
            Mm(geometry.page_width_mm),
            Mm(geometry.page_height_mm),
            ops,
        ));

        debug!(
            x_mm = placement.x_mm,
            y_mm = placement.y_mm,
            width_mm = placement.width_mm,
            height_mm = placement.height_mm,
            "Image placed on page"
        );
        Ok(())
    }

    /// Serialise the document. A document without pages is refused.
    #[instrument(skip(self), fields(pages = self.pages.len()))]
    pub fn finish(self) -> Result<Vec<u8>> {
        let Self { mut doc, pages } = self;
        if pages.is_empty() {
            return Err(FolioError::Pdf("refusing to write a PDF with no pages".into()));
        }

        let page_count = pages.len();
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }

        info!(page_count, bytes = output.len(), "PDF serialised");
        Ok(output)
    }
}
