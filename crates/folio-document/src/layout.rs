// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout engine — fit one image inside a page's printable area.
//
// The image is scaled by the largest factor that fits both axes (never
// cropped, never stretched, upscaled when small) and centred within the area
// left after removing a fixed margin from every side.

use folio_core::PageConfig;
use folio_core::Placement;
use folio_core::error::{FolioError, Result};

/// Computes per-image placements for a fixed margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEngine {
    margin_mm: f32,
}

/// Page and printable-area geometry in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
}

impl PageGeometry {
    pub fn printable_width_mm(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    pub fn printable_height_mm(&self) -> f32 {
        self.page_height_mm - 2.0 * self.margin_mm
    }
}

impl LayoutEngine {
    pub fn new(margin_mm: f32) -> Self {
        Self { margin_mm }
    }

    pub fn margin_mm(&self) -> f32 {
        self.margin_mm
    }

    /// Geometry of a page under this engine's margin.
    pub fn geometry(&self, page: &PageConfig) -> Result<PageGeometry> {
        if !(self.margin_mm.is_finite() && self.margin_mm >= 0.0) {
            return Err(FolioError::Layout(format!(
                "margin must be a non-negative length, got {}mm",
                self.margin_mm
            )));
        }
        let (page_width_mm, page_height_mm) = page.dimensions_mm();
        let geometry = PageGeometry {
            page_width_mm,
            page_height_mm,
            margin_mm: self.margin_mm,
        };
        if !(geometry.printable_width_mm() > 0.0 && geometry.printable_height_mm() > 0.0) {
            return Err(FolioError::Layout(format!(
                "margin {}mm leaves no printable area on a {}x{}mm page",
                self.margin_mm, page_width_mm, page_height_mm
            )));
        }
        Ok(geometry)
    }

    /// Place an image of `image_px` (width, height) on the given page.
    pub fn place(&self, image_px: (u32, u32), page: &PageConfig) -> Result<Placement> {
        let geometry = self.geometry(page)?;
        fit_centered(image_px, &geometry)
    }
}

/// Fit `image_px` into the printable area of `geometry`, preserving aspect
/// ratio, and centre it.
pub fn fit_centered(image_px: (u32, u32), geometry: &PageGeometry) -> Result<Placement> {
    let (iw, ih) = image_px;
    if iw == 0 || ih == 0 {
        return Err(FolioError::Layout(format!(
            "image has no pixels ({iw}x{ih})"
        )));
    }

    // f64 keeps the aspect ratio exact well beyond what f32 output needs.
    let margin = f64::from(geometry.margin_mm);
    let pw = f64::from(geometry.printable_width_mm());
    let ph = f64::from(geometry.printable_height_mm());
    if !(pw > 0.0 && ph > 0.0) {
        return Err(FolioError::Layout(format!(
            "printable area is empty ({pw}x{ph}mm)"
        )));
    }

    let (iw, ih) = (f64::from(iw), f64::from(ih));
    let scale = (pw / iw).min(ph / ih);
    let width = iw * scale;
    let height = ih * scale;

    Ok(Placement {
        x_mm: (margin + (pw - width) / 2.0) as f32,
        y_mm: (margin + (ph - height) / 2.0) as f32,
        width_mm: width as f32,
        height_mm: height as f32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Orientation, PageFormat};

    const EPS: f32 = 1e-3;

    fn a4_portrait() -> PageConfig {
        PageConfig::new(PageFormat::A4, Orientation::Portrait)
    }

    fn assert_contained(placement: &Placement, geometry: &PageGeometry) {
        let m = geometry.margin_mm;
        assert!(placement.x_mm >= m - EPS, "{placement:?}");
        assert!(placement.y_mm >= m - EPS, "{placement:?}");
        assert!(
            placement.x_mm + placement.width_mm <= geometry.page_width_mm - m + EPS,
            "{placement:?}"
        );
        assert!(
            placement.y_mm + placement.height_mm <= geometry.page_height_mm - m + EPS,
            "{placement:?}"
        );
    }

    #[test]
    fn landscape_image_on_a4_portrait_is_width_bound() {
        let engine = LayoutEngine::new(10.0);
        let placement = engine.place((800, 600), &a4_portrait()).expect("place");

        let scale = (190.0f32 / 800.0).min(277.0 / 600.0);
        assert!((placement.width_mm - 800.0 * scale).abs() < EPS);
        assert!((placement.height_mm - 600.0 * scale).abs() < EPS);
        assert!((placement.width_mm - 190.0).abs() < EPS);
        assert!((placement.x_mm - 10.0).abs() < EPS);
        assert!((placement.y_mm - (10.0 + (277.0 - 142.5) / 2.0)).abs() < EPS);
    }

    #[test]
    fn portrait_image_on_a4_portrait_is_width_bound_too() {
        let engine = LayoutEngine::new(10.0);
        let placement = engine.place((600, 800), &a4_portrait()).expect("place");

        let scale = (190.0f32 / 600.0).min(277.0 / 800.0);
        assert!((placement.width_mm - 600.0 * scale).abs() < EPS);
        assert!((placement.height_mm - 800.0 * scale).abs() < EPS);
        // 190/600 < 277/800, so the width fills the printable area.
        assert!((placement.width_mm - 190.0).abs() < EPS);
    }

    #[test]
    fn tall_image_is_height_bound_and_centred_horizontally() {
        let engine = LayoutEngine::new(10.0);
        let placement = engine.place((100, 1000), &a4_portrait()).expect("place");
        assert!((placement.height_mm - 277.0).abs() < EPS);
        assert!((placement.y_mm - 10.0).abs() < EPS);
        let centre = placement.x_mm + placement.width_mm / 2.0;
        assert!((centre - 105.0).abs() < EPS);
    }

    #[test]
    fn small_images_are_upscaled_to_fit() {
        let engine = LayoutEngine::new(10.0);
        let placement = engine.place((19, 27), &a4_portrait()).expect("place");
        assert!(placement.width_mm > 19.0);
        assert!(
            (placement.width_mm - 190.0).abs() < EPS || (placement.height_mm - 277.0).abs() < EPS
        );
    }

    #[test]
    fn matching_aspect_fills_both_axes() {
        let engine = LayoutEngine::new(10.0);
        let placement = engine.place((190, 277), &a4_portrait()).expect("place");
        assert!((placement.width_mm - 190.0).abs() < EPS);
        assert!((placement.height_mm - 277.0).abs() < EPS);
    }

    #[test]
    fn aspect_and_containment_hold_across_catalog() {
        let engine = LayoutEngine::new(10.0);
        let sizes = [
            (1, 1),
            (1, 5000),
            (5000, 1),
            (640, 480),
            (1080, 1920),
            (4000, 3000),
            (333, 777),
        ];
        for format in PageFormat::ALL {
            for orientation in [Orientation::Portrait, Orientation::Landscape] {
                let page = PageConfig::new(format, orientation);
                let geometry = engine.geometry(&page).expect("geometry");
                for (iw, ih) in sizes {
                    let placement = engine.place((iw, ih), &page).expect("place");
                    let expected = iw as f64 / ih as f64;
                    let actual = placement.width_mm as f64 / placement.height_mm as f64;
                    assert!(
                        (actual - expected).abs() / expected < 1e-4,
                        "{format:?} {orientation:?} {iw}x{ih}: {actual} vs {expected}"
                    );
                    assert!(placement.width_mm <= geometry.printable_width_mm() + EPS);
                    assert!(placement.height_mm <= geometry.printable_height_mm() + EPS);
                    assert_contained(&placement, &geometry);

                    // At least one axis touches the printable boundary.
                    let touches_width =
                        (placement.width_mm - geometry.printable_width_mm()).abs() < 0.01;
                    let touches_height =
                        (placement.height_mm - geometry.printable_height_mm()).abs() < 0.01;
                    assert!(touches_width || touches_height);
                }
            }
        }
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        let engine = LayoutEngine::new(10.0);
        assert!(matches!(
            engine.place((0, 10), &a4_portrait()),
            Err(FolioError::Layout(_))
        ));
    }

    #[test]
    fn margin_swallowing_page_is_rejected() {
        let engine = LayoutEngine::new(105.0);
        assert!(matches!(
            engine.geometry(&a4_portrait()),
            Err(FolioError::Layout(_))
        ));
    }

    #[test]
    fn negative_margin_is_rejected() {
        let engine = LayoutEngine::new(-10.0);
        assert!(matches!(
            engine.place((800, 600), &a4_portrait()),
            Err(FolioError::Layout(_))
        ));
        assert!(LayoutEngine::new(f32::NAN).geometry(&a4_portrait()).is_err());
    }

    #[test]
    fn zero_margin_uses_the_whole_page() {
        let placement = LayoutEngine::new(0.0)
            .place((210, 297), &a4_portrait())
            .expect("place");
        assert!(placement.x_mm.abs() < 1e-3 && placement.y_mm.abs() < 1e-3);
        assert!((placement.width_mm - 210.0).abs() < 1e-3);
    }
}
