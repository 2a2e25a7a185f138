//! Resolution-independent placement of the two caption bands.
//!
//! Every length here is a fixed fraction of the surface width, so the same
//! document laid out on a 400px preview and an 800px export differs only by
//! a uniform scale factor.

use crate::models::{Alignment, Band, HexColor, MemeDocument, DEFAULT_FONT_SIZE};

/// Surface width at which a style's font size maps 1:1 to pixels.
pub const REFERENCE_WIDTH: f32 = 800.0;
/// Distance from the surface edges, as a fraction of surface width.
pub const MARGIN_RATIO: f32 = 0.03;
/// Outline width per pixel of font size: a default-sized band on the
/// reference width gets a 0.008 × width outline.
pub const STROKE_RATIO: f32 = 0.008 * REFERENCE_WIDTH / DEFAULT_FONT_SIZE as f32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Largest surface with this aspect ratio that fits inside `bounds`.
    pub fn fit_within(&self, bounds: Surface) -> Surface {
        if self.width == 0 || self.height == 0 {
            return Surface::new(0, 0);
        }
        let scale = (bounds.width as f64 / self.width as f64)
            .min(bounds.height as f64 / self.height as f64);
        Surface::new(
            ((self.width as f64 * scale).round() as u32).max(1),
            ((self.height as f64 * scale).round() as u32).max(1),
        )
    }
}

/// Which edge of the text box sits on `anchor_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandPlan {
    pub band: Band,
    /// Already uppercased.
    pub text: String,
    pub font_px: f32,
    pub stroke_width: f32,
    pub anchor_x: f32,
    pub anchor_y: f32,
    pub alignment: Alignment,
    pub vertical: VerticalAnchor,
    pub fill: HexColor,
    pub outline: HexColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub surface: Surface,
    pub bands: Vec<BandPlan>,
}

impl RenderPlan {
    pub fn band(&self, band: Band) -> Option<&BandPlan> {
        self.bands.iter().find(|plan| plan.band == band)
    }
}

pub fn layout(document: &MemeDocument, surface: Surface) -> RenderPlan {
    let bands = [Band::Top, Band::Bottom]
        .into_iter()
        .filter_map(|band| plan_band(document, band, surface))
        .collect();
    RenderPlan { surface, bands }
}

fn plan_band(document: &MemeDocument, band: Band, surface: Surface) -> Option<BandPlan> {
    let (text, style) = document.band(band);
    if text.trim().is_empty() {
        return None;
    }

    let width = surface.width as f32;
    let height = surface.height as f32;
    let margin = width * MARGIN_RATIO;
    let font_px = style.font_size() as f32 * width / REFERENCE_WIDTH;

    let anchor_x = match style.alignment {
        Alignment::Left => margin,
        Alignment::Center => width / 2.0,
        Alignment::Right => width - margin,
    };
    let (anchor_y, vertical) = match band {
        Band::Top => (margin, VerticalAnchor::Top),
        Band::Bottom => (height - margin, VerticalAnchor::Bottom),
    };

    Some(BandPlan {
        band,
        text: text.to_uppercase(),
        font_px,
        stroke_width: font_px * STROKE_RATIO,
        anchor_x,
        anchor_y,
        alignment: style.alignment,
        vertical,
        fill: style.color,
        outline: HexColor::BLACK,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImagePayload, TextStyle};

    fn document(top: &str, bottom: &str) -> MemeDocument {
        MemeDocument::new(ImagePayload::new(vec![0], "image/jpeg", 800, 800)).with_text(top, bottom)
    }

    #[test]
    fn proportions_are_invariant_across_surface_sizes() {
        let doc = document("one does not simply", "scale text").with_styles(
            TextStyle::new(72, HexColor::WHITE, Alignment::Left),
            TextStyle::new(40, HexColor::BLACK, Alignment::Right),
        );
        let small = layout(&doc, Surface::new(400, 400));
        let large = layout(&doc, Surface::new(800, 800));

        assert_eq!(small.bands.len(), 2);
        for (s, l) in small.bands.iter().zip(&large.bands) {
            assert_eq!(s.band, l.band);
            assert!((s.anchor_x / 400.0 - l.anchor_x / 800.0).abs() < 1e-6);
            assert!((s.anchor_y / 400.0 - l.anchor_y / 800.0).abs() < 1e-6);
            assert!((s.font_px / 400.0 - l.font_px / 800.0).abs() < 1e-6);
            assert!((s.stroke_width / 400.0 - l.stroke_width / 800.0).abs() < 1e-6);
        }
    }

    #[test]
    fn reference_width_maps_font_size_to_pixels() {
        let plan = layout(&document("hi", ""), Surface::new(800, 600));
        let top = plan.band(Band::Top).unwrap();
        assert_eq!(top.font_px, 60.0);
        assert!((top.stroke_width - 6.4).abs() < 1e-4);
        assert_eq!(top.anchor_x, 400.0);
        assert_eq!(top.anchor_y, 24.0);
        assert_eq!(top.vertical, VerticalAnchor::Top);
    }

    #[test]
    fn bottom_band_hangs_from_bottom_margin() {
        let plan = layout(&document("", "bottom"), Surface::new(1000, 500));
        assert!(plan.band(Band::Top).is_none());
        let bottom = plan.band(Band::Bottom).unwrap();
        assert_eq!(bottom.anchor_y, 470.0);
        assert_eq!(bottom.vertical, VerticalAnchor::Bottom);
        assert_eq!(bottom.font_px, 75.0);
    }

    #[test]
    fn alignment_anchors_use_width_margin() {
        let mut doc = document("x", "y");
        doc.top_style.alignment = Alignment::Left;
        doc.bottom_style.alignment = Alignment::Right;
        let plan = layout(&doc, Surface::new(500, 300));
        assert_eq!(plan.band(Band::Top).unwrap().anchor_x, 15.0);
        assert_eq!(plan.band(Band::Bottom).unwrap().anchor_x, 485.0);
    }

    #[test]
    fn text_is_uppercased_and_blank_text_skipped() {
        let plan = layout(&document("straße ok", "   "), Surface::new(400, 400));
        assert_eq!(plan.bands.len(), 1);
        assert_eq!(plan.bands[0].text, "STRASSE OK");
        assert_eq!(plan.bands[0].outline, HexColor::BLACK);
    }

    #[test]
    fn fit_within_preserves_aspect() {
        assert_eq!(Surface::new(800, 400).fit_within(Surface::new(400, 400)), Surface::new(400, 200));
        assert_eq!(Surface::new(300, 600).fit_within(Surface::new(400, 400)), Surface::new(200, 400));
        assert_eq!(Surface::new(100, 100).fit_within(Surface::new(640, 480)), Surface::new(480, 480));
    }

    #[test]
    fn empty_bounds_fit_to_one_pixel() {
        assert_eq!(Surface::new(800, 400).fit_within(Surface::new(0, 0)), Surface::new(1, 1));
        assert_eq!(Surface::new(800, 400).fit_within(Surface::new(0, 300)), Surface::new(1, 1));
        assert_eq!(Surface::new(0, 400).fit_within(Surface::new(640, 480)), Surface::new(0, 0));
    }
}
