use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::{imageops, imageops::FilterType, ImageFormat, Rgba, RgbaImage};

use crate::{
    compositing::{
        export::ExportArtifact,
        font::MemeFont,
        layout::{layout, BandPlan, RenderPlan, Surface, VerticalAnchor},
    },
    config::CompositingConfig,
    error::{MemeError, Result},
    logger,
    models::{Alignment, HexColor, ImagePayload, MemeDocument},
};

/// Draws every band of `plan` onto `canvas`: black outline first, fill on top.
pub fn render(plan: &RenderPlan, canvas: &mut RgbaImage, font: &MemeFont) {
    for band in &plan.bands {
        draw_band(band, canvas, font);
    }
}

pub fn decode_source(image: &ImagePayload) -> Result<RgbaImage> {
    image::load_from_memory(image.bytes())
        .map(|decoded| decoded.to_rgba8())
        .map_err(|e| MemeError::RenderSourceUnavailable(e.to_string()))
}

/// Owns the caption font and renders documents to preview or export rasters.
#[derive(Debug, Clone)]
pub struct Compositor {
    font: Arc<MemeFont>,
    export_dir: PathBuf,
}

impl Compositor {
    pub fn new(font: MemeFont) -> Self {
        Self {
            font: Arc::new(font),
            export_dir: CompositingConfig::default().export_dir,
        }
    }

    pub fn from_config(config: &CompositingConfig) -> Result<Self> {
        let font = MemeFont::locate(config.font_path.as_deref())?;
        log::info!("Caption font loaded from {}", font.source().display());
        Ok(Self::new(font).with_export_dir(config.export_dir.clone()))
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn export_dir(&self) -> &std::path::Path {
        &self.export_dir
    }

    /// Renders the document scaled to fit inside `viewport`.
    pub fn preview(&self, document: &MemeDocument, viewport: Surface) -> Result<RgbaImage> {
        let source = decode_source(&document.image)?;
        let fitted = Surface::new(source.width(), source.height()).fit_within(viewport);
        if fitted.width == 0 || fitted.height == 0 {
            return Err(MemeError::RenderSourceUnavailable(
                "image has no pixels".into(),
            ));
        }

        let mut canvas = if fitted.width == source.width() && fitted.height == source.height() {
            source
        } else {
            imageops::resize(&source, fitted.width, fitted.height, FilterType::Triangle)
        };
        render(&layout(document, fitted), &mut canvas, &self.font);
        Ok(canvas)
    }

    /// Renders at the image's own pixel size and encodes the result as PNG.
    pub fn export(&self, document: &MemeDocument) -> Result<ExportArtifact> {
        let _timer = logger::timer("meme export");
        let mut canvas = decode_source(&document.image)?;
        let surface = Surface::new(canvas.width(), canvas.height());
        render(&layout(document, surface), &mut canvas, &self.font);

        let mut encoded = Cursor::new(Vec::new());
        canvas
            .write_to(&mut encoded, ImageFormat::Png)
            .map_err(|e| MemeError::InternalError(format!("PNG encoding failed: {}", e)))?;

        let artifact = ExportArtifact::new(encoded.into_inner(), surface.width, surface.height);
        log::info!(
            "Exported {} ({}x{}, {} bytes)",
            artifact.filename,
            artifact.width,
            artifact.height,
            artifact.bytes.len()
        );
        Ok(artifact)
    }

    /// Exports and writes the PNG into the configured export directory.
    pub fn export_to_disk(&self, document: &MemeDocument) -> Result<PathBuf> {
        let artifact = self.export(document)?;
        artifact.write_to_dir(&self.export_dir)
    }
}

/// Coverage values in `0.0..=1.0` over a window of the canvas.
#[derive(Debug, Clone)]
struct Mask {
    x0: i32,
    y0: i32,
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Mask {
    fn new(x0: i32, y0: i32, width: usize, height: usize) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    #[cfg(test)]
    fn get(&self, x: i32, y: i32) -> f32 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0.0;
        }
        self.data[y as usize * self.width + x as usize]
    }

    fn accumulate(&mut self, x: i32, y: i32, value: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let cell = &mut self.data[y as usize * self.width + x as usize];
        *cell = (*cell + value).min(1.0);
    }

    /// Grows the covered area by `radius` pixels with a one-pixel soft edge.
    ///
    /// Linear in the mask area regardless of `radius`.
    fn dilate(&self, radius: f32) -> Mask {
        if radius <= 0.0 || self.data.is_empty() {
            return self.clone();
        }
        let distances = self.distance_to_glyph();
        let mut out = Mask::new(self.x0, self.y0, self.width, self.height);
        for ((value, &coverage), &distance) in out.data.iter_mut().zip(&self.data).zip(&distances) {
            *value = coverage.max((radius + 0.5 - distance).clamp(0.0, 1.0));
        }
        out
    }

    /// Euclidean distance from each cell to the nearest cell at or above
    /// `EDGE_COVERAGE`, via two passes of the 1-D squared distance transform
    /// (columns, then rows).
    fn distance_to_glyph(&self) -> Vec<f32> {
        let (w, h) = (self.width, self.height);
        // Larger than any squared distance inside the mask, small enough to stay exact.
        let far = ((w + h) * (w + h)) as f64 + 1.0;
        let mut grid: Vec<f64> = self
            .data
            .iter()
            .map(|&c| if c >= EDGE_COVERAGE { 0.0 } else { far })
            .collect();

        let mut scratch = Envelope::new(w.max(h));
        let mut line = vec![0.0; w.max(h)];
        for x in 0..w {
            for y in 0..h {
                line[y] = grid[y * w + x];
            }
            scratch.transform(&mut line[..h]);
            for y in 0..h {
                grid[y * w + x] = line[y];
            }
        }
        for row in grid.chunks_mut(w) {
            scratch.transform(row);
        }

        grid.into_iter()
            .map(|sq| if sq >= far { f32::INFINITY } else { sq.sqrt() as f32 })
            .collect()
    }
}

/// Coverage at which a pixel counts as inside the glyph outline.
const EDGE_COVERAGE: f32 = 0.5;

/// Lower-envelope buffers for the 1-D squared distance transform.
struct Envelope {
    vertices: Vec<usize>,
    bounds: Vec<f64>,
    input: Vec<f64>,
}

impl Envelope {
    fn new(len: usize) -> Self {
        Self {
            vertices: vec![0; len],
            bounds: vec![0.0; len + 1],
            input: vec![0.0; len],
        }
    }

    /// Replaces each `f[q]` with `min_p (q - p)² + f[p]`.
    fn transform(&mut self, f: &mut [f64]) {
        let n = f.len();
        if n == 0 {
            return;
        }
        self.input[..n].copy_from_slice(f);
        let input = &self.input;
        let (v, z) = (&mut self.vertices, &mut self.bounds);
        let meet = |q: usize, p: usize| {
            ((input[q] + (q * q) as f64) - (input[p] + (p * p) as f64)) / (2.0 * (q - p) as f64)
        };

        let mut k = 0;
        v[0] = 0;
        z[0] = f64::NEG_INFINITY;
        z[1] = f64::INFINITY;
        for q in 1..n {
            let mut s = meet(q, v[k]);
            while s <= z[k] {
                k -= 1;
                s = meet(q, v[k]);
            }
            k += 1;
            v[k] = q;
            z[k] = s;
            z[k + 1] = f64::INFINITY;
        }

        k = 0;
        for (q, out) in f.iter_mut().enumerate() {
            while z[k + 1] < q as f64 {
                k += 1;
            }
            let dq = q as f64 - v[k] as f64;
            *out = dq * dq + input[v[k]];
        }
    }
}

fn draw_band(band: &BandPlan, canvas: &mut RgbaImage, font: &MemeFont) {
    let metrics = font.measure(&band.text, band.font_px);
    let left = match band.alignment {
        Alignment::Left => band.anchor_x,
        Alignment::Center => band.anchor_x - metrics.width / 2.0,
        Alignment::Right => band.anchor_x - metrics.width,
    };
    let baseline = match band.vertical {
        VerticalAnchor::Top => band.anchor_y + metrics.ascent,
        VerticalAnchor::Bottom => band.anchor_y + metrics.descent,
    };

    let glyphs = font.glyphs(&band.text, band.font_px, left, baseline);
    let Some(fill) = glyph_mask(&glyphs, band.stroke_width) else {
        return;
    };
    let outline = fill.dilate(band.stroke_width / 2.0);

    blend_mask(canvas, &outline, band.outline);
    blend_mask(canvas, &fill, band.fill);
}

fn glyph_mask(glyphs: &[rusttype::PositionedGlyph<'static>], stroke_width: f32) -> Option<Mask> {
    let bounds = glyphs
        .iter()
        .filter_map(|glyph| glyph.pixel_bounding_box())
        .reduce(|a, b| rusttype::Rect {
            min: rusttype::point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
            max: rusttype::point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
        })?;

    let pad = (stroke_width / 2.0).ceil() as i32 + 1;
    let x0 = bounds.min.x - pad;
    let y0 = bounds.min.y - pad;
    let width = (bounds.max.x - bounds.min.x + 2 * pad) as usize;
    let height = (bounds.max.y - bounds.min.y + 2 * pad) as usize;

    let mut mask = Mask::new(x0, y0, width, height);
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, coverage| {
                mask.accumulate(
                    bb.min.x + gx as i32 - x0,
                    bb.min.y + gy as i32 - y0,
                    coverage,
                );
            });
        }
    }
    Some(mask)
}

fn blend_mask(canvas: &mut RgbaImage, mask: &Mask, color: HexColor) {
    let [r, g, b, _] = color.rgba();
    let (canvas_w, canvas_h) = (canvas.width() as i32, canvas.height() as i32);

    for my in 0..mask.height {
        let y = mask.y0 + my as i32;
        if y < 0 || y >= canvas_h {
            continue;
        }
        for mx in 0..mask.width {
            let x = mask.x0 + mx as i32;
            if x < 0 || x >= canvas_w {
                continue;
            }
            let alpha = mask.data[my * mask.width + mx];
            if alpha <= 0.0 {
                continue;
            }
            let pixel = canvas.get_pixel_mut(x as u32, y as u32);
            *pixel = source_over(*pixel, [r, g, b], alpha);
        }
    }
}

fn source_over(dst: Rgba<u8>, src: [u8; 3], alpha: f32) -> Rgba<u8> {
    let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
    let out_alpha = alpha * 255.0 + dst[3] as f32 * (1.0 - alpha);
    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        out_alpha.round().min(255.0) as u8,
    ])
}
