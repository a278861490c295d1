//! Scanline rasterization of glyph outlines.
//!
//! Outlines are scaled to the target size, rendered at 4x supersampling with
//! the even-odd rule and box filtered back down to 8-bit coverage. Curves are
//! always split into a fixed number of line segments so that output bytes do
//! not depend on curve length.

use kurbo::{Affine, CubicBez, ParamCurve, Point, QuadBez};
use skrifa::metrics::BoundingBox;

use crate::{
    outline::{Contour, GlyphOutline, PathCommand},
    GrayscaleGrid,
};

/// Supersampling factor along each axis.
pub const SUPERSAMPLE: usize = 4;

/// Number of line segments produced for each quadratic or cubic curve.
pub const CURVE_STEPS: usize = 10;

/// Reasons a character produced no glyph record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderFailure {
    /// The character maps to the undefined glyph.
    MissingGlyph,
    /// The glyph bounding box encloses no area.
    EmptyBounds,
}

impl std::fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderFailure::MissingGlyph => f.write_str("no glyph in font"),
            RenderFailure::EmptyBounds => f.write_str("empty bounding box"),
        }
    }
}

/// The integer pixel box covering a scaled glyph.
///
/// `y` grows upwards from the baseline, as in font units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelBounds {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl PixelBounds {
    /// Scale font unit bounds and round outwards to whole pixels.
    ///
    /// Scaling happens in `f64` so that edges landing exactly on a pixel
    /// boundary do not spill into the next pixel.
    pub fn from_font_units(bounds: &BoundingBox, scale: f64) -> Self {
        let scaled = |v: f32| v as f64 * scale;
        Self {
            x_min: scaled(bounds.x_min).floor() as i32,
            y_min: scaled(bounds.y_min).floor() as i32,
            x_max: scaled(bounds.x_max).ceil() as i32,
            y_max: scaled(bounds.y_max).ceil() as i32,
        }
    }

    pub fn width(&self) -> usize {
        (self.x_max - self.x_min).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.y_max - self.y_min).max(0) as usize
    }

    /// Distance from the origin to the left edge, in pixels.
    pub fn left_bearing(&self) -> i32 {
        self.x_min
    }

    /// Distance from the baseline up to the top edge, in pixels.
    pub fn top_bearing(&self) -> i32 {
        self.y_max
    }
}

/// Flatten a contour into a closed polygon.
///
/// Every curve is replaced by exactly [`CURVE_STEPS`] line segments. Points
/// are mapped through `transform` before flattening.
pub fn flatten_contour(contour: &Contour, transform: Affine) -> Vec<Point> {
    let mut points = Vec::new();
    let mut current = Point::ZERO;
    for cmd in contour {
        match *cmd {
            PathCommand::MoveTo(p) => {
                current = transform * p;
                points.push(current);
            }
            PathCommand::LineTo(p) => {
                current = transform * p;
                points.push(current);
            }
            PathCommand::QuadTo(c0, p) => {
                let quad = QuadBez::new(current, transform * c0, transform * p);
                push_curve(&mut points, &quad);
                current = quad.p2;
            }
            PathCommand::CurveTo(c0, c1, p) => {
                let cubic = CubicBez::new(current, transform * c0, transform * c1, transform * p);
                push_curve(&mut points, &cubic);
                current = cubic.p3;
            }
            // polygons are implicitly closed
            PathCommand::Close => (),
        }
    }
    points
}

fn push_curve(points: &mut Vec<Point>, curve: &impl ParamCurve) {
    for step in 1..=CURVE_STEPS {
        points.push(curve.eval(step as f64 / CURVE_STEPS as f64));
    }
}

/// Fill polygons with the even-odd rule, sampling at pixel centers.
///
/// Returns a `width * height` mask with row 0 at `y = 0`.
pub fn fill_even_odd(polygons: &[Vec<Point>], width: usize, height: usize) -> Vec<bool> {
    let mut mask = vec![false; width * height];
    let mut crossings = Vec::new();
    for row in 0..height {
        let y = row as f64 + 0.5;
        crossings.clear();
        for polygon in polygons.iter().filter(|poly| poly.len() > 1) {
            let edges = polygon.iter().zip(polygon.iter().cycle().skip(1));
            for (p, q) in edges {
                if (p.y <= y) != (q.y <= y) {
                    crossings.push(p.x + (y - p.y) * (q.x - p.x) / (q.y - p.y));
                }
            }
        }
        crossings.sort_by(f64::total_cmp);
        let line = &mut mask[row * width..(row + 1) * width];
        for span in crossings.chunks_exact(2) {
            // a pixel is inside when its center lies in [start, end)
            let start = (span[0] - 0.5).ceil().clamp(0.0, width as f64) as usize;
            let end = (span[1] - 0.5).ceil().clamp(0.0, width as f64) as usize;
            if start < end {
                line[start..end].fill(true);
            }
        }
    }
    mask
}

/// Average each `SUPERSAMPLE x SUPERSAMPLE` block of a mask into one pixel.
pub fn downsample(mask: &[bool], width: usize, height: usize) -> GrayscaleGrid {
    let ss_width = width * SUPERSAMPLE;
    let samples = (SUPERSAMPLE * SUPERSAMPLE) as u32;
    let mut grid = GrayscaleGrid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut count = 0u32;
            for sy in y * SUPERSAMPLE..(y + 1) * SUPERSAMPLE {
                let row = &mask[sy * ss_width..(sy + 1) * ss_width];
                count += row[x * SUPERSAMPLE..(x + 1) * SUPERSAMPLE]
                    .iter()
                    .filter(|covered| **covered)
                    .count() as u32;
            }
            grid.set(x, y, ((count * 255 + samples / 2) / samples) as u8);
        }
    }
    grid
}

/// Rasterize an outline at `size` pixels per em.
///
/// The resulting grid covers [`PixelBounds`] of the glyph and is stored
/// bottom-up: row 0 holds the lowest pixel row.
pub fn rasterize(
    outline: &GlyphOutline,
    size: f64,
    units_per_em: u16,
) -> Result<GrayscaleGrid, RenderFailure> {
    if outline.is_degenerate() || units_per_em == 0 {
        return Err(RenderFailure::EmptyBounds);
    }
    let scale = size / units_per_em as f64;
    let bounds = PixelBounds::from_font_units(&outline.bounds, scale);
    let (width, height) = (bounds.width(), bounds.height());
    if width == 0 || height == 0 {
        return Err(RenderFailure::EmptyBounds);
    }
    let ss = SUPERSAMPLE as f64;
    let transform = Affine::scale(ss)
        * Affine::translate((-bounds.x_min as f64, -bounds.y_min as f64))
        * Affine::scale(scale);
    let polygons = outline
        .contours
        .iter()
        .map(|contour| flatten_contour(contour, transform))
        .collect::<Vec<_>>();
    let mask = fill_even_odd(&polygons, width * SUPERSAMPLE, height * SUPERSAMPLE);
    Ok(downsample(&mask, width, height))
}
