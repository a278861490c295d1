//! Access to glyph outlines and font metrics.
//!
//! The generators only see fonts through the [`OutlineSource`] trait. The
//! production implementation, [`FontSource`], reads OpenType data with
//! skrifa; tests provide outlines directly.

use kurbo::{BezPath, Point, Shape};
use skrifa::{
    charmap::Charmap,
    metrics::{BoundingBox, GlyphMetrics},
    outline::{DrawSettings, OutlinePen},
    prelude::{LocationRef, Size},
    string::StringId,
    FontRef, GlyphId, MetadataProvider, OutlineGlyphCollection,
};

use crate::Error;

/// A single drawing command of a glyph outline, in font units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CurveTo(Point, Point, Point),
    Close,
}

/// One connected piece of an outline, starting with a [`PathCommand::MoveTo`].
pub type Contour = Vec<PathCommand>;

/// The outline of a glyph, in font units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphOutline {
    pub bounds: BoundingBox,
    pub advance: f32,
    pub contours: Vec<Contour>,
}

impl GlyphOutline {
    /// Returns true if the bounding box encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.bounds.x_max <= self.bounds.x_min || self.bounds.y_max <= self.bounds.y_min
    }

    /// Computes the exact bounds of all contours, including curve extrema.
    ///
    /// Used for fonts that do not store per-glyph bounds, such as CFF.
    pub fn tight_bounds(contours: &[Contour]) -> BoundingBox {
        let mut path = BezPath::new();
        for contour in contours.iter().filter(|contour| !contour.is_empty()) {
            if !matches!(contour.first(), Some(PathCommand::MoveTo(_))) {
                path.move_to(Point::ZERO);
            }
            for cmd in contour {
                match *cmd {
                    PathCommand::MoveTo(p) => path.move_to(p),
                    PathCommand::LineTo(p) => path.line_to(p),
                    PathCommand::QuadTo(c0, p) => path.quad_to(c0, p),
                    PathCommand::CurveTo(c0, c1, p) => path.curve_to(c0, c1, p),
                    PathCommand::Close => path.close_path(),
                }
            }
        }
        if path.elements().is_empty() {
            return BoundingBox::default();
        }
        let rect = path.bounding_box();
        BoundingBox {
            x_min: rect.x0 as f32,
            y_min: rect.y0 as f32,
            x_max: rect.x1 as f32,
            y_max: rect.y1 as f32,
        }
    }
}

/// Font-wide metrics, in font units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascent: f32,
    /// Distance below the baseline, usually negative.
    pub descent: f32,
    pub line_gap: f32,
}

impl FontMetrics {
    /// Ascent minus descent, the height of a line without gap.
    pub fn line_height(&self) -> f64 {
        self.ascent as f64 - self.descent as f64
    }
}

/// Provides the outlines and metrics needed to generate a font.
pub trait OutlineSource {
    fn metrics(&self) -> FontMetrics;

    /// The family name, if the font has one.
    fn family_name(&self) -> Option<String>;

    /// Returns the outline for a character.
    ///
    /// Returns `None` if the character maps to the undefined glyph.
    fn outline(&self, ch: u32) -> Option<GlyphOutline>;
}

/// An [`OutlineSource`] backed by an OpenType or TrueType font.
pub struct FontSource<'a> {
    font: FontRef<'a>,
    charmap: Charmap<'a>,
    outlines: OutlineGlyphCollection<'a>,
    glyph_metrics: GlyphMetrics<'a>,
    metrics: FontMetrics,
}

impl<'a> FontSource<'a> {
    /// Load the font at `index` from font or collection data.
    pub fn new(data: &'a [u8], index: u32) -> Result<Self, Error> {
        let font = FontRef::from_index(data, index)?;
        let raw = font.metrics(Size::unscaled(), LocationRef::default());
        let metrics = FontMetrics {
            units_per_em: raw.units_per_em,
            ascent: raw.ascent,
            descent: raw.descent,
            line_gap: raw.leading,
        };
        log::debug!(
            "loaded font: upem {} ascent {} descent {} glyphs {}",
            metrics.units_per_em,
            metrics.ascent,
            metrics.descent,
            raw.glyph_count
        );
        Ok(Self {
            charmap: font.charmap(),
            outlines: font.outline_glyphs(),
            glyph_metrics: font.glyph_metrics(Size::unscaled(), LocationRef::default()),
            font,
            metrics,
        })
    }
}

impl OutlineSource for FontSource<'_> {
    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn family_name(&self) -> Option<String> {
        self.font
            .localized_strings(StringId::FAMILY_NAME)
            .english_or_first()
            .map(|name| name.to_string())
    }

    fn outline(&self, ch: u32) -> Option<GlyphOutline> {
        let glyph_id = self.charmap.map(ch)?;
        if glyph_id == GlyphId::NOTDEF {
            return None;
        }
        let glyph = self.outlines.get(glyph_id)?;
        let mut pen = ContourPen::default();
        let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
        if let Err(e) = glyph.draw(settings, &mut pen) {
            log::warn!("failed to draw glyph {} for U+{ch:04X}: {e}", glyph_id.to_u32());
            return None;
        }
        let contours = pen.into_contours();
        let bounds = self
            .glyph_metrics
            .bounds(glyph_id)
            .unwrap_or_else(|| GlyphOutline::tight_bounds(&contours));
        let advance = self.glyph_metrics.advance_width(glyph_id).unwrap_or_default();
        Some(GlyphOutline {
            bounds,
            advance,
            contours,
        })
    }
}

/// Pen that collects drawing commands into contours.
#[derive(Default)]
pub struct ContourPen {
    contours: Vec<Contour>,
}

impl ContourPen {
    pub fn into_contours(self) -> Vec<Contour> {
        self.contours
    }

    fn push(&mut self, cmd: PathCommand) {
        match self.contours.last_mut() {
            Some(contour) => contour.push(cmd),
            // a contour that doesn't begin with a move starts at the origin
            None => self
                .contours
                .push(vec![PathCommand::MoveTo(Point::ZERO), cmd]),
        }
    }
}

fn point(x: f32, y: f32) -> Point {
    Point::new(x as f64, y as f64)
}

impl OutlinePen for ContourPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.contours.push(vec![PathCommand::MoveTo(point(x, y))]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(PathCommand::LineTo(point(x, y)));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.push(PathCommand::QuadTo(point(cx0, cy0), point(x, y)));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.push(PathCommand::CurveTo(
            point(cx0, cy0),
            point(cx1, cy1),
            point(x, y),
        ));
    }

    fn close(&mut self) {
        if let Some(contour) = self.contours.last_mut() {
            contour.push(PathCommand::Close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pen_splits_contours_on_move() {
        let mut pen = ContourPen::default();
        pen.move_to(0.0, 0.0);
        pen.line_to(10.0, 0.0);
        pen.quad_to(10.0, 10.0, 0.0, 10.0);
        pen.close();
        pen.move_to(2.0, 2.0);
        pen.curve_to(3.0, 3.0, 4.0, 4.0, 5.0, 2.0);
        pen.close();
        let contours = pen.into_contours();
        assert_eq!(contours.len(), 2);
        assert_eq!(
            contours[0],
            vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::LineTo(Point::new(10.0, 0.0)),
                PathCommand::QuadTo(Point::new(10.0, 10.0), Point::new(0.0, 10.0)),
                PathCommand::Close,
            ]
        );
        assert_eq!(contours[1].len(), 3);
    }

    #[test]
    fn pen_line_without_move_starts_at_origin() {
        let mut pen = ContourPen::default();
        pen.line_to(4.0, 4.0);
        let contours = pen.into_contours();
        assert_eq!(
            contours,
            vec![vec![
                PathCommand::MoveTo(Point::ZERO),
                PathCommand::LineTo(Point::new(4.0, 4.0))
            ]]
        );
    }

    #[test]
    fn tight_bounds_follow_curve_extrema() {
        // the control point sits at y = 120 but the curve peaks at 60
        let contours = vec![vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::QuadTo(Point::new(50.0, 120.0), Point::new(100.0, 0.0)),
            PathCommand::Close,
        ]];
        let bounds = GlyphOutline::tight_bounds(&contours);
        assert_eq!(
            bounds,
            BoundingBox {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 100.0,
                y_max: 60.0
            }
        );
    }

    #[test]
    fn tight_bounds_of_cubic_and_lines() {
        let contours = vec![
            vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::CurveTo(
                    Point::new(0.0, -40.0),
                    Point::new(80.0, -40.0),
                    Point::new(80.0, 0.0),
                ),
                PathCommand::Close,
            ],
            vec![
                PathCommand::MoveTo(Point::new(10.0, 10.0)),
                PathCommand::LineTo(Point::new(20.0, 50.0)),
                PathCommand::Close,
            ],
        ];
        let bounds = GlyphOutline::tight_bounds(&contours);
        assert_eq!(
            bounds,
            BoundingBox {
                x_min: 0.0,
                y_min: -30.0,
                x_max: 80.0,
                y_max: 50.0
            }
        );
        assert_eq!(GlyphOutline::tight_bounds(&[]), BoundingBox::default());
    }

    #[test]
    fn empty_outline_is_degenerate() {
        assert!(GlyphOutline::default().is_degenerate());
    }
}
