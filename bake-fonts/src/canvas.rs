//! Placing styled glyphs on a fixed size canvas.
//!
//! Every glyph of a bitmap font is stored on a canvas of the same size. The
//! canvas is `back_size` rows tall; glyphs are positioned against a shared
//! baseline derived from the font's ascender and descender.

use crate::{outline::FontMetrics, style::Rotation, GrayscaleGrid};

/// The fixed glyph canvas of a bitmap font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    /// Rows from the top of the canvas down to the baseline.
    pub baseline: i32,
}

/// Where a glyph landed on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    /// Leftmost column of the glyph.
    pub draw_x: usize,
    /// One past the bottom row of the glyph.
    pub pos_y: usize,
    pub glyph_width: usize,
    pub glyph_height: usize,
}

impl Placement {
    /// Top row of the glyph.
    pub fn top(&self) -> usize {
        self.pos_y.saturating_sub(self.glyph_height)
    }

    /// Per-glyph geometry stored in front of the pixel data.
    pub fn geometry(&self) -> GlyphGeometry {
        GlyphGeometry {
            x_offset: clamp_u8(self.draw_x),
            y_offset: clamp_u8(self.top()),
            width: clamp_u8(self.glyph_width),
            height: clamp_u8(self.glyph_height),
        }
    }

    /// The region of the canvas that can contain glyph pixels, as
    /// `(width, height)` measured from the top left corner.
    pub fn valid_region(&self, canvas: &Canvas) -> (usize, usize) {
        (
            (self.draw_x + self.glyph_width).min(canvas.width),
            self.pos_y.min(canvas.height),
        )
    }
}

/// The four geometry bytes of a bitmap glyph record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphGeometry {
    pub x_offset: u8,
    pub y_offset: u8,
    pub width: u8,
    pub height: u8,
}

impl GlyphGeometry {
    pub fn to_bytes(self) -> [u8; 4] {
        [self.x_offset, self.y_offset, self.width, self.height]
    }
}

fn clamp_u8(value: usize) -> u8 {
    value.min(u8::MAX as usize) as u8
}

impl Canvas {
    /// Compute the canvas for a font.
    ///
    /// Italic canvases are half again as wide. The dimension that becomes a
    /// packed row after rotation is rounded up to a multiple of eight.
    pub fn new(back_size: u32, italic: bool, rotation: Rotation, metrics: &FontMetrics) -> Self {
        let back_size = back_size as usize;
        let mut height = back_size;
        let mut width = back_size * (2 + italic as usize) / 2;
        if rotation.is_transposed() {
            height = height.next_multiple_of(8);
        } else {
            width = width.next_multiple_of(8);
        }
        let baseline =
            (metrics.ascent.abs() as f64 * back_size as f64 / metrics.line_height()).round();
        Self {
            width,
            height,
            baseline: baseline as i32,
        }
    }

    /// Position a `width` x `height` glyph whose box starts `left` pixels
    /// right of the origin and ends `top` pixels above the baseline.
    pub fn place(&self, width: usize, height: usize, left: i32, top: i32) -> Placement {
        let max_x = self.width.saturating_sub(width) as i32;
        let draw_x = left.clamp(0, max_x) as usize;
        let top_gap = self.baseline - top;
        let pos_y = if top_gap < 0 {
            height.min(self.height)
        } else {
            (top_gap as usize + height)
                .min(self.height)
                .max(height.min(self.height))
        };
        Placement {
            draw_x,
            pos_y,
            glyph_width: width,
            glyph_height: height,
        }
    }

    /// Copy a bottom-up glyph grid onto an empty top-down canvas.
    ///
    /// Pixels falling outside the canvas are dropped.
    pub fn composite(&self, glyph: &GrayscaleGrid, placement: &Placement) -> GrayscaleGrid {
        let mut out = GrayscaleGrid::new(self.width, self.height);
        for (r, row) in glyph.rows().enumerate() {
            let Some(y) = placement.pos_y.checked_sub(r + 1) else {
                break;
            };
            for (c, pixel) in row.iter().enumerate() {
                let x = placement.draw_x + c;
                if x >= self.width {
                    break;
                }
                out.set(x, y, *pixel);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const METRICS: FontMetrics = FontMetrics {
        units_per_em: 1000,
        ascent: 800.0,
        descent: -200.0,
        line_gap: 0.0,
    };

    #[test]
    fn canvas_size() {
        let canvas = Canvas::new(20, false, Rotation::Deg0, &METRICS);
        assert_eq!((canvas.width, canvas.height), (24, 20));
        assert_eq!(canvas.baseline, 16);

        let canvas = Canvas::new(20, true, Rotation::Deg0, &METRICS);
        assert_eq!((canvas.width, canvas.height), (32, 20));

        let canvas = Canvas::new(20, true, Rotation::Deg90, &METRICS);
        assert_eq!((canvas.width, canvas.height), (30, 24));

        let canvas = Canvas::new(16, false, Rotation::Deg180, &METRICS);
        assert_eq!((canvas.width, canvas.height), (16, 16));
    }

    #[test]
    fn baseline_rounds_to_nearest() {
        // 800 * 15 / 1000 = 12
        // 750 * 15 / 1000 = 11.25
        let metrics = FontMetrics {
            ascent: 750.0,
            descent: -250.0,
            ..METRICS
        };
        assert_eq!(Canvas::new(15, false, Rotation::Deg0, &METRICS).baseline, 12);
        assert_eq!(Canvas::new(15, false, Rotation::Deg0, &metrics).baseline, 11);
        assert_eq!(Canvas::new(18, false, Rotation::Deg0, &metrics).baseline, 14);
    }

    #[test]
    fn placement_follows_baseline() {
        let canvas = Canvas::new(20, false, Rotation::Deg0, &METRICS);
        // glyph 5 px tall sitting on the baseline
        let placement = canvas.place(4, 5, 1, 5);
        assert_eq!(placement.draw_x, 1);
        assert_eq!(placement.pos_y, 16);
        assert_eq!(placement.top(), 11);
        assert_eq!(placement.geometry().to_bytes(), [1, 11, 4, 5]);
    }

    #[test]
    fn placement_is_clamped() {
        let canvas = Canvas::new(20, false, Rotation::Deg0, &METRICS);
        // negative bearing sticks to the left edge
        assert_eq!(canvas.place(4, 5, -2, 5).draw_x, 0);
        // wide bearing sticks to the right edge
        assert_eq!(canvas.place(4, 5, 30, 5).draw_x, 20);
        // taller than the baseline: starts at the top
        assert_eq!(canvas.place(4, 5, 0, 18).pos_y, 5);
        // descends below the canvas: sits on the bottom
        assert_eq!(canvas.place(4, 5, 0, -10).pos_y, 20);
        // larger than the canvas
        let huge = canvas.place(40, 40, 3, 10);
        assert_eq!((huge.draw_x, huge.pos_y), (0, 20));
        assert_eq!(huge.geometry().to_bytes(), [0, 0, 40, 40]);
    }

    #[test]
    fn geometry_clamps_to_byte() {
        let placement = Placement {
            draw_x: 300,
            pos_y: 600,
            glyph_width: 256,
            glyph_height: 2,
        };
        assert_eq!(placement.geometry().to_bytes(), [255, 255, 255, 2]);
    }

    #[test]
    fn composite_flips_rows() {
        let canvas = Canvas {
            width: 8,
            height: 4,
            baseline: 3,
        };
        // bottom-up: row 0 is the bottom
        let glyph = GrayscaleGrid::from_pixels(2, 2, vec![1, 2, 3, 4]);
        let placement = canvas.place(2, 2, 1, 2);
        assert_eq!(placement.pos_y, 3);
        let out = canvas.composite(&glyph, &placement);
        assert_eq!(out.row(0), &[0; 8]);
        assert_eq!(out.row(1), &[0, 3, 4, 0, 0, 0, 0, 0]);
        assert_eq!(out.row(2), &[0, 1, 2, 0, 0, 0, 0, 0]);
        assert_eq!(out.row(3), &[0; 8]);
        assert_eq!(placement.valid_region(&canvas), (3, 3));
    }

    #[test]
    fn composite_clips_oversized_glyph() {
        let canvas = Canvas {
            width: 8,
            height: 2,
            baseline: 1,
        };
        let glyph = GrayscaleGrid::from_pixels(10, 3, vec![9; 30]);
        let placement = canvas.place(10, 3, 0, 3);
        let out = canvas.composite(&glyph, &placement);
        assert_eq!(out.intensity(), 9 * 16);
    }
}
