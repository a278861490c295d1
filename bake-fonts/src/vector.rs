//! Generation of vector fonts.
//!
//! Vector records keep outlines in font units. Every contour is flattened
//! into a closed polyline (a winding) with the same fixed curve subdivision
//! the rasterizer uses.

use kurbo::Affine;

use crate::{
    generate::GlyphAccumulator,
    header::{HeaderFlags, IndexMethod, VectorHeader},
    index::{FileAssembler, IndexLayout},
    outline::{FontMetrics, GlyphOutline, OutlineSource},
    raster::{flatten_contour, RenderFailure},
    write::{ByteWriter, FontWrite},
    Error,
};

/// Options of a vector font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorSettings {
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub rvd: bool,
    pub index_method: IndexMethod,
}

/// A flattened glyph outline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VectorGlyph {
    pub unicode: u32,
    pub advance: u16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub windings: Vec<Vec<(i16, i16)>>,
}

impl VectorGlyph {
    pub fn from_outline(unicode: u32, outline: &GlyphOutline) -> Self {
        let windings = outline
            .contours
            .iter()
            .map(|contour| {
                flatten_contour(contour, Affine::IDENTITY)
                    .into_iter()
                    .map(|p| (to_i16(p.x as f32), to_i16(p.y as f32)))
                    .collect::<Vec<_>>()
            })
            .filter(|winding| !winding.is_empty())
            .collect::<Vec<_>>();
        let bounds = outline.bounds;
        Self {
            unicode,
            advance: outline.advance.round().clamp(0.0, u16::MAX as f32) as u16,
            x_min: to_i16(bounds.x_min),
            y_min: to_i16(bounds.y_min),
            x_max: to_i16(bounds.x_max),
            y_max: to_i16(bounds.y_max),
            windings,
        }
    }
}

fn to_i16(value: f32) -> i16 {
    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

impl FontWrite for VectorGlyph {
    fn write_into(&self, writer: &mut ByteWriter) {
        // counts are stored in a byte and a u16; anything past that is dropped
        let windings = &self.windings[..self.windings.len().min(u8::MAX as usize)];
        writer.write(&self.advance);
        writer.write(&self.x_min);
        writer.write(&self.y_min);
        writer.write(&self.x_max);
        writer.write(&self.y_max);
        writer.write(&(windings.len() as u8));
        for winding in windings {
            writer.write(&(winding.len().min(u16::MAX as usize) as u16));
        }
        for winding in windings {
            for (x, y) in winding.iter().take(u16::MAX as usize) {
                writer.write(x);
                writer.write(y);
            }
        }
    }
}

/// Flattens characters into vector glyph records.
#[derive(Clone, Debug)]
pub struct VectorGenerator {
    settings: VectorSettings,
    metrics: FontMetrics,
}

impl VectorGenerator {
    pub fn new(settings: VectorSettings, metrics: &FontMetrics) -> Self {
        Self {
            settings,
            metrics: *metrics,
        }
    }

    pub fn settings(&self) -> &VectorSettings {
        &self.settings
    }

    /// Only characters without a glyph fail; empty outlines such as spaces
    /// still get a record carrying their advance.
    pub fn process_glyph(
        &self,
        unicode: u32,
        outline: Option<&GlyphOutline>,
    ) -> Result<VectorGlyph, RenderFailure> {
        let outline = outline.ok_or(RenderFailure::MissingGlyph)?;
        let glyph = VectorGlyph::from_outline(unicode, outline);
        if glyph.windings.len() > u8::MAX as usize {
            log::warn!(
                "U+{unicode:04X} has {} contours, only {} are kept",
                glyph.windings.len(),
                u8::MAX
            );
        }
        log::debug!(
            "U+{unicode:04X}: {} windings, {} points",
            glyph.windings.len(),
            glyph.windings.iter().map(Vec::len).sum::<usize>()
        );
        Ok(glyph)
    }

    pub fn render(
        &self,
        source: &impl OutlineSource,
        chars: &[u32],
    ) -> GlyphAccumulator<VectorGlyph> {
        chars.iter().fold(GlyphAccumulator::default(), |acc, &ch| {
            let outline = source.outline(ch);
            acc.record(ch, self.process_glyph(ch, outline.as_ref()))
        })
    }

    pub fn assemble(
        &self,
        glyphs: &GlyphAccumulator<VectorGlyph>,
        char_count: usize,
        font_name: &str,
    ) -> Result<Vec<u8>, Error> {
        let flags = HeaderFlags {
            bold: self.settings.bold,
            italic: self.settings.italic,
            rvd: self.settings.rvd,
            index_method: self.settings.index_method,
            crop: false,
        };
        let header = VectorHeader::new(
            crate::bitmap::size_byte(self.settings.size)?,
            flags,
            char_count,
            to_i16(self.metrics.ascent),
            to_i16(self.metrics.descent),
            to_i16(self.metrics.line_gap),
            font_name,
        )?;
        let layout = IndexLayout::vector(flags.index_method, char_count);
        let mut assembler = FileAssembler::new(&header, layout);
        for (unicode, glyph) in glyphs.glyphs() {
            assembler.push_record(*unicode, glyph);
        }
        Ok(assembler.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{outline::PathCommand, raster::CURVE_STEPS, write::dump};
    use kurbo::Point;
    use pretty_assertions::assert_eq;

    const METRICS: FontMetrics = FontMetrics {
        units_per_em: 1000,
        ascent: 800.0,
        descent: -200.0,
        line_gap: 90.0,
    };

    fn triangle() -> GlyphOutline {
        let contours = vec![vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(500.0, 0.0)),
            PathCommand::LineTo(Point::new(250.0, 700.0)),
            PathCommand::Close,
        ]];
        GlyphOutline {
            bounds: GlyphOutline::tight_bounds(&contours),
            advance: 600.0,
            contours,
        }
    }

    fn settings(index_method: IndexMethod) -> VectorSettings {
        VectorSettings {
            size: 32,
            bold: false,
            italic: false,
            rvd: false,
            index_method,
        }
    }

    #[test]
    fn record_layout() {
        let glyph = VectorGlyph::from_outline(0x41, &triangle());
        #[rustfmt::skip]
        let expected = vec![
            0x58, 0x02,             // advance 600
            0, 0, 0, 0,             // x_min, y_min
            0xF4, 0x01, 0xBC, 0x02, // x_max 500, y_max 700
            1,                      // winding count
            3, 0,                   // winding length
            0, 0, 0, 0,
            0xF4, 0x01, 0, 0,
            0xFA, 0x00, 0xBC, 0x02,
        ];
        assert_eq!(dump(&glyph), expected);
    }

    #[test]
    fn curves_are_flattened() {
        let contours = vec![vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::QuadTo(Point::new(100.0, 200.0), Point::new(200.0, 0.0)),
            PathCommand::Close,
        ]];
        let outline = GlyphOutline {
            bounds: GlyphOutline::tight_bounds(&contours),
            advance: 200.0,
            contours,
        };
        let glyph = VectorGlyph::from_outline(0x6E, &outline);
        assert_eq!(glyph.windings.len(), 1);
        assert_eq!(glyph.windings[0].len(), 1 + CURVE_STEPS);
        // midpoint of the curve
        assert_eq!(glyph.windings[0][5], (100, 100));
        assert_eq!(glyph.windings[0][10], (200, 0));
    }

    #[test]
    fn only_missing_glyphs_fail() {
        let generator = VectorGenerator::new(settings(IndexMethod::Address), &METRICS);
        assert_eq!(
            generator.process_glyph(0x20, None),
            Err(RenderFailure::MissingGlyph)
        );
        let space = GlyphOutline {
            advance: 250.0,
            ..Default::default()
        };
        let glyph = generator.process_glyph(0x20, Some(&space)).unwrap();
        assert_eq!(glyph.advance, 250);
        assert!(glyph.windings.is_empty());
    }

    #[test]
    fn address_index_holds_offsets() {
        let generator = VectorGenerator::new(settings(IndexMethod::Address), &METRICS);
        let glyphs = GlyphAccumulator::default().record(
            0x41,
            generator.process_glyph(0x41, Some(&triangle())),
        );
        let bytes = generator.assemble(&glyphs, 1, "V").unwrap();
        let header_len = VectorHeader::FIXED_LEN + 2;
        let slot = header_len + 0x41 * 4;
        let offset = header_len + 262144;
        assert_eq!(&bytes[slot..slot + 4], &(offset as u32).to_le_bytes());
        assert_eq!(&bytes[header_len..header_len + 4], &[0xFF; 4]);
        assert_eq!(bytes.len(), offset + 11 + 2 + 12);
        // ascent, descent and line gap follow the name length
        assert_eq!(&bytes[14..20], &[0x20, 0x03, 0x38, 0xFF, 90, 0]);
    }

    #[test]
    fn offset_index_pairs_unicode_and_offset() {
        let generator = VectorGenerator::new(settings(IndexMethod::Offset), &METRICS);
        let glyphs = GlyphAccumulator::default()
            .record(0x42, generator.process_glyph(0x42, None))
            .record(0x41, generator.process_glyph(0x41, Some(&triangle())));
        let bytes = generator.assemble(&glyphs, 2, "V").unwrap();
        let header_len = VectorHeader::FIXED_LEN + 2;
        let first = (header_len + 12) as u32;
        let index = &bytes[header_len..header_len + 12];
        let mut expected = vec![0x41, 0x00];
        expected.extend_from_slice(&first.to_le_bytes());
        expected.extend_from_slice(&[0xFF; 6]);
        assert_eq!(index, &expected[..]);
    }
}
