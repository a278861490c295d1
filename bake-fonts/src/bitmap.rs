//! Generation of bitmap fonts.
//!
//! Each character is rasterized, styled, composited onto the font's canvas,
//! optionally cropped and finally packed. The results are collected into a
//! [`GlyphAccumulator`] and written out as a single binary file.

use crate::{
    canvas::{Canvas, GlyphGeometry},
    crop::{crop, CropInfo},
    generate::GlyphAccumulator,
    header::{BitmapHeader, HeaderFlags, IndexMethod},
    index::{FileAssembler, IndexLayout},
    outline::{FontMetrics, GlyphOutline, OutlineSource},
    pack::{pack, RenderMode},
    raster::{rasterize, PixelBounds, RenderFailure},
    style::Style,
    write::{ByteWriter, FontWrite},
    Error,
};

/// Options that shape every glyph of a bitmap font.
#[derive(Clone, Debug, PartialEq)]
pub struct BitmapSettings {
    /// Canvas size in pixels.
    pub back_size: u32,
    /// Pixel size outlines are rendered at.
    pub scaled_size: u32,
    pub render_mode: RenderMode,
    pub style: Style,
    pub crop: bool,
    pub index_method: IndexMethod,
    pub rvd: bool,
}

impl BitmapSettings {
    fn header_flags(&self) -> HeaderFlags {
        HeaderFlags {
            bold: self.style.bold,
            italic: self.style.italic,
            rvd: self.rvd,
            index_method: self.index_method,
            crop: self.crop,
        }
    }
}

/// A rendered character, ready to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedGlyph {
    pub unicode: u32,
    /// Packed pixel rows.
    pub data: Vec<u8>,
    /// Width of the packed grid.
    pub width: usize,
    /// Height of the packed grid.
    pub height: usize,
    /// Advance width in pixels.
    pub advance: f32,
    pub geometry: GlyphGeometry,
    /// Present only when the font is cropped.
    pub crop: Option<CropInfo>,
}

impl FontWrite for ProcessedGlyph {
    fn write_into(&self, writer: &mut ByteWriter) {
        let mut geometry = self.geometry.to_bytes();
        if let Some(info) = self.crop {
            geometry[0] = info.top_skip.min(u8::MAX as usize) as u8;
        }
        writer.write_slice(&geometry);
        writer.write_slice(&self.data);
    }
}

/// Renders characters into bitmap glyph records.
#[derive(Clone, Debug)]
pub struct BitmapGenerator {
    settings: BitmapSettings,
    canvas: Canvas,
    units_per_em: u16,
}

impl BitmapGenerator {
    pub fn new(settings: BitmapSettings, metrics: &FontMetrics) -> Self {
        let canvas = Canvas::new(
            settings.back_size,
            settings.style.italic,
            settings.style.rotation,
            metrics,
        );
        log::debug!(
            "bitmap canvas {}x{}, baseline {}",
            canvas.width,
            canvas.height,
            canvas.baseline
        );
        Self {
            settings,
            canvas,
            units_per_em: metrics.units_per_em,
        }
    }

    pub fn settings(&self) -> &BitmapSettings {
        &self.settings
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Run a single outline through the whole glyph pipeline.
    pub fn process_glyph(
        &self,
        unicode: u32,
        outline: Option<&GlyphOutline>,
    ) -> Result<ProcessedGlyph, RenderFailure> {
        let outline = outline.ok_or(RenderFailure::MissingGlyph)?;
        let size = self.settings.scaled_size as f64;
        let grid = rasterize(outline, size, self.units_per_em)?;
        let scale = size / self.units_per_em as f64;
        let bounds = PixelBounds::from_font_units(&outline.bounds, scale);

        let styled = self.settings.style.apply(&grid);
        let placement = self.canvas.place(
            styled.width(),
            styled.height(),
            bounds.left_bearing(),
            bounds.top_bearing(),
        );
        let composited = self.canvas.composite(&styled, &placement);

        let (packed_grid, crop_info) = if self.settings.crop {
            let (valid_width, valid_height) = placement.valid_region(&self.canvas);
            let (cropped, info) = crop(&composited, valid_width, valid_height);
            (cropped, Some(info))
        } else {
            (composited, None)
        };
        let data = pack(&packed_grid, self.settings.render_mode);
        log::debug!(
            "U+{unicode:04X}: {}x{} glyph at ({}, {}), {} bytes",
            placement.glyph_width,
            placement.glyph_height,
            placement.draw_x,
            placement.top(),
            data.len()
        );
        Ok(ProcessedGlyph {
            unicode,
            data,
            width: packed_grid.width(),
            height: packed_grid.height(),
            advance: (outline.advance as f64 * scale) as f32,
            geometry: placement.geometry(),
            crop: crop_info,
        })
    }

    /// Render every character of `chars`, recording failures.
    pub fn render(
        &self,
        source: &impl OutlineSource,
        chars: &[u32],
    ) -> GlyphAccumulator<ProcessedGlyph> {
        chars.iter().fold(GlyphAccumulator::default(), |acc, &ch| {
            let outline = source.outline(ch);
            acc.record(ch, self.process_glyph(ch, outline.as_ref()))
        })
    }

    /// Serialize the header, index and glyph records.
    ///
    /// `char_count` is the number of requested characters, including the
    /// ones that failed to render.
    pub fn assemble(
        &self,
        glyphs: &GlyphAccumulator<ProcessedGlyph>,
        char_count: usize,
        font_name: &str,
    ) -> Result<Vec<u8>, Error> {
        let flags = self.settings.header_flags();
        let header = BitmapHeader::new(
            size_byte(self.settings.scaled_size)?,
            size_byte(self.settings.back_size)?,
            self.settings.render_mode,
            flags,
            char_count,
            font_name,
        )?;
        let layout = IndexLayout::bitmap(flags.index_method, flags.crop, char_count);
        let mut assembler = FileAssembler::new(&header, layout);
        for (unicode, glyph) in glyphs.glyphs() {
            assembler.push_record(*unicode, glyph);
        }
        Ok(assembler.finish())
    }
}

/// Header size fields are a single byte.
pub(crate) fn size_byte(size: u32) -> Result<u8, Error> {
    u8::try_from(size).map_err(|_| Error::InvalidFontSize(size))
}
