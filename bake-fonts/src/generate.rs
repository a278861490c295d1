//! Turning an outline source and a character set into a binary font.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    bitmap::{BitmapGenerator, BitmapSettings},
    header::IndexMethod,
    outline::{FontMetrics, OutlineSource},
    pack::RenderMode,
    raster::RenderFailure,
    style::{GammaTable, Rotation, Style},
    vector::{VectorGenerator, VectorSettings},
    Error,
};

/// Name used when neither the configuration nor the font provide one.
const DEFAULT_FONT_NAME: &str = "font";

/// Glyphs collected while walking a character set.
///
/// Glyphs are keyed by code point so they iterate in ascending order no
/// matter the order characters were rendered in.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphAccumulator<G> {
    glyphs: BTreeMap<u32, G>,
    failures: Vec<(u32, RenderFailure)>,
}

impl<G> Default for GlyphAccumulator<G> {
    fn default() -> Self {
        Self {
            glyphs: BTreeMap::new(),
            failures: Vec::new(),
        }
    }
}

impl<G> GlyphAccumulator<G> {
    /// Fold the result for one character into the accumulator.
    pub fn record(mut self, unicode: u32, result: Result<G, RenderFailure>) -> Self {
        match result {
            Ok(glyph) => {
                self.glyphs.insert(unicode, glyph);
            }
            Err(failure) => {
                log::warn!("skipping U+{unicode:04X}: {failure}");
                self.failures.push((unicode, failure));
            }
        }
        self
    }

    /// Rendered glyphs in ascending code point order.
    pub fn glyphs(&self) -> impl Iterator<Item = (&u32, &G)> + '_ {
        self.glyphs.iter()
    }

    pub fn get(&self, unicode: u32) -> Option<&G> {
        self.glyphs.get(&unicode)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Characters that produced no glyph, in the order they were seen.
    pub fn failures(&self) -> &[(u32, RenderFailure)] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<(u32, RenderFailure)> {
        self.failures
    }
}

/// The kind of font file to produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontKind {
    #[default]
    Bitmap,
    Vector,
}

/// How the configured size is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeMode {
    /// The size is the full line height; the em is scaled down to fit
    /// ascent and descent.
    #[default]
    LineHeight,
    /// The size is the em size; the canvas grows to fit ascent and descent.
    Em,
}

/// The two sizes of a bitmap font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontSizes {
    /// Canvas size in pixels.
    pub back_size: u32,
    /// Pixel size outlines are rendered at.
    pub scaled_size: u32,
}

impl SizeMode {
    pub fn resolve(self, size: u32, metrics: &FontMetrics) -> Result<FontSizes, Error> {
        let line_height = metrics.line_height();
        if !line_height.is_finite() || line_height <= 0.0 || metrics.units_per_em == 0 {
            return Err(Error::InvalidMetrics {
                ascent: metrics.ascent,
                descent: metrics.descent,
            });
        }
        let upem = metrics.units_per_em as f64;
        let sizes = match self {
            SizeMode::LineHeight => FontSizes {
                back_size: size,
                scaled_size: (size as f64 * upem / line_height) as u32,
            },
            SizeMode::Em => FontSizes {
                back_size: (size as f64 * line_height / upem).round() as u32,
                scaled_size: size,
            },
        };
        if sizes.back_size == 0 || sizes.scaled_size == 0 {
            return Err(Error::InvalidFontSize(size));
        }
        Ok(sizes)
    }
}

/// Validated options for generating one font.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSettings {
    pub kind: FontKind,
    pub size: u32,
    pub size_mode: SizeMode,
    pub render_mode: RenderMode,
    pub bold: bool,
    pub italic: bool,
    pub rvd: bool,
    pub rotation: Rotation,
    pub gamma: f32,
    pub index_method: IndexMethod,
    pub crop: bool,
    /// Overrides the family name from the font.
    pub name: Option<String>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            kind: FontKind::Bitmap,
            size: 16,
            size_mode: SizeMode::LineHeight,
            render_mode: RenderMode::Gray4,
            bold: false,
            italic: false,
            rvd: false,
            rotation: Rotation::Deg0,
            gamma: 1.0,
            index_method: IndexMethod::Address,
            crop: false,
            name: None,
        }
    }
}

/// A generator for one of the font kinds.
#[derive(Clone, Debug)]
pub enum Generator {
    Bitmap(BitmapGenerator),
    Vector(VectorGenerator),
}

impl Generator {
    pub fn new(settings: &FontSettings, metrics: &FontMetrics) -> Result<Self, Error> {
        match settings.kind {
            FontKind::Bitmap => {
                let sizes = settings.size_mode.resolve(settings.size, metrics)?;
                log::debug!(
                    "size {} resolved to canvas {} and render size {}",
                    settings.size,
                    sizes.back_size,
                    sizes.scaled_size
                );
                let style = Style {
                    gamma: GammaTable::new(settings.gamma),
                    bold: settings.bold,
                    italic: settings.italic,
                    rotation: settings.rotation,
                };
                let bitmap = BitmapSettings {
                    back_size: sizes.back_size,
                    scaled_size: sizes.scaled_size,
                    render_mode: settings.render_mode,
                    style,
                    crop: settings.crop,
                    index_method: settings.index_method,
                    rvd: settings.rvd,
                };
                Ok(Generator::Bitmap(BitmapGenerator::new(bitmap, metrics)))
            }
            FontKind::Vector => {
                let vector = VectorSettings {
                    size: settings.size,
                    bold: settings.bold,
                    italic: settings.italic,
                    rvd: settings.rvd,
                    index_method: settings.index_method,
                };
                Ok(Generator::Vector(VectorGenerator::new(vector, metrics)))
            }
        }
    }

    /// The file name stem of the generated font.
    pub fn stem(&self, font_name: &str) -> String {
        let name = font_name
            .chars()
            .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
            .collect::<String>();
        match self {
            Generator::Bitmap(generator) => {
                let settings = generator.settings();
                format!(
                    "{name}_size{}_bits{}",
                    settings.back_size,
                    settings.render_mode.bits_per_pixel()
                )
            }
            Generator::Vector(_) => format!("{name}_vector"),
        }
    }

    /// Render `chars`, which must be sorted and free of duplicates, and
    /// serialize the font.
    pub fn generate(
        &self,
        source: &impl OutlineSource,
        chars: &[u32],
        font_name: &str,
    ) -> Result<GeneratedFont, Error> {
        let (binary, failures) = match self {
            Generator::Bitmap(generator) => {
                let glyphs = generator.render(source, chars);
                let binary = generator.assemble(&glyphs, chars.len(), font_name)?;
                (binary, glyphs.into_failures())
            }
            Generator::Vector(generator) => {
                let glyphs = generator.render(source, chars);
                let binary = generator.assemble(&glyphs, chars.len(), font_name)?;
                (binary, glyphs.into_failures())
            }
        };
        Ok(GeneratedFont {
            stem: self.stem(font_name),
            binary,
            charset: chars.to_vec(),
            failures,
        })
    }
}

/// A serialized font and the data for its sidecar files.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedFont {
    pub stem: String,
    pub binary: Vec<u8>,
    /// Every requested character, including the failed ones.
    pub charset: Vec<u32>,
    pub failures: Vec<(u32, RenderFailure)>,
}

impl GeneratedFont {
    /// The character set sidecar: one little-endian u16 per character.
    pub fn charset_bytes(&self) -> Vec<u8> {
        self.charset
            .iter()
            .flat_map(|ch| (*ch as u16).to_le_bytes())
            .collect()
    }

    /// The unsupported characters report, if any character failed.
    pub fn unsupported_report(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let mut report = String::new();
        for (unicode, _) in &self.failures {
            let ch = char::from_u32(*unicode).unwrap_or(char::REPLACEMENT_CHARACTER);
            report.push_str(&format!("U+{unicode:04X} ({ch})\n"));
        }
        Some(report)
    }
}

/// Generate a font from `source`.
///
/// The font name is taken from `settings`, then from the font's family
/// name.
pub fn generate(
    settings: &FontSettings,
    source: &impl OutlineSource,
    chars: &[u32],
) -> Result<GeneratedFont, Error> {
    let metrics = source.metrics();
    let name = settings
        .name
        .clone()
        .or_else(|| source.family_name())
        .unwrap_or_else(|| DEFAULT_FONT_NAME.to_string());
    let generator = Generator::new(settings, &metrics)?;
    let font = generator.generate(source, chars, &name)?;
    log::info!(
        "generated {}: {} of {} characters, {} bytes",
        font.stem,
        chars.len() - font.failures.len(),
        chars.len(),
        font.binary.len()
    );
    Ok(font)
}
