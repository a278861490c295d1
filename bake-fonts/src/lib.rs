//! Baking font outlines into compact binary fonts.
//!
//! This crate converts the glyphs of an OpenType font into one of two binary
//! formats read by embedded text renderers:
//!
//! * bitmap fonts, where every glyph is rasterized onto a fixed canvas and
//!   packed at 1, 2, 4 or 8 bits per pixel, and
//! * vector fonts, where every glyph is stored as flattened contours in font
//!   units.
//!
//! Both formats consist of a small header, an index area used to locate
//! glyphs by code point, and the glyph records in ascending code point order.
//!
//! The easiest entry point is [`bake`], which runs a [`FontConfig`] from
//! start to finish. The individual stages of the bitmap pipeline
//! ([`raster`], [`style`], [`canvas`], [`crop`], [`pack`]) are exposed for
//! finer control.
//!
//! ```no_run
//! use bake_fonts::{bake, FontConfig};
//!
//! let mut config = FontConfig::new("NotoSans-Regular.ttf");
//! config.size = 24;
//! config.charset.ranges.push("20-7e".into());
//! let paths = bake(&config).unwrap();
//! println!("wrote {}", paths.binary.display());
//! ```

pub mod bitmap;
pub mod canvas;
pub mod charset;
pub mod config;
pub mod crop;
mod error;
pub mod generate;
mod grid;
pub mod header;
pub mod index;
pub mod outline;
pub mod output;
pub mod pack;
pub mod raster;
pub mod style;
pub mod vector;
pub mod write;

pub use charset::CharacterSet;
pub use config::{BatchConfig, FontConfig, Overrides};
pub use error::Error;
pub use generate::{generate, FontKind, FontSettings, GeneratedFont, SizeMode};
pub use grid::GrayscaleGrid;
pub use header::IndexMethod;
pub use outline::{FontSource, OutlineSource};
pub use output::{write_font, OutputPaths};
pub use pack::RenderMode;
pub use raster::RenderFailure;
pub use style::Rotation;

/// Generate one configured font and write its files.
pub fn bake(config: &FontConfig) -> Result<OutputPaths, Error> {
    let settings = config.settings()?;
    let chars = config.charset.load()?.to_vec();
    let data = std::fs::read(&config.path).map_err(|e| Error::io(&config.path, e))?;
    let source = FontSource::new(&data, config.face_index)?;
    log::info!(
        "baking {} ({} characters)",
        config.path.display(),
        chars.len()
    );
    let font = generate(&settings, &source, &chars)?;
    write_font(&font, &config.output_dir)
}
