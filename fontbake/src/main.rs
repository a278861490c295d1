//! Bake fonts into packed binary bitmap or vector fonts.
//!
//! Fonts are either listed in a TOML batch file (`--config`) or given
//! directly with `--font`. Options given on the command line replace the
//! values of every font in the batch.

use std::path::PathBuf;

use bake_fonts::{
    bake, config::CharsetConfig, BatchConfig, FontConfig, FontKind, IndexMethod, Overrides,
};
use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(version, about)]
#[command(group(ArgGroup::new("input").required(true).args(["config", "font"])))]
struct Args {
    /// A TOML file listing the fonts to generate
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font files to generate with the options given on the command line
    #[arg(long, num_args = 1..)]
    font: Vec<PathBuf>,

    /// Generate vector fonts instead of bitmap fonts (only with --font)
    #[arg(long)]
    vector: bool,

    /// Hexadecimal code points and ranges, for example "20-7e,4e00-4e0f"
    #[arg(long)]
    chars: Option<String>,

    /// Literal characters to include
    #[arg(long)]
    text: Option<String>,

    /// Text files, or .cst files of little-endian u16 code points
    #[arg(long)]
    charset_file: Vec<PathBuf>,

    /// Directory to write the generated files to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Bits per pixel of bitmap fonts: 1, 2, 4 or 8
    #[arg(long)]
    render_mode: Option<u8>,

    /// Font size in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Trim empty rows above each glyph
    #[arg(long)]
    crop: bool,

    /// How glyphs are located through the index
    #[arg(long)]
    index_method: Option<IndexMethodArg>,

    /// Rotation in degrees: 0, 90, 180 or 270
    #[arg(long)]
    rotation: Option<u16>,

    /// Embolden glyphs
    #[arg(long)]
    bold: bool,

    /// Slant glyphs
    #[arg(long)]
    italic: bool,

    /// Gamma applied to glyph coverage
    #[arg(long)]
    gamma: Option<f32>,
}

#[derive(clap::ValueEnum, Copy, Clone, Debug)]
enum IndexMethodArg {
    /// One slot per code point in the basic multilingual plane
    Address,
    /// One slot per requested character
    Offset,
}

impl From<IndexMethodArg> for IndexMethod {
    fn from(arg: IndexMethodArg) -> Self {
        match arg {
            IndexMethodArg::Address => IndexMethod::Address,
            IndexMethodArg::Offset => IndexMethod::Offset,
        }
    }
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            output_dir: self.output_dir.clone(),
            render_mode: self.render_mode,
            size: self.size,
            crop: self.crop.then_some(true),
            index_method: self.index_method.map(Into::into),
            rotation: self.rotation,
            bold: self.bold.then_some(true),
            italic: self.italic.then_some(true),
            gamma: self.gamma,
        }
    }

    fn charset(&self) -> Option<CharsetConfig> {
        let charset = CharsetConfig {
            strings: self.text.iter().cloned().collect(),
            ranges: self.chars.iter().cloned().collect(),
            files: self.charset_file.clone(),
        };
        (!charset.is_empty()).then_some(charset)
    }

    fn fonts(&self) -> Result<Vec<FontConfig>, bake_fonts::Error> {
        let mut fonts = match &self.config {
            Some(path) => BatchConfig::load(path)?.fonts,
            None => self
                .font
                .iter()
                .map(|path| FontConfig {
                    kind: if self.vector {
                        FontKind::Vector
                    } else {
                        FontKind::Bitmap
                    },
                    ..FontConfig::new(path)
                })
                .collect(),
        };
        let overrides = self.overrides();
        let charset = self.charset();
        for font in &mut fonts {
            overrides.apply(font);
            if let Some(charset) = &charset {
                font.charset = charset.clone();
            }
        }
        Ok(fonts)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse_from(wild::args());

    let fonts = match args.fonts() {
        Ok(fonts) => fonts,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    if fonts.is_empty() {
        log::warn!("no fonts to generate");
    }

    let mut ok = true;
    for font in &fonts {
        match bake(font) {
            Ok(paths) => log::debug!("{} done", paths.binary.display()),
            Err(e) => {
                log::error!("failed to generate {}: {e}", font.path.display());
                ok = false;
            }
        }
    }
    if !ok {
        std::process::exit(1);
    }
}
