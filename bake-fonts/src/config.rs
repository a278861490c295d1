//! Batch configuration files.
//!
//! A configuration is a TOML document with one `[[font]]` table per font to
//! generate. Values are checked and converted into [`FontSettings`] before
//! any rendering starts.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    charset::CharacterSet,
    generate::{FontKind, FontSettings, SizeMode},
    header::IndexMethod,
    pack::RenderMode,
    style::Rotation,
    Error,
};

/// Characters used when a font lists no character sources.
const DEFAULT_RANGES: &str = "20-7e";

/// All fonts of a batch.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    #[serde(default, rename = "font")]
    pub fonts: Vec<FontConfig>,
}

impl BatchConfig {
    /// Parse a configuration document.
    pub fn parse(contents: &str) -> Result<Self, Error> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a configuration file.
    ///
    /// Relative paths inside the file are resolved against the directory
    /// containing it.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config = Self::parse(&contents)?;
        if let Some(base) = path.parent() {
            config
                .fonts
                .iter_mut()
                .for_each(|font| font.resolve_paths(base));
        }
        log::debug!("{} lists {} fonts", path.display(), config.fonts.len());
        Ok(config)
    }
}

/// Options for a single font, as written in a configuration file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontConfig {
    /// The font file to read.
    pub path: PathBuf,
    /// Index of the font in a collection file.
    #[serde(default)]
    pub face_index: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub kind: FontKind,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub size_mode: SizeMode,
    #[serde(default = "default_render_mode")]
    pub render_mode: u8,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub rvd: bool,
    #[serde(default)]
    pub rotation: u16,
    #[serde(default = "default_gamma")]
    pub gamma: f32,
    #[serde(default)]
    pub index_method: IndexMethod,
    #[serde(default)]
    pub crop: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub charset: CharsetConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_size() -> u32 {
    16
}

fn default_render_mode() -> u8 {
    RenderMode::default().bits_per_pixel() as u8
}

fn default_gamma() -> f32 {
    1.0
}

/// The sources of a font's characters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharsetConfig {
    /// Literal strings; every character is included.
    #[serde(default)]
    pub strings: Vec<String>,
    /// Hexadecimal code points and ranges, such as `"20-7e"`.
    #[serde(default)]
    pub ranges: Vec<String>,
    /// Text files, or `.cst` files of little-endian u16 code points.
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl CharsetConfig {
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty() && self.ranges.is_empty() && self.files.is_empty()
    }

    /// Load and merge all sources.
    ///
    /// Without any source, printable ASCII is used.
    pub fn load(&self) -> Result<CharacterSet, Error> {
        let mut set = CharacterSet::new();
        if self.is_empty() {
            set.add_ranges(DEFAULT_RANGES)?;
            return Ok(set);
        }
        for string in &self.strings {
            set.add_str(string);
        }
        for ranges in &self.ranges {
            set.add_ranges(ranges)?;
        }
        for file in &self.files {
            set.add_file(file)?;
        }
        if set.dropped() > 0 {
            log::warn!(
                "dropped {} code points outside the basic multilingual plane",
                set.dropped()
            );
        }
        Ok(set)
    }
}

impl FontConfig {
    /// A configuration for `path` with every other option at its default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            face_index: 0,
            output_dir: default_output_dir(),
            kind: FontKind::default(),
            size: default_size(),
            size_mode: SizeMode::default(),
            render_mode: default_render_mode(),
            bold: false,
            italic: false,
            rvd: false,
            rotation: 0,
            gamma: default_gamma(),
            index_method: IndexMethod::default(),
            crop: false,
            name: None,
            charset: CharsetConfig::default(),
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.path);
        resolve(&mut self.output_dir);
        self.charset.files.iter_mut().for_each(resolve);
    }

    /// Check every option and convert them into settings.
    pub fn settings(&self) -> Result<FontSettings, Error> {
        if self.size == 0 || self.size > u8::MAX as u32 {
            return Err(Error::InvalidFontSize(self.size));
        }
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(Error::InvalidGamma(self.gamma));
        }
        Ok(FontSettings {
            kind: self.kind,
            size: self.size,
            size_mode: self.size_mode,
            render_mode: RenderMode::try_from(self.render_mode)?,
            bold: self.bold,
            italic: self.italic,
            rvd: self.rvd,
            rotation: Rotation::try_from(self.rotation)?,
            gamma: self.gamma,
            index_method: self.index_method,
            crop: self.crop && self.kind == FontKind::Bitmap,
            name: self.name.clone(),
        })
    }
}

/// Values given on the command line, replacing those of every font.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub render_mode: Option<u8>,
    pub size: Option<u32>,
    pub crop: Option<bool>,
    pub index_method: Option<IndexMethod>,
    pub rotation: Option<u16>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub gamma: Option<f32>,
}

impl Overrides {
    pub fn apply(&self, font: &mut FontConfig) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        set(&mut font.output_dir, &self.output_dir);
        set(&mut font.render_mode, &self.render_mode);
        set(&mut font.size, &self.size);
        set(&mut font.crop, &self.crop);
        set(&mut font.index_method, &self.index_method);
        set(&mut font.rotation, &self.rotation);
        set(&mut font.bold, &self.bold);
        set(&mut font.italic, &self.italic);
        set(&mut font.gamma, &self.gamma);
    }
}
