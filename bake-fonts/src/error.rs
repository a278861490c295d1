//! Errors that abort the generation of a font.

use std::path::PathBuf;

use skrifa::raw::ReadError;
use thiserror::Error;

/// An error that stops a font from being generated.
///
/// Per-glyph problems are not errors; see [`RenderFailure`].
///
/// [`RenderFailure`]: crate::RenderFailure
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid render mode {0}, expected one of 1, 2, 4 or 8")]
    InvalidRenderMode(u8),

    #[error("invalid rotation {0}, expected one of 0, 90, 180 or 270")]
    InvalidRotation(u16),

    #[error("invalid gamma {0}, expected a positive finite value")]
    InvalidGamma(f32),

    #[error("invalid font size {0}")]
    InvalidFontSize(u32),

    #[error("invalid input unicode {0}")]
    InvalidUnicode(String),

    #[error("invalid unicode range {start:X}-{end:X}")]
    InvalidUnicodeRange { start: u32, end: u32 },

    #[error("font name is {0} bytes, which does not fit in the header")]
    FontNameTooLong(usize),

    #[error("font has invalid vertical metrics (ascent {ascent}, descent {descent})")]
    InvalidMetrics { ascent: f32, descent: f32 },

    #[error("failed to read font data: {0}")]
    Read(#[from] ReadError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
