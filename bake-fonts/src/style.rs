//! Grid transforms applied between rasterization and compositing.
//!
//! The transforms run in a fixed order: gamma, bold, italic, rotation.

use crate::{Error, GrayscaleGrid};

/// Horizontal shear factor for synthetic italics, roughly 12 degrees.
pub const ITALIC_SHEAR: f32 = 0.21;

/// Clockwise rotation applied to each glyph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Returns true if this rotation swaps width and height.
    pub fn is_transposed(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = Error;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(Error::InvalidRotation(other)),
        }
    }
}

/// A 256 entry gamma lookup table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GammaTable([u8; 256]);

impl GammaTable {
    pub fn new(gamma: f32) -> Self {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = if gamma == 1.0 {
                i as u8
            } else {
                (255.0 * (i as f64 / 255.0).powf(gamma as f64)).round() as u8
            };
        }
        Self(table)
    }

    pub fn is_identity(&self) -> bool {
        self.0.iter().enumerate().all(|(i, v)| i == *v as usize)
    }

    pub fn apply(&self, grid: &GrayscaleGrid) -> GrayscaleGrid {
        let pixels = grid.pixels().iter().map(|p| self.0[*p as usize]).collect();
        GrayscaleGrid::from_pixels(grid.width(), grid.height(), pixels)
    }
}

/// Thicken strokes by merging a copy shifted one pixel to the right.
pub fn embolden(grid: &GrayscaleGrid) -> GrayscaleGrid {
    let width = grid.width() + 1;
    let mut out = GrayscaleGrid::new(width, grid.height());
    for (y, row) in grid.rows().enumerate() {
        for x in 0..width {
            let here = row.get(x).copied().unwrap_or(0);
            let left = x.checked_sub(1).map(|x| row[x]).unwrap_or(0);
            out.set(x, y, here.max(left));
        }
    }
    out
}

/// Number of pixels row `y` is shifted right by the italic shear.
fn italic_shift(height: usize, y: usize) -> usize {
    ((height - 1 - y) as f32 * ITALIC_SHEAR).floor() as usize
}

/// Shear the grid horizontally; row 0 moves furthest.
pub fn italicize(grid: &GrayscaleGrid) -> GrayscaleGrid {
    let height = grid.height();
    let width = grid.width() + (height as f32 * ITALIC_SHEAR).floor() as usize + 1;
    let mut out = GrayscaleGrid::new(width, height);
    for (y, row) in grid.rows().enumerate() {
        let shift = italic_shift(height, y);
        for (x, pixel) in row.iter().enumerate() {
            out.set(x + shift, y, *pixel);
        }
    }
    out
}

/// Rotate the grid clockwise.
pub fn rotate(grid: &GrayscaleGrid, rotation: Rotation) -> GrayscaleGrid {
    let (w, h) = (grid.width(), grid.height());
    match rotation {
        Rotation::Deg0 => grid.clone(),
        // transpose, then flip horizontally
        Rotation::Deg90 => {
            let mut out = GrayscaleGrid::new(h, w);
            for y in 0..w {
                for x in 0..h {
                    out.set(x, y, grid.get(y, h - 1 - x));
                }
            }
            out
        }
        Rotation::Deg180 => {
            let mut out = GrayscaleGrid::new(w, h);
            for y in 0..h {
                for x in 0..w {
                    out.set(x, y, grid.get(w - 1 - x, h - 1 - y));
                }
            }
            out
        }
        // transpose, then flip vertically
        Rotation::Deg270 => {
            let mut out = GrayscaleGrid::new(h, w);
            for y in 0..w {
                for x in 0..h {
                    out.set(x, y, grid.get(w - 1 - y, x));
                }
            }
            out
        }
    }
}

/// The style applied to every glyph of a font.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub gamma: GammaTable,
    pub bold: bool,
    pub italic: bool,
    pub rotation: Rotation,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            gamma: GammaTable::new(1.0),
            bold: false,
            italic: false,
            rotation: Rotation::Deg0,
        }
    }
}

impl Style {
    /// Run gamma, bold, italic and rotation in order.
    pub fn apply(&self, grid: &GrayscaleGrid) -> GrayscaleGrid {
        let mut grid = if self.gamma.is_identity() {
            grid.clone()
        } else {
            self.gamma.apply(grid)
        };
        if self.bold {
            grid = embolden(&grid);
        }
        if self.italic {
            grid = italicize(&grid);
        }
        rotate(&grid, self.rotation)
    }
}
