//! Trimming empty rows above composited glyphs.

use crate::GrayscaleGrid;

/// Describes the part of the canvas kept by [`crop`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CropInfo {
    /// Empty rows removed from the top of the valid region.
    pub top_skip: usize,
    /// Always zero; columns are never trimmed.
    pub left_skip: usize,
    pub valid_width: usize,
    pub valid_height: usize,
}

impl CropInfo {
    /// Rows remaining after the crop.
    pub fn height(&self) -> usize {
        self.valid_height - self.top_skip
    }
}

/// Keep the `valid_width` x `valid_height` top left region of `canvas`,
/// minus the empty rows at its top.
///
/// If the region is blank the result is empty and `top_skip` equals
/// `valid_height`.
pub fn crop(
    canvas: &GrayscaleGrid,
    valid_width: usize,
    valid_height: usize,
) -> (GrayscaleGrid, CropInfo) {
    let valid_width = valid_width.min(canvas.width());
    let valid_height = valid_height.min(canvas.height());
    let top_skip = (0..valid_height)
        .find(|y| canvas.row(*y)[..valid_width].iter().any(|p| *p != 0))
        .unwrap_or(valid_height);
    let info = CropInfo {
        top_skip,
        left_skip: 0,
        valid_width,
        valid_height,
    };
    if top_skip == valid_height {
        return (GrayscaleGrid::empty(), info);
    }
    let pixels = (top_skip..valid_height)
        .flat_map(|y| canvas.row(y)[..valid_width].iter().copied())
        .collect();
    let grid = GrayscaleGrid::from_pixels(valid_width, info.height(), pixels);
    (grid, info)
}
