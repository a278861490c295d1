//! Packing coverage grids into 1, 2, 4 or 8 bits per pixel.

use crate::{Error, GrayscaleGrid};

/// Bits per pixel of packed glyph data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    Mono = 1,
    Gray2 = 2,
    #[default]
    Gray4 = 4,
    Gray8 = 8,
}

impl RenderMode {
    pub fn bits_per_pixel(self) -> usize {
        self as usize
    }

    pub fn pixels_per_byte(self) -> usize {
        8 / self.bits_per_pixel()
    }

    /// Bytes needed to store one row of `width` pixels.
    pub fn bytes_per_row(self, width: usize) -> usize {
        (width * self.bits_per_pixel()).div_ceil(8)
    }

    /// Bytes needed to store a `width` x `height` grid.
    pub fn packed_len(self, width: usize, height: usize) -> usize {
        height * self.bytes_per_row(width)
    }

    /// Reduce an 8-bit coverage value to this mode's precision.
    #[inline]
    fn quantize(self, pixel: u8) -> u8 {
        match self {
            RenderMode::Mono => (pixel >= 128) as u8,
            RenderMode::Gray2 => pixel >> 6,
            RenderMode::Gray4 => pixel >> 4,
            RenderMode::Gray8 => pixel,
        }
    }
}

impl TryFrom<u8> for RenderMode {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(RenderMode::Mono),
            2 => Ok(RenderMode::Gray2),
            4 => Ok(RenderMode::Gray4),
            8 => Ok(RenderMode::Gray8),
            other => Err(Error::InvalidRenderMode(other)),
        }
    }
}

/// Pack a grid row by row.
///
/// Each row starts on a byte boundary. Within a byte the first pixel
/// occupies the least significant bits.
pub fn pack(grid: &GrayscaleGrid, mode: RenderMode) -> Vec<u8> {
    let bpp = mode.bits_per_pixel();
    let per_byte = mode.pixels_per_byte();
    let mut out = Vec::with_capacity(mode.packed_len(grid.width(), grid.height()));
    for row in grid.rows() {
        if mode == RenderMode::Gray8 {
            out.extend_from_slice(row);
            continue;
        }
        out.extend(row.chunks(per_byte).map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, pixel)| byte | mode.quantize(*pixel) << (i * bpp))
        }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const MODES: [RenderMode; 4] = [
        RenderMode::Mono,
        RenderMode::Gray2,
        RenderMode::Gray4,
        RenderMode::Gray8,
    ];

    #[test]
    fn single_blank_pixel_is_one_zero_byte() {
        let grid = GrayscaleGrid::new(1, 1);
        assert_eq!(pack(&grid, RenderMode::Mono), vec![0x00]);
    }

    #[test]
    fn packed_size_law() {
        for mode in MODES {
            for width in 0..20 {
                for height in 0..5 {
                    let grid = GrayscaleGrid::new(width, height);
                    let expected = height * (width * mode.bits_per_pixel()).div_ceil(8);
                    assert_eq!(pack(&grid, mode).len(), expected, "{mode:?} {width}x{height}");
                    assert_eq!(mode.packed_len(width, height), expected);
                }
            }
        }
    }

    #[rstest]
    #[case(RenderMode::Mono, vec![0b1000_0101, 0b0000_0001])]
    #[case(RenderMode::Gray2, vec![0b0011_0011, 0b1000_0001, 0b0000_0010])]
    #[case(RenderMode::Gray4, vec![0x0F, 0x0C, 0x07, 0x80, 0x08])]
    #[case(RenderMode::Gray8, vec![255, 10, 200, 0, 127, 0, 0, 128, 130])]
    fn first_pixel_in_low_bits(#[case] mode: RenderMode, #[case] expected: Vec<u8>) {
        let row = vec![255, 10, 200, 0, 127, 0, 0, 128, 130];
        let grid = GrayscaleGrid::from_pixels(9, 1, row);
        assert_eq!(pack(&grid, mode), expected);
    }

    #[test]
    fn rows_are_byte_aligned() {
        // 3 pixels per row in mono mode still take a full byte each
        let grid = GrayscaleGrid::from_pixels(3, 2, vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(pack(&grid, RenderMode::Mono), vec![0b001, 0b100]);
    }

    #[test]
    fn render_mode_from_bits() {
        assert_eq!(RenderMode::try_from(2).unwrap(), RenderMode::Gray2);
        assert!(matches!(
            RenderMode::try_from(3),
            Err(Error::InvalidRenderMode(3))
        ));
    }
}
