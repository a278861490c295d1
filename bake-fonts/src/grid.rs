//! An 8-bit coverage grid, the unit of work passed between pipeline stages.

/// A row-major grid of 8-bit coverage values.
///
/// Every pipeline stage takes a grid by reference and produces a new one;
/// no stage modifies its input.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct GrayscaleGrid {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GrayscaleGrid {
    /// Create a zero-filled grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Create a grid from existing row-major pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        assert_eq!(pixels.len(), width * height, "pixel count mismatch");
        Self {
            width,
            height,
            pixels,
        }
    }

    /// The zero-size grid.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.pixels[y * self.width + x] = value;
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        // chunks_exact panics on a zero chunk size
        (0..self.height).map(move |y| self.row(y))
    }

    /// Sum of all pixel values.
    pub fn intensity(&self) -> u64 {
        self.pixels.iter().map(|p| *p as u64).sum()
    }

    /// Number of pixels with a non-zero value.
    pub fn coverage(&self) -> usize {
        self.pixels.iter().filter(|p| **p != 0).count()
    }
}

impl std::fmt::Debug for GrayscaleGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "GrayscaleGrid {}x{}", self.width, self.height)?;
        for row in self.rows() {
            for pixel in row {
                write!(f, "{pixel:02x} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_has_no_rows() {
        let grid = GrayscaleGrid::empty();
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 0);
        assert_eq!(grid.intensity(), 0);
    }

    #[test]
    fn zero_height_grid_keeps_width() {
        let grid = GrayscaleGrid::new(5, 0);
        assert_eq!(grid.width(), 5);
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 0);
    }

    #[test]
    fn row_access() {
        let grid = GrayscaleGrid::from_pixels(3, 2, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(grid.row(1), &[4, 5, 6]);
        assert_eq!(grid.get(2, 0), 3);
        assert_eq!(grid.intensity(), 21);
        assert_eq!(grid.coverage(), 6);
    }
}
