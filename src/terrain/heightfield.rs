//! Square grid of elevation samples.

use serde::{Deserialize, Serialize};

use super::config::TerrainError;

/// An N×N heightfield stored row-major, origin at the top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    /// Width and height in cells.
    pub size: u32,
    /// Elevation values, `size * size` entries in row-major order.
    pub heights: Vec<f32>,
}

impl HeightField {
    /// Creates a zero-initialized field.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            heights: vec![0.0; cell_count(size)],
        }
    }

    /// Wraps an existing buffer, checking that it holds `size * size` values.
    pub fn from_heights(size: u32, heights: Vec<f32>) -> Result<Self, TerrainError> {
        let expected = cell_count(size);
        if heights.len() != expected {
            return Err(TerrainError::BufferLength {
                expected,
                actual: heights.len(),
            });
        }
        Ok(Self { size, heights })
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.size && y < self.size);
        y as usize * self.size as usize + x as usize
    }

    /// Returns the height at the given cell.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn get_height(&self, x: u32, y: u32) -> f32 {
        self.heights[self.index(x, y)]
    }

    /// Sets the height at the given cell.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    pub fn set_height(&mut self, x: u32, y: u32, height: f32) {
        let i = self.index(x, y);
        self.heights[i] = height;
    }

    /// One row of the field.
    pub fn row(&self, y: u32) -> &[f32] {
        let n = self.size as usize;
        let start = y as usize * n;
        &self.heights[start..start + n]
    }

    pub fn min_height(&self) -> f32 {
        self.heights.iter().cloned().fold(f32::MAX, f32::min)
    }

    pub fn max_height(&self) -> f32 {
        self.heights.iter().cloned().fold(f32::MIN, f32::max)
    }

    /// Returns (min, max) over all cells.
    pub fn height_range(&self) -> (f32, f32) {
        (self.min_height(), self.max_height())
    }

    pub fn cell_count(&self) -> usize {
        self.heights.len()
    }

    /// Iterates (x, y) in row-major order.
    pub fn cell_coords(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.size;
        (0..n).flat_map(move |y| (0..n).map(move |x| (x, y)))
    }

    /// Consumes the field, returning the flat row-major buffer.
    pub fn into_heights(self) -> Vec<f32> {
        self.heights
    }
}

/// Number of cells in a `size`×`size` grid.
pub(crate) fn cell_count(size: u32) -> usize {
    (size as usize) * (size as usize)
}
