//! Rectangular 2D float grid used for every heightfield-shaped array.

use std::ops::{Index, IndexMut};

use super::TerrainError;

/// A rectangular 2D array of `f32` samples.
///
/// Cells are addressed as `(i, j)` with `i` in `[0, nx)` (row) and `j` in
/// `[0, ny)` (column), stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    data: Vec<f32>,
}

impl Grid {
    /// Creates a zero-filled grid with `nx` rows and `ny` columns.
    pub fn new(nx: usize, ny: usize) -> Self {
        Self::filled(nx, ny, 0.0)
    }

    /// Creates a grid with every cell set to `value`.
    pub fn filled(nx: usize, ny: usize, value: f32) -> Self {
        Self {
            nx,
            ny,
            data: vec![value; nx * ny],
        }
    }

    /// Wraps row-major `data` as an `nx` x `ny` grid.
    pub fn from_vec(nx: usize, ny: usize, data: Vec<f32>) -> Result<Self, TerrainError> {
        if data.len() != nx * ny {
            return Err(TerrainError::ShapeMismatch {
                expected: (nx, ny),
                found: data.len(),
            });
        }
        Ok(Self { nx, ny, data })
    }

    /// Builds a grid by evaluating `f(i, j)` for every cell.
    pub fn from_fn<F>(nx: usize, ny: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                data.push(f(i, j));
            }
        }
        Self { nx, ny, data }
    }

    /// Number of rows (extent of the first axis).
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of columns (extent of the second axis).
    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.nx == self.ny
    }

    /// Returns the value at `(i, j)`.
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        debug_assert!(i < self.nx && j < self.ny);
        self.data[i * self.ny + j]
    }

    /// Sets the value at `(i, j)`.
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of bounds.
    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        debug_assert!(i < self.nx && j < self.ny);
        self.data[i * self.ny + j] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Iterates over rows as contiguous slices.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, f32> {
        self.data.chunks_exact(self.ny.max(1))
    }

    /// Iterates over all `(i, j)` coordinates in storage order.
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let ny = self.ny;
        (0..self.nx).flat_map(move |i| (0..ny).map(move |j| (i, j)))
    }

    /// True when `other` has the same `nx` x `ny` shape.
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.shape() == other.shape()
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f32;

    fn index(&self, (i, j): (usize, usize)) -> &f32 {
        debug_assert!(i < self.nx && j < self.ny);
        &self.data[i * self.ny + j]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f32 {
        debug_assert!(i < self.nx && j < self.ny);
        &mut self.data[i * self.ny + j]
    }
}
