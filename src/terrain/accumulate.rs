//! Slope-damped octave accumulation.
//!
//! Each octave reads the heightfield left by all previous octaves, measures
//! the existing surface slope, and deposits less new material where the
//! terrain (or the new noise layer) is already steep. Reads come from the
//! settled front buffer while writes go to the back buffer; the two swap
//! once a full pass has finished.

use glam::DVec2;
use log::debug;
use rayon::prelude::*;

use crate::noise::Noise2D;
use super::config::{validate_gradient_factor, validate_grid_size, validate_octaves, TerrainError};
use super::heightfield::{cell_count, HeightField};
use super::octave::OctaveSpec;

/// Two equally sized buffers, one readable and one writable at a time.
#[derive(Debug, Clone)]
pub struct DoubleBuffer {
    buffers: [Vec<f32>; 2],
    front: usize,
}

impl DoubleBuffer {
    /// Both buffers zero-initialized.
    pub fn zeroed(len: usize) -> Self {
        Self {
            buffers: [vec![0.0; len], vec![0.0; len]],
            front: 0,
        }
    }

    pub fn front(&self) -> &[f32] {
        &self.buffers[self.front]
    }

    /// Borrows the front buffer for reading and the back buffer for writing.
    pub fn split(&mut self) -> (&[f32], &mut [f32]) {
        let [a, b] = &mut self.buffers;
        if self.front == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }

    /// Makes the back buffer current.
    pub fn swap(&mut self) {
        self.front ^= 1;
    }

    pub fn into_front(self) -> Vec<f32> {
        let [a, b] = self.buffers;
        if self.front == 0 {
            a
        } else {
            b
        }
    }
}

/// Slope of the settled surface at `(x, y)`, one-sided towards the origin.
///
/// Cells in column 0 have no x slope and cells in row 0 no y slope; the grid
/// does not wrap.
#[inline]
pub fn surface_slope(front: &[f32], size: usize, x: usize, y: usize) -> DVec2 {
    let i = y * size + x;
    let height = front[i] as f64;
    let dx = if x > 0 { height - front[i - 1] as f64 } else { 0.0 };
    let dy = if y > 0 { height - front[i - size] as f64 } else { 0.0 };
    DVec2::new(dx, dy)
}

/// New material deposited for a noise sample `n01` in [0, 1] on a slope of
/// the given magnitude. The denominator is at least 1 for any non-negative
/// inputs.
#[inline]
pub fn damped_contribution(n01: f64, slope_magnitude: f64, gradient_factor: f64) -> f64 {
    n01 / (1.0 + gradient_factor * slope_magnitude)
}

/// Builds a heightfield by running octaves over a noise field.
#[derive(Debug, Clone, Copy)]
pub struct HeightFieldAccumulator {
    size: u32,
    gradient_factor: f64,
}

impl HeightFieldAccumulator {
    pub fn new(size: u32, gradient_factor: f64) -> Result<Self, TerrainError> {
        validate_grid_size(size)?;
        validate_gradient_factor(gradient_factor)?;
        Ok(Self { size, gradient_factor })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn gradient_factor(&self) -> f64 {
        self.gradient_factor
    }

    /// Runs every octave in order and returns the accumulated field.
    ///
    /// # Arguments
    /// * `octaves` - Accumulation passes, applied in order
    /// * `noise` - Field sampled at each cell and its two lower neighbours
    ///
    /// # Returns
    /// The accumulated heightfield, or a [`TerrainError`] if the octave list
    /// is invalid. Nothing is allocated before validation passes.
    pub fn accumulate<N>(&self, octaves: &[OctaveSpec], noise: &N) -> Result<HeightField, TerrainError>
    where
        N: Noise2D + ?Sized,
    {
        self.accumulate_with_progress(octaves, noise, |_, _| {})
    }

    /// Like [`accumulate`](Self::accumulate), calling `on_octave(index, total)`
    /// after each finished pass.
    ///
    /// # Arguments
    /// * `octaves` - Accumulation passes, applied in order
    /// * `noise` - Field sampled at each cell and its two lower neighbours
    /// * `on_octave` - Called with the zero-based octave index and the octave count
    ///
    /// # Returns
    /// The accumulated heightfield, or a [`TerrainError`] if the octave list
    /// is invalid
    pub fn accumulate_with_progress<N, F>(
        &self,
        octaves: &[OctaveSpec],
        noise: &N,
        mut on_octave: F,
    ) -> Result<HeightField, TerrainError>
    where
        N: Noise2D + ?Sized,
        F: FnMut(usize, usize),
    {
        validate_octaves(octaves)?;

        let mut buffers = DoubleBuffer::zeroed(cell_count(self.size));

        for (k, octave) in octaves.iter().enumerate() {
            let (front, back) = buffers.split();
            self.octave_pass(front, back, octave, noise);
            // The pass above has joined, so every write is visible to the next one.
            buffers.swap();

            debug!(
                "octave {}/{}: scale={} weight={}",
                k + 1,
                octaves.len(),
                octave.scale,
                octave.weight
            );
            on_octave(k, octaves.len());
        }

        HeightField::from_heights(self.size, buffers.into_front())
    }

    fn octave_pass<N>(&self, front: &[f32], back: &mut [f32], octave: &OctaveSpec, noise: &N)
    where
        N: Noise2D + ?Sized,
    {
        let n = self.size as usize;
        let gradient_factor = self.gradient_factor;

        back.par_chunks_mut(n).enumerate().for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                *out = accumulate_cell(front, n, x, y, octave, noise, gradient_factor);
            }
        });
    }
}

fn accumulate_cell<N>(
    front: &[f32],
    size: usize,
    x: usize,
    y: usize,
    octave: &OctaveSpec,
    noise: &N,
    gradient_factor: f64,
) -> f32
where
    N: Noise2D + ?Sized,
{
    let height = front[y * size + x] as f64;
    let surface = surface_slope(front, size, x, y);

    let p = octave.sample_point(x, y);
    let n = noise.sample(p.x, p.y);
    let nx = noise.sample(p.x - octave.scale, p.y);
    let ny = noise.sample(p.x, p.y - octave.scale);
    let noise_slope = DVec2::new(n - nx, n - ny);

    let slope = surface + noise_slope * octave.weight;
    let n01 = (n + 1.0) * 0.5;
    let contribution = damped_contribution(n01, slope.length(), gradient_factor);

    (height + contribution * octave.weight) as f32
}
