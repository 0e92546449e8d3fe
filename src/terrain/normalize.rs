//! Maps an accumulated heightfield into a bounded output range.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::TerrainError;
use super::heightfield::HeightField;

/// How values are brought into the output range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// Clamp each value independently; in-range values pass through unchanged.
    Clamp,
    /// Stretch the finite min/max of the field onto the range, then clamp.
    Rescale,
}

impl Default for NormalizeMode {
    fn default() -> Self {
        Self::Clamp
    }
}

/// Output range and mapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    pub low: f32,
    pub high: f32,
    pub mode: NormalizeMode,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 1.0,
            mode: NormalizeMode::Clamp,
        }
    }
}

impl Normalizer {
    pub fn new(low: f32, high: f32, mode: NormalizeMode) -> Result<Self, TerrainError> {
        let normalizer = Self { low, high, mode };
        normalizer.validate()?;
        Ok(normalizer)
    }

    /// Unit-range rescaling.
    pub fn rescale() -> Self {
        Self {
            mode: NormalizeMode::Rescale,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low >= self.high {
            return Err(TerrainError::InvalidOutputRange(self.low, self.high));
        }
        Ok(())
    }

    /// Normalizes `field` in place. Never fails: NaN maps to `low`, everything else is clamped.
    pub fn apply(&self, field: &mut HeightField) {
        let (low, high) = (self.low, self.high);

        match self.mode {
            NormalizeMode::Clamp => {
                field
                    .heights
                    .par_iter_mut()
                    .for_each(|h| *h = clamp_or_low(*h, low, high));
            }
            NormalizeMode::Rescale => {
                let Some((min, max)) = finite_range(&field.heights) else {
                    field.heights.par_iter_mut().for_each(|h| *h = clamp_or_low(*h, low, high));
                    return;
                };
                let span = max - min;
                if span <= f32::EPSILON * max.abs().max(1.0) {
                    field.heights.par_iter_mut().for_each(|h| *h = low);
                    return;
                }
                let out_span = high - low;
                field.heights.par_iter_mut().for_each(|h| {
                    let t = (*h - min) / span;
                    *h = clamp_or_low(low + t * out_span, low, high);
                });
            }
        }
    }

    /// Consuming variant of [`Normalizer::apply`].
    pub fn normalize(&self, mut field: HeightField) -> HeightField {
        self.apply(&mut field);
        field
    }
}

#[inline]
fn clamp_or_low(v: f32, low: f32, high: f32) -> f32 {
    if v.is_nan() {
        low
    } else {
        v.clamp(low, high)
    }
}

fn finite_range(values: &[f32]) -> Option<(f32, f32)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
