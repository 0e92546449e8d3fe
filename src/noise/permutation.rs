//! Seeded permutation table shared by the gradient noise evaluators.

/// Number of entries in the permutation table.
pub const TABLE_SIZE: usize = 256;

/// Multiplier of the linear-congruential state mix.
const MIX_MUL: u32 = 1_664_525;
/// Increment of the linear-congruential state mix.
const MIX_INC: u32 = 1_013_904_223;
/// Added to the state before reducing it to a shuffle index.
const PICK_OFFSET: u64 = 31;

/// Gradient count and dimensionality of the 2D gradient set.
pub(crate) const GRADIENTS_2D: (u8, u8) = (8, 2);
/// Gradient count and dimensionality of the 3D gradient set.
pub(crate) const GRADIENTS_3D: (u8, u8) = (24, 3);

/// Advances the shuffle state once.
///
/// Single-round LCG step; all arithmetic wraps modulo 2^32.
#[inline]
fn mix(state: u32) -> u32 {
    state.wrapping_mul(MIX_MUL).wrapping_add(MIX_INC)
}

/// A seeded permutation of `0..=255` plus derived gradient-index tables.
///
/// Built once per seed and never mutated afterwards. The same seed always
/// yields the same table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    perm: [u8; TABLE_SIZE],
    grad2: [u8; TABLE_SIZE],
    grad3: [u8; TABLE_SIZE],
}

impl PermutationTable {
    /// Builds the table for `seed`. Every seed is valid.
    pub fn new(seed: i32) -> Self {
        let mut source = [0u8; TABLE_SIZE];
        for (i, slot) in source.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut perm = [0u8; TABLE_SIZE];
        let mut grad2 = [0u8; TABLE_SIZE];
        let mut grad3 = [0u8; TABLE_SIZE];

        let mut state = mix(mix(mix(seed as u32)));

        for i in (0..TABLE_SIZE).rev() {
            state = mix(state);
            let r = ((state as u64 + PICK_OFFSET) % (i as u64 + 1)) as usize;

            perm[i] = source[r];
            grad2[i] = gradient_index(perm[i], GRADIENTS_2D);
            grad3[i] = gradient_index(perm[i], GRADIENTS_3D);
            source[r] = source[i];
        }

        Self { perm, grad2, grad3 }
    }

    /// Returns the permuted value for a lattice coordinate, wrapped into the table.
    #[inline]
    pub fn perm_at(&self, index: i64) -> u8 {
        self.perm[(index & 0xFF) as usize]
    }

    /// Returns the offset of the 2D gradient selected by a lattice hash.
    #[inline]
    pub fn grad2_at(&self, index: i64) -> usize {
        self.grad2[(index & 0xFF) as usize] as usize
    }

    /// Returns the offset of the 3D gradient selected by a lattice hash.
    #[inline]
    pub fn grad3_at(&self, index: i64) -> usize {
        self.grad3[(index & 0xFF) as usize] as usize
    }

    /// The raw permutation.
    pub fn permutation(&self) -> &[u8; TABLE_SIZE] {
        &self.perm
    }
}

/// Reduces a floored lattice coordinate into `0..256`.
///
/// Lookups only ever see coordinates modulo the table size, so wrapping the
/// cell origin first keeps corner offsets from overflowing at huge inputs.
#[inline]
pub(crate) fn lattice_base(coord: f64) -> i64 {
    coord.rem_euclid(TABLE_SIZE as f64) as i64
}

#[inline]
fn gradient_index(value: u8, (count, dims): (u8, u8)) -> u8 {
    (value % count) * dims
}
