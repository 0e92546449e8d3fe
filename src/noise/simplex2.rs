//! Two-dimensional OpenSimplex-style gradient noise.
//!
//! Input coordinates are skewed onto a triangular lattice. A small lookup
//! keyed by the position inside the lattice cell selects the four corners
//! whose radial falloff can reach the sample point, so no branching on
//! cell regions is needed at evaluation time.

use super::permutation::{lattice_base, PermutationTable};
use super::Noise2D;

/// `(1 / sqrt(3) - 1) / 2`, skews input space onto the lattice.
const STRETCH: f64 = -0.211_324_865_405_187_1;
/// `(sqrt(3) - 1) / 2`, unskews lattice points back into input space.
const SQUISH: f64 = 0.366_025_403_784_438_6;
/// Scales the accumulated sum into roughly [-1, 1].
const NORM: f64 = 1.0 / 47.0;

/// Eight gradient vectors, flattened as `(x, y)` pairs.
const GRADIENTS: [f64; 16] = [
    5.0, 2.0, 2.0, 5.0, //
    -2.0, 5.0, -5.0, 2.0, //
    2.0, -5.0, 5.0, -2.0, //
    -5.0, -2.0, -2.0, -5.0,
];

/// Corners shared by every contribution set, as `(multiplier, xsb, ysb)`.
const BASE: [[(i8, i8, i8); 3]; 2] = [
    [(1, 1, 0), (1, 0, 1), (0, 0, 0)],
    [(1, 1, 0), (1, 0, 1), (2, 1, 1)],
];

/// Contribution sets: base index plus the one extra corner.
const SETS: [(usize, (i8, i8, i8)); 6] = [
    (0, (0, 1, -1)),
    (0, (0, -1, 1)),
    (0, (2, 1, 1)),
    (1, (2, 2, 0)),
    (1, (2, 0, 2)),
    (1, (0, 0, 0)),
];

/// Sub-cell hash to contribution set.
const LOOKUP_PAIRS: [(usize, u8); 12] = [
    (0, 1),
    (1, 0),
    (4, 1),
    (17, 0),
    (20, 2),
    (21, 2),
    (22, 5),
    (23, 5),
    (26, 4),
    (39, 3),
    (42, 4),
    (43, 3),
];

const LOOKUP_SIZE: usize = 64;
const NO_SET: u8 = u8::MAX;

/// A lattice corner relative to the cell origin.
#[derive(Debug, Clone, Copy)]
struct Corner {
    dx: f64,
    dy: f64,
    xsb: i64,
    ysb: i64,
}

impl Corner {
    fn new((multiplier, xsb, ysb): (i8, i8, i8)) -> Self {
        let m = multiplier as f64;
        Self {
            dx: -(xsb as f64) - m * SQUISH,
            dy: -(ysb as f64) - m * SQUISH,
            xsb: xsb as i64,
            ysb: ysb as i64,
        }
    }
}

/// Seeded, continuous 2D gradient noise.
///
/// Owns its permutation table. Evaluation is a pure function of the
/// coordinates, so the same instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct Simplex2 {
    table: PermutationTable,
    sets: [[Corner; 4]; 6],
    lookup: [u8; LOOKUP_SIZE],
}

impl Simplex2 {
    /// Builds the evaluator for `seed`.
    pub fn new(seed: i32) -> Self {
        Self::with_table(PermutationTable::new(seed))
    }

    /// Builds the evaluator around an existing permutation table.
    pub fn with_table(table: PermutationTable) -> Self {
        let sets = SETS.map(|(base, extra)| {
            let b = &BASE[base];
            [
                Corner::new(b[0]),
                Corner::new(b[1]),
                Corner::new(b[2]),
                Corner::new(extra),
            ]
        });

        let mut lookup = [NO_SET; LOOKUP_SIZE];
        for (hash, set) in LOOKUP_PAIRS {
            lookup[hash] = set;
        }

        Self { table, sets, lookup }
    }

    /// The permutation table this evaluator samples gradients from.
    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    /// Evaluates the noise field at `(x, y)`.
    ///
    /// The result lies in approximately [-1, 1].
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let stretch = (x + y) * STRETCH;
        let xs = x + stretch;
        let ys = y + stretch;

        let xsb = xs.floor();
        let ysb = ys.floor();

        let squish = (xsb + ysb) * SQUISH;
        let dx0 = x - (xsb + squish);
        let dy0 = y - (ysb + squish);

        let xins = xs - xsb;
        let yins = ys - ysb;
        let in_sum = xins + yins;

        let hash = (xins - yins + 1.0) as usize
            | ((in_sum as usize) << 1)
            | (((in_sum + yins) as usize) << 2)
            | (((in_sum + xins) as usize) << 4);

        let set = match self.lookup.get(hash) {
            Some(&s) if s != NO_SET => &self.sets[s as usize],
            _ => return 0.0,
        };

        let xsb = lattice_base(xsb);
        let ysb = lattice_base(ysb);
        let mut value = 0.0;

        for c in set {
            let dx = dx0 + c.dx;
            let dy = dy0 + c.dy;
            let attn = 2.0 - dx * dx - dy * dy;
            if attn > 0.0 {
                let px = xsb + c.xsb;
                let py = ysb + c.ysb;
                let index = self.table.grad2_at(self.table.perm_at(px) as i64 + py);
                let dot = GRADIENTS[index] * dx + GRADIENTS[index + 1] * dy;
                let attn2 = attn * attn;
                value += attn2 * attn2 * dot;
            }
        }

        value * NORM
    }
}

impl Noise2D for Simplex2 {
    #[inline]
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.eval(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = Simplex2::new(123);
        let b = Simplex2::new(123);
        for i in 0..200 {
            let x = i as f64 * 0.173 - 7.0;
            let y = i as f64 * 0.091 + 3.0;
            assert_eq!(a.eval(x, y).to_bits(), b.eval(x, y).to_bits());
        }
    }

    #[test]
    fn test_call_order_does_not_matter() {
        let n = Simplex2::new(9);
        let first = n.eval(1.25, -3.5);
        for i in 0..50 {
            n.eval(i as f64, i as f64 * 0.5);
        }
        assert_eq!(first, n.eval(1.25, -3.5));
    }

    #[test]
    fn test_range() {
        let n = Simplex2::new(2024);
        let mut max_abs: f64 = 0.0;
        for yi in 0..300 {
            for xi in 0..300 {
                let v = n.eval(xi as f64 * 0.037, yi as f64 * 0.041);
                assert!(v.is_finite());
                max_abs = max_abs.max(v.abs());
            }
        }
        assert!(max_abs <= 1.0, "noise magnitude {} exceeds 1", max_abs);
        assert!(max_abs > 0.3, "noise is suspiciously flat: {}", max_abs);
    }

    #[test]
    fn test_not_constant_and_seed_dependent() {
        let a = Simplex2::new(1);
        let b = Simplex2::new(2);
        let mut diff_seed = 0;
        let mut diff_pos = 0;
        for i in 0..100 {
            let x = i as f64 * 0.31 + 0.1;
            let y = i as f64 * 0.17 + 0.2;
            if a.eval(x, y) != b.eval(x, y) {
                diff_seed += 1;
            }
            if a.eval(x, y) != a.eval(x + 0.5, y) {
                diff_pos += 1;
            }
        }
        assert!(diff_seed > 90);
        assert!(diff_pos > 90);
    }

    #[test]
    fn test_continuity_across_lattice_boundaries() {
        let n = Simplex2::new(77);
        let eps = 1e-7;
        // Sweep through many lattice cells, including points that sit on
        // integer coordinates and on the skewed cell diagonals.
        for i in 0..4000 {
            let x = i as f64 * 0.0125 - 25.0;
            let y = (i % 97) as f64 * 0.25 - 12.0;
            let v = n.eval(x, y);
            let dx = (n.eval(x + eps, y) - v).abs();
            let dy = (n.eval(x, y + eps) - v).abs();
            assert!(dx < 1e-4, "jump of {} in x at ({}, {})", dx, x, y);
            assert!(dy < 1e-4, "jump of {} in y at ({}, {})", dy, x, y);
        }
    }

    #[test]
    fn test_difference_vanishes_with_epsilon() {
        let n = Simplex2::new(3);
        for &(x, y) in &[(4.0, 2.0), (0.0, 0.0), (-1.0, 1.0), (2.5, -0.5)] {
            let v = n.eval(x, y);
            let d = (n.eval(x + 1e-9, y) - v).abs();
            assert!(d < 1e-7, "difference {} at ({}, {})", d, x, y);
        }
    }

    #[test]
    fn test_trait_matches_eval() {
        let n = Simplex2::new(11);
        assert_eq!(n.sample(0.3, 0.7), n.eval(0.3, 0.7));
    }

    #[test]
    fn test_known_values() {
        let n = Simplex2::new(123);
        let cases = [
            ((0.3, 0.7), 0.37113052376980776),
            ((12.25, -3.5), -0.3819439513123455),
            ((1.7, 2.9), -0.4640670184847919),
        ];
        for ((x, y), expected) in cases {
            let v = n.eval(x, y);
            assert!((v - expected).abs() < 1e-12, "({}, {}): {} vs {}", x, y, v, expected);
        }
    }

    #[test]
    fn test_huge_coordinates_stay_finite() {
        let n = Simplex2::new(123);
        for &(x, y) in &[
            (1e30, 1e30),
            (-1e30, 1e30),
            (1e30, -7.5),
            (f64::MAX, f64::MIN),
            (9.2e18, -9.2e18),
        ] {
            assert!(n.eval(x, y).is_finite(), "({}, {})", x, y);
        }
    }
}
