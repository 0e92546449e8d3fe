//! Three-dimensional OpenSimplex-style gradient noise.
//!
//! Shares the permutation table with the 2D evaluator. Its main use here is
//! [`SliceNoise`], which views a fixed-depth slice of the 3D field as a 2D
//! field so one seed can provide several decorrelated layers.

use super::permutation::{lattice_base, PermutationTable};
use super::Noise2D;

/// `(1 / sqrt(4) - 1) / 3`
const STRETCH: f64 = -1.0 / 6.0;
/// `(sqrt(4) - 1) / 3`
const SQUISH: f64 = 1.0 / 3.0;
const NORM: f64 = 1.0 / 103.0;

/// 24 gradients, flattened as `(x, y, z)` triples.
#[rustfmt::skip]
const GRADIENTS: [f64; 72] = [
    -11.0,  4.0,  4.0,   -4.0,  11.0,  4.0,   -4.0,  4.0,  11.0,
     11.0,  4.0,  4.0,    4.0,  11.0,  4.0,    4.0,  4.0,  11.0,
    -11.0, -4.0,  4.0,   -4.0, -11.0,  4.0,   -4.0, -4.0,  11.0,
     11.0, -4.0,  4.0,    4.0, -11.0,  4.0,    4.0, -4.0,  11.0,
    -11.0,  4.0, -4.0,   -4.0,  11.0, -4.0,   -4.0,  4.0, -11.0,
     11.0,  4.0, -4.0,    4.0,  11.0, -4.0,    4.0,  4.0, -11.0,
    -11.0, -4.0, -4.0,   -4.0, -11.0, -4.0,   -4.0, -4.0, -11.0,
     11.0, -4.0, -4.0,    4.0, -11.0, -4.0,    4.0, -4.0, -11.0,
];

type RawCorner = (i8, i8, i8, i8);

const BASE_0: &[RawCorner] = &[(0, 0, 0, 0), (1, 1, 0, 0), (1, 0, 1, 0), (1, 0, 0, 1)];
const BASE_1: &[RawCorner] = &[(2, 1, 1, 0), (2, 1, 0, 1), (2, 0, 1, 1), (3, 1, 1, 1)];
const BASE_2: &[RawCorner] = &[
    (1, 1, 0, 0),
    (1, 0, 1, 0),
    (1, 0, 0, 1),
    (2, 1, 1, 0),
    (2, 1, 0, 1),
    (2, 0, 1, 1),
];
const BASES: [&[RawCorner]; 3] = [BASE_0, BASE_1, BASE_2];

/// Contribution sets: base index plus two extra corners.
#[rustfmt::skip]
const SETS: [(usize, RawCorner, RawCorner); 24] = [
    (0, (0, 1, -1, 0), (0, 1, 0, -1)),
    (0, (0, -1, 1, 0), (0, 0, 1, -1)),
    (0, (0, -1, 0, 1), (0, 0, -1, 1)),
    (0, (2, 1, 1, 0), (1, 1, 1, -1)),
    (0, (2, 1, 0, 1), (1, 1, -1, 1)),
    (0, (2, 0, 1, 1), (1, -1, 1, 1)),
    (1, (3, 2, 1, 0), (3, 1, 2, 0)),
    (1, (3, 2, 0, 1), (3, 1, 0, 2)),
    (1, (3, 0, 2, 1), (3, 0, 1, 2)),
    (1, (1, 1, 0, 0), (2, 2, 0, 0)),
    (1, (1, 0, 1, 0), (2, 0, 2, 0)),
    (1, (1, 0, 0, 1), (2, 0, 0, 2)),
    (2, (0, 0, 0, 0), (1, 1, -1, 1)),
    (2, (0, 0, 0, 0), (1, -1, 1, 1)),
    (2, (0, 0, 0, 0), (1, 1, 1, -1)),
    (2, (3, 1, 1, 1), (2, 0, 0, 2)),
    (2, (3, 1, 1, 1), (2, 2, 0, 0)),
    (2, (3, 1, 1, 1), (2, 0, 2, 0)),
    (2, (1, 1, -1, 1), (2, 0, 0, 2)),
    (2, (1, 1, -1, 1), (2, 2, 0, 0)),
    (2, (1, -1, 1, 1), (2, 0, 0, 2)),
    (2, (1, -1, 1, 1), (2, 0, 2, 0)),
    (2, (1, 1, 1, -1), (2, 2, 0, 0)),
    (2, (1, 1, 1, -1), (2, 0, 2, 0)),
];

/// Sub-cell hash to contribution set.
#[rustfmt::skip]
const LOOKUP_PAIRS: [(usize, u8); 72] = [
    (0, 2), (1, 1), (2, 2), (5, 1), (6, 0), (7, 0),
    (32, 2), (34, 2), (129, 1), (133, 1), (160, 5), (161, 5),
    (518, 0), (519, 0), (546, 4), (550, 4), (645, 3), (647, 3),
    (672, 5), (673, 5), (674, 4), (677, 3), (678, 4), (679, 3),
    (680, 13), (681, 13), (682, 12), (685, 14), (686, 12), (687, 14),
    (712, 20), (714, 18), (809, 21), (813, 23), (840, 20), (841, 21),
    (1198, 19), (1199, 22), (1226, 18), (1230, 19), (1325, 23), (1327, 22),
    (1352, 15), (1353, 17), (1354, 15), (1357, 17), (1358, 16), (1359, 16),
    (1360, 11), (1361, 10), (1362, 11), (1365, 10), (1366, 9), (1367, 9),
    (1392, 11), (1394, 11), (1489, 10), (1493, 10), (1520, 8), (1521, 8),
    (1878, 9), (1879, 9), (1906, 7), (1910, 7), (2005, 6), (2007, 6),
    (2032, 8), (2033, 8), (2034, 7), (2037, 6), (2038, 7), (2039, 6),
];

const LOOKUP_SIZE: usize = 2048;
const NO_SET: u8 = u8::MAX;

#[derive(Debug, Clone, Copy)]
struct Corner {
    dx: f64,
    dy: f64,
    dz: f64,
    xsb: i64,
    ysb: i64,
    zsb: i64,
}

impl Corner {
    fn new((multiplier, xsb, ysb, zsb): RawCorner) -> Self {
        let m = multiplier as f64;
        Self {
            dx: -(xsb as f64) - m * SQUISH,
            dy: -(ysb as f64) - m * SQUISH,
            dz: -(zsb as f64) - m * SQUISH,
            xsb: xsb as i64,
            ysb: ysb as i64,
            zsb: zsb as i64,
        }
    }
}

/// Seeded, continuous 3D gradient noise.
#[derive(Debug, Clone)]
pub struct Simplex3 {
    table: PermutationTable,
    sets: Vec<Vec<Corner>>,
    lookup: Box<[u8]>,
}

impl Simplex3 {
    /// Builds the evaluator for `seed`.
    pub fn new(seed: i32) -> Self {
        Self::with_table(PermutationTable::new(seed))
    }

    /// Builds the evaluator around an existing permutation table.
    pub fn with_table(table: PermutationTable) -> Self {
        let sets: Vec<Vec<Corner>> = SETS
            .iter()
            .map(|&(base, a, b)| {
                BASES[base]
                    .iter()
                    .copied()
                    .chain([a, b])
                    .map(Corner::new)
                    .collect::<Vec<_>>()
            })
            .collect();

        let mut lookup = vec![NO_SET; LOOKUP_SIZE].into_boxed_slice();
        for (hash, set) in LOOKUP_PAIRS {
            lookup[hash] = set;
        }

        Self { table, sets, lookup }
    }

    /// Evaluates the noise field at `(x, y, z)`, approximately in [-1, 1].
    pub fn eval(&self, x: f64, y: f64, z: f64) -> f64 {
        let stretch = (x + y + z) * STRETCH;
        let xs = x + stretch;
        let ys = y + stretch;
        let zs = z + stretch;

        let xsb = xs.floor();
        let ysb = ys.floor();
        let zsb = zs.floor();

        let squish = (xsb + ysb + zsb) * SQUISH;
        let dx0 = x - (xsb + squish);
        let dy0 = y - (ysb + squish);
        let dz0 = z - (zsb + squish);

        let xins = xs - xsb;
        let yins = ys - ysb;
        let zins = zs - zsb;
        let in_sum = xins + yins + zins;

        let hash = (yins - zins + 1.0) as usize
            | (((xins - yins + 1.0) as usize) << 1)
            | (((xins - zins + 1.0) as usize) << 2)
            | ((in_sum as usize) << 3)
            | (((in_sum + zins) as usize) << 5)
            | (((in_sum + yins) as usize) << 7)
            | (((in_sum + xins) as usize) << 9);

        let set = match self.lookup.get(hash) {
            Some(&s) if s != NO_SET => &self.sets[s as usize],
            _ => return 0.0,
        };

        let xsb = lattice_base(xsb);
        let ysb = lattice_base(ysb);
        let zsb = lattice_base(zsb);
        let mut value = 0.0;

        for c in set {
            let dx = dx0 + c.dx;
            let dy = dy0 + c.dy;
            let dz = dz0 + c.dz;
            let attn = 2.0 - dx * dx - dy * dy - dz * dz;
            if attn > 0.0 {
                let a = self.table.perm_at(xsb + c.xsb) as i64;
                let b = self.table.perm_at(a + ysb + c.ysb) as i64;
                let index = self.table.grad3_at(b + zsb + c.zsb);
                let dot = GRADIENTS[index] * dx
                    + GRADIENTS[index + 1] * dy
                    + GRADIENTS[index + 2] * dz;
                let attn2 = attn * attn;
                value += attn2 * attn2 * dot;
            }
        }

        value * NORM
    }
}

/// A fixed-depth slice through a [`Simplex3`] field.
#[derive(Debug, Clone)]
pub struct SliceNoise {
    noise: Simplex3,
    z: f64,
}

impl SliceNoise {
    pub fn new(noise: Simplex3, z: f64) -> Self {
        Self { noise, z }
    }

    pub fn depth(&self) -> f64 {
        self.z
    }
}

impl Noise2D for SliceNoise {
    #[inline]
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.noise.eval(x, y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_set_is_reachable_from_lookup() {
        let mut used = [false; 24];
        for (_, set) in LOOKUP_PAIRS {
            used[set as usize] = true;
        }
        assert!(used.iter().all(|&u| u));
    }

    #[test]
    fn test_deterministic_and_bounded() {
        let a = Simplex3::new(55);
        let b = Simplex3::new(55);
        for i in 0..2000 {
            let x = i as f64 * 0.071;
            let y = (i % 37) as f64 * 0.13 - 2.0;
            let z = (i % 11) as f64 * 0.29;
            let v = a.eval(x, y, z);
            assert_eq!(v.to_bits(), b.eval(x, y, z).to_bits());
            assert!(v.abs() < 1.2, "value {} out of range", v);
        }
    }

    #[test]
    fn test_continuity() {
        let n = Simplex3::new(8);
        let eps = 1e-7;
        for i in 0..3000 {
            let x = i as f64 * 0.011 - 10.0;
            let y = (i % 53) as f64 * 0.2;
            let z = (i % 7) as f64 * 0.5;
            let v = n.eval(x, y, z);
            assert!((n.eval(x + eps, y, z) - v).abs() < 1e-4);
            assert!((n.eval(x, y, z + eps) - v).abs() < 1e-4);
        }
    }

    #[test]
    fn test_slices_are_decorrelated() {
        let a = SliceNoise::new(Simplex3::new(3), 0.25);
        let b = SliceNoise::new(Simplex3::new(3), 7.75);
        let differing = (0..100)
            .filter(|&i| {
                let x = i as f64 * 0.37;
                a.sample(x, 1.3) != b.sample(x, 1.3)
            })
            .count();
        assert!(differing > 90);
        assert_eq!(a.depth(), 0.25);
    }

    #[test]
    fn test_known_values() {
        // Reference values from the open-simplex-noise JS evaluator.
        let n = Simplex3::new(123);
        let cases = [
            ((0.3, 0.7, 0.1), -0.56536556540501),
            ((12.25, -3.5, 4.0), -0.4500805752948652),
            ((1.7, 2.9, -0.6), 0.09519987885285082),
        ];
        for ((x, y, z), expected) in cases {
            let v = n.eval(x, y, z);
            assert!((v - expected).abs() < 1e-12, "({}, {}, {}): {} vs {}", x, y, z, v, expected);
        }
    }

    #[test]
    fn test_huge_coordinates_stay_finite() {
        let n = Simplex3::new(123);
        assert!(n.eval(1e30, -1e30, 1e30).is_finite());
        assert!(n.eval(f64::MAX, 0.5, f64::MIN).is_finite());
        assert!(SliceNoise::new(n, 1e30).sample(3.0, 4.0).is_finite());
    }
}
