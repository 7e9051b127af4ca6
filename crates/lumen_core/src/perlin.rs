//! Perlin gradient noise.
//!
//! Tables are generated once from a caller-supplied rng and never mutated
//! afterwards, so one generator can be shared by every render thread.

use lumen_math::Vec3;
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::random::random_vec3;

const POINT_COUNT: usize = 256;

/// Default number of octaves summed by [`Perlin::turb`].
pub const DEFAULT_TURBULENCE_DEPTH: u32 = 7;

/// Perlin noise generator: random unit gradients plus three permutation tables.
#[derive(Debug, Clone)]
pub struct Perlin {
    gradients: Box<[Vec3; POINT_COUNT]>,
    perm_x: Box<[usize; POINT_COUNT]>,
    perm_y: Box<[usize; POINT_COUNT]>,
    perm_z: Box<[usize; POINT_COUNT]>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let mut gradients = Box::new([Vec3::ZERO; POINT_COUNT]);
        for g in gradients.iter_mut() {
            *g = random_vec3(rng, -1.0, 1.0).normalize();
        }

        Self {
            gradients,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Noise value at `p`, roughly in [-1, 1].
    pub fn noise(&self, p: Vec3) -> f64 {
        let floor = p.floor();
        let (u, v, w) = (p.x - floor.x, p.y - floor.y, p.z - floor.z);
        let (i, j, k) = (floor.x as i64, floor.y as i64, floor.z as i64);

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let index = self.perm_x[wrap(i + di as i64)]
                        ^ self.perm_y[wrap(j + dj as i64)]
                        ^ self.perm_z[wrap(k + dk as i64)];
                    *cell = self.gradients[index];
                }
            }
        }

        trilinear_interp(&c, u, v, w)
    }

    /// Turbulence: absolute sum of `depth` octaves with halving weights.
    pub fn turb(&self, p: Vec3, depth: u32) -> f64 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

/// Lattice coordinate to table index (two's complement wrap, like `& 255`).
#[inline]
fn wrap(n: i64) -> usize {
    (n & (POINT_COUNT as i64 - 1)) as usize
}

fn generate_perm(rng: &mut dyn RngCore) -> Box<[usize; POINT_COUNT]> {
    let mut perm = Box::new([0usize; POINT_COUNT]);
    for (i, p) in perm.iter_mut().enumerate() {
        *p = i;
    }
    perm.shuffle(rng);
    perm
}

/// Hermite-smoothed trilinear blend of the gradient dot products.
fn trilinear_interp(c: &[[[Vec3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
    let uu = u * u * (3.0 - 2.0 * u);
    let vv = v * v * (3.0 - 2.0 * v);
    let ww = w * w * (3.0 - 2.0 * w);

    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f64, j as f64, k as f64);
                let weight = Vec3::new(u - fi, v - fj, w - fk);
                accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                    * (fj * vv + (1.0 - fj) * (1.0 - vv))
                    * (fk * ww + (1.0 - fk) * (1.0 - ww))
                    * gradient.dot(weight);
            }
        }
    }

    accum
}
