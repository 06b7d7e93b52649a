use crate::core::container::Bounds;
use crate::core::particle::{Particle, DIM};
use tracing::trace;

/// Fixed-step contact resolution for equal disks in an axis-aligned box.
///
/// One call to [`CollisionResolver::step`] drifts every particle, separates
/// and bounces every overlapping pair once, and then reflects particles off
/// the four walls. Pairs are resolved sequentially, so three mutually
/// overlapping disks may stay slightly overlapped for a frame; later steps
/// clear it. Detection is all-pairs, `O(n^2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Advance one step and return the total momentum handed to the walls.
    ///
    /// Never fails: coincident centers and non-positive masses are skipped.
    pub fn step(
        &self,
        particles: &mut [Particle],
        bounds: &Bounds,
        dt: f64,
        integrate_motion: bool,
    ) -> f64 {
        if integrate_motion && dt.is_finite() && dt > 0.0 {
            drift_all(particles, dt);
        }

        let n = particles.len();
        let mut contacts = 0usize;
        for i in 0..n {
            let (head, tail) = particles.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                if resolve_pair(a, b) {
                    contacts += 1;
                }
            }
        }

        let momentum = resolve_walls(particles, bounds);
        trace!(contacts, px = momentum[0], py = momentum[1], "collision pass");
        momentum.iter().sum()
    }
}

/// Linear drift `r += v dt`.
fn drift_all(particles: &mut [Particle], dt: f64) {
    for p in particles {
        for k in 0..DIM {
            p.r[k] += p.v[k] * dt;
        }
    }
}

/// Separate an overlapping pair to exact tangency and apply the elastic
/// impulse along the center line. Returns whether the pair was in contact.
pub fn resolve_pair(a: &mut Particle, b: &mut Particle) -> bool {
    // Unit normal from a -> b
    let mut n = [0.0_f64; DIM];
    for ((nk, &rb), &ra) in n.iter_mut().zip(b.r.iter()).zip(a.r.iter()) {
        *nk = rb - ra;
    }
    let dist = dot(&n, &n).sqrt();
    let r_sum = a.radius + b.radius;
    // Coincident centers have no normal; leave them for a later step.
    if !(dist > 0.0 && dist < r_sum) {
        return false;
    }
    for nk in &mut n {
        *nk /= dist;
    }

    let half_overlap = 0.5 * (r_sum - dist);
    for (k, &nk) in n.iter().enumerate() {
        a.r[k] -= half_overlap * nk;
        b.r[k] += half_overlap * nk;
    }

    let inv_mass_sum = 1.0 / a.mass + 1.0 / b.mass;
    if !(inv_mass_sum.is_finite() && inv_mass_sum > 0.0) || a.mass <= 0.0 || b.mass <= 0.0 {
        return true;
    }

    let mut u = [0.0_f64; DIM];
    for ((uk, &vb), &va) in u.iter_mut().zip(b.v.iter()).zip(a.v.iter()) {
        *uk = vb - va;
    }
    let u_n = dot(&u, &n);
    // Already separating: the positional fix is enough.
    if u_n >= 0.0 {
        return true;
    }

    // Restitution 1
    let j = -2.0 * u_n / inv_mass_sum;
    for (k, &nk) in n.iter().enumerate() {
        a.v[k] -= j * nk / a.mass;
        b.v[k] += j * nk / b.mass;
    }
    true
}

/// Clamp every particle inside `bounds` and reflect outward-moving
/// components. Returns the momentum transferred per axis, `2 m |v_k|` per
/// reflection.
pub fn resolve_walls(particles: &mut [Particle], bounds: &Bounds) -> [f64; DIM] {
    let lows = [bounds.left, bounds.top];
    let highs = [bounds.right, bounds.bottom];
    let mut momentum = [0.0_f64; DIM];
    for p in particles.iter_mut() {
        for k in 0..DIM {
            let lo = lows[k] + p.radius;
            let hi = highs[k] - p.radius;
            if p.r[k] < lo {
                p.r[k] = lo;
                if p.v[k] < 0.0 {
                    momentum[k] += 2.0 * p.mass * p.v[k].abs();
                    p.v[k] = -p.v[k];
                }
            } else if p.r[k] > hi {
                p.r[k] = hi;
                if p.v[k] > 0.0 {
                    momentum[k] += 2.0 * p.mass * p.v[k].abs();
                    p.v[k] = -p.v[k];
                }
            }
        }
    }
    momentum
}

#[inline]
fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
