use crate::config::EngineConfig;
use crate::core::particle::DIM;
use crate::error::{Error, Result};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::TAU;
use tracing::warn;

/// Maps a temperature to a set of 2-D velocities whose total kinetic energy
/// matches that temperature.
///
/// Speeds are drawn around `sqrt(3 k_B T / m)` with a 10% spread, directions
/// uniformly, and the set is then rescaled so the ensemble energy is exact.
/// The final damping factor converts physical speeds into container units per
/// second at the configured frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityInitializer {
    boltzmann: f64,
    mass: f64,
    damping: f64,
}

impl VelocityInitializer {
    /// Errors: `Error::InvalidConfig` if any argument is non-positive or non-finite.
    pub fn new(boltzmann: f64, mass: f64, damping: f64) -> Result<Self> {
        for (name, value) in [("boltzmann", boltzmann), ("mass", mass), ("damping", damping)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must be finite and > 0")));
            }
        }
        Ok(Self {
            boltzmann,
            mass,
            damping,
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.boltzmann, config.particle_mass, config.velocity_damping)
    }

    /// Same constants, different particle mass.
    pub fn with_mass(&self, mass: f64) -> Result<Self> {
        Self::new(self.boltzmann, mass, self.damping)
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Root-mean-square speed `sqrt(3 k_B T / m)`; zero for `T <= 0`.
    pub fn avg_speed(&self, temperature: f64) -> f64 {
        if temperature.is_nan() || temperature <= 0.0 {
            return 0.0;
        }
        (3.0 * self.boltzmann * temperature / self.mass).sqrt()
    }

    /// Undamped velocities with total kinetic energy `count * 1/2 m avg_speed^2`.
    pub fn thermal_velocities<R: Rng + ?Sized>(
        &self,
        temperature: f64,
        count: usize,
        rng: &mut R,
    ) -> Vec<[f64; DIM]> {
        let zeros = vec![[0.0; DIM]; count];
        let avg_speed = self.avg_speed(temperature);
        if count == 0 || avg_speed == 0.0 {
            return zeros;
        }
        let normal = match Normal::new(avg_speed, 0.1 * avg_speed) {
            Ok(n) => n,
            Err(e) => {
                warn!(temperature, avg_speed, error = %e, "speed distribution unavailable");
                return zeros;
            }
        };

        // Raw speeds may come out negative; only the energy after scaling matters.
        let mut velocities: Vec<[f64; DIM]> = (0..count)
            .map(|_| {
                let speed = normal.sample(rng);
                let angle = rng.random_range(0.0..TAU);
                [speed * angle.cos(), speed * angle.sin()]
            })
            .collect();

        let current: f64 = velocities
            .iter()
            .map(|v| 0.5 * self.mass * (v[0] * v[0] + v[1] * v[1]))
            .sum();
        let target = count as f64 * 0.5 * self.mass * avg_speed * avg_speed;
        if !current.is_finite() || current <= 0.0 {
            return zeros;
        }
        let scale = (target / current).sqrt();
        for v in &mut velocities {
            v.iter_mut().for_each(|c| *c *= scale);
        }
        velocities
    }

    /// Velocities for `count` particles at `temperature`, damped into
    /// container units.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        temperature: f64,
        count: usize,
        rng: &mut R,
    ) -> Vec<[f64; DIM]> {
        let mut velocities = self.thermal_velocities(temperature, count, rng);
        for v in &mut velocities {
            v.iter_mut().for_each(|c| *c *= self.damping);
        }
        velocities
    }

    /// Bring `velocities` from `old_temp` to `new_temp`.
    ///
    /// From zero there is no direction to scale, so the set is resampled;
    /// otherwise every vector is scaled by `sqrt(new/old)`, which keeps the
    /// angular distribution.
    pub fn rescale_for_temperature_change<R: Rng + ?Sized>(
        &self,
        old_temp: f64,
        new_temp: f64,
        velocities: &mut [[f64; DIM]],
        rng: &mut R,
    ) {
        if old_temp <= 0.0 {
            let fresh = self.generate(new_temp, velocities.len(), rng);
            velocities.copy_from_slice(&fresh);
            return;
        }
        let factor = (new_temp.max(0.0) / old_temp).sqrt();
        for v in velocities.iter_mut() {
            v.iter_mut().for_each(|c| *c *= factor);
        }
    }
}
