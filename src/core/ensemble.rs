use crate::config::EngineConfig;
use crate::core::collision::CollisionResolver;
use crate::core::container::Container;
use crate::core::particle::{Particle, Rgb, DIM};
use crate::core::velocity::VelocityInitializer;
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::fmt;
use tracing::{debug, trace, warn};

/// A queued change to the container volume, applied at the start of the next step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeRequest {
    /// Absolute volume.
    Set(f64),
    /// Relative change.
    Delta(f64),
    /// Target cap x-coordinate from a drag gesture.
    Pointer(f64),
}

/// What the renderer needs to draw one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub position: [f64; DIM],
    pub radius: f64,
    pub color: Rgb,
}

/// Aggregate state reported once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Volume rounded to two decimals.
    pub volume: f64,
    pub temperature: f64,
    pub pressure: f64,
}

impl Metrics {
    /// Pressure in scientific notation with two significant digits.
    pub fn pressure_display(&self) -> String {
        format!("{:.1e}", self.pressure)
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "V = {:.2} m, T = {:.0} K, P = {} Pa",
            self.volume,
            self.temperature,
            self.pressure_display()
        )
    }
}

/// One closed system: a container, its particles and their thermodynamic state.
///
/// All mutation goes through methods; the renderer reads between steps via
/// [`Ensemble::render_state`] and [`Ensemble::metrics`].
#[derive(Debug)]
pub struct Ensemble {
    container: Container,
    particles: Vec<Particle>,
    initializer: VelocityInitializer,
    resolver: CollisionResolver,
    temperature: f64,
    previous_temperature: f64,
    volume: f64,
    pressure: f64,
    last_wall_momentum: f64,
    pending_volume: Vec<VolumeRequest>,
    max_temperature: f64,
    avogadro: f64,
    gas_constant: f64,
    particle_mass: f64,
    particle_radius: f64,
    color_max_speed: f64,
    rng: StdRng,
}

impl Ensemble {
    /// Build an empty ensemble whose container is anchored at `anchor`.
    ///
    /// Errors: `Error::InvalidConfig` when `config` fails validation.
    pub fn new(anchor: [f64; 2], config: &EngineConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let container = Container::new(anchor, &config.container)?;
        let rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        let temperature = config.start_temperature.min(config.max_temperature);
        let mut ensemble = Self {
            volume: container.raw_volume(),
            container,
            particles: Vec::new(),
            initializer: VelocityInitializer::from_config(config)?,
            resolver: CollisionResolver,
            temperature,
            previous_temperature: temperature,
            pressure: 0.0,
            last_wall_momentum: 0.0,
            pending_volume: Vec::new(),
            max_temperature: config.max_temperature,
            avogadro: config.avogadro,
            gas_constant: config.gas_constant,
            particle_mass: config.particle_mass,
            particle_radius: config.particle_radius,
            color_max_speed: config.color_max_speed,
            rng,
        };
        ensemble.update_pressure();
        Ok(ensemble)
    }

    /// Append `count` particles at `spawn_point` with velocities sampled at
    /// the current temperature. Overlap at spawn is left to later steps.
    ///
    /// Errors: `Error::InvalidParam` for non-positive `mass` or `radius`, or
    /// a non-finite spawn point.
    pub fn add_particles(
        &mut self,
        count: usize,
        mass: f64,
        radius: f64,
        color: Option<Rgb>,
        spawn_point: [f64; DIM],
    ) -> Result<()> {
        let initializer = self
            .initializer
            .with_mass(mass)
            .map_err(|e| Error::InvalidParam(e.to_string()))?;
        let velocities = initializer.generate(self.temperature, count, &mut self.rng);
        let first_id = self.particles.len();
        self.particles.reserve(count);
        for (offset, v) in velocities.into_iter().enumerate() {
            let id = u32::try_from(first_id + offset)
                .map_err(|_| Error::InvalidParam("too many particles".into()))?;
            let mut p = Particle::new(id, spawn_point, v, radius, mass)?.with_tint(color);
            p.refresh_color(self.color_max_speed);
            self.particles.push(p);
        }
        debug!(
            count,
            total = self.particles.len(),
            temperature = self.temperature,
            "added particles"
        );
        Ok(())
    }

    /// Add `count` particles with the configured mass and radius at the
    /// center of the container.
    pub fn add_default_particles(&mut self, count: usize) -> Result<()> {
        let spawn = self.container.bounds().center();
        self.add_particles(count, self.particle_mass, self.particle_radius, None, spawn)
    }

    /// Clamp `t` to `[0, max_temperature]` and rescale every velocity to it.
    pub fn set_temperature(&mut self, t: f64) {
        if t.is_nan() {
            warn!("ignoring NaN temperature");
            return;
        }
        let clamped = t.clamp(0.0, self.max_temperature);
        if clamped != t {
            debug!(requested = t, clamped, "temperature clamped");
        }
        if clamped == self.temperature {
            return;
        }
        self.previous_temperature = self.temperature;
        self.temperature = clamped;
        self.rethermalize();
        debug!(
            from = self.previous_temperature,
            to = self.temperature,
            "temperature changed"
        );
    }

    /// Shift the temperature by `delta`; see [`Ensemble::set_temperature`].
    pub fn adjust_temperature(&mut self, delta: f64) {
        self.set_temperature(self.temperature + delta);
    }

    fn rethermalize(&mut self) {
        let mut velocities: Vec<[f64; DIM]> = self.particles.iter().map(|p| p.v).collect();
        self.initializer.rescale_for_temperature_change(
            self.previous_temperature,
            self.temperature,
            &mut velocities,
            &mut self.rng,
        );
        let resampled = self.previous_temperature <= 0.0;
        let shared_mass = self.initializer.mass();
        for (p, v) in self.particles.iter_mut().zip(velocities) {
            p.v = v;
            if resampled {
                // Freshly sampled at the shared mass; equipartition for tagged masses.
                let f = (shared_mass / p.mass).sqrt();
                p.v.iter_mut().for_each(|c| *c *= f);
            }
        }
    }

    /// Set the container volume immediately (clamped).
    pub fn set_volume(&mut self, volume: f64) {
        self.container.set_volume(volume);
        self.volume = self.container.raw_volume();
        self.update_pressure();
    }

    /// Queue an absolute volume for the next step.
    pub fn request_volume(&mut self, volume: f64) {
        self.pending_volume.push(VolumeRequest::Set(volume));
    }

    /// Queue a relative volume change for the next step.
    pub fn request_volume_delta(&mut self, delta: f64) {
        self.pending_volume.push(VolumeRequest::Delta(delta));
    }

    /// Queue a cap drag to coordinate `x` for the next step.
    pub fn request_cap_position(&mut self, x: f64) {
        self.pending_volume.push(VolumeRequest::Pointer(x));
    }

    /// Advance one frame. Returns the momentum transferred to the walls,
    /// which is kept for inspection but does not feed the pressure.
    pub fn step(&mut self, dt: f64, integrate_motion: bool) -> f64 {
        for request in self.pending_volume.drain(..) {
            match request {
                VolumeRequest::Set(v) => self.container.set_volume(v),
                VolumeRequest::Delta(dv) => self.container.adjust_volume(dv),
                VolumeRequest::Pointer(x) => self.container.adjust_volume_from_pointer(x),
            }
        }
        self.volume = self.container.raw_volume();

        let bounds = self.container.bounds();
        let momentum = self
            .resolver
            .step(&mut self.particles, &bounds, dt, integrate_motion);
        self.last_wall_momentum = momentum;

        self.update_pressure();
        for p in &mut self.particles {
            p.refresh_color(self.color_max_speed);
        }
        trace!(
            n = self.particles.len(),
            volume = self.volume,
            pressure = self.pressure,
            momentum,
            "ensemble step"
        );
        momentum
    }

    // Ideal gas: P = (n / N_A) R T / V
    fn update_pressure(&mut self) {
        self.pressure = if self.volume > 0.0 {
            (self.particles.len() as f64 / self.avogadro) * self.gas_constant * self.temperature
                / self.volume
        } else {
            0.0
        };
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            volume: self.container.volume(),
            temperature: self.temperature,
            pressure: self.pressure,
        }
    }

    pub fn render_state(&self) -> impl Iterator<Item = ParticleView> + '_ {
        self.particles.iter().map(|p| ParticleView {
            position: p.r,
            radius: p.radius,
            color: p.color,
        })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn previous_temperature(&self) -> f64 {
        self.previous_temperature
    }

    /// Unrounded volume as of the last step or immediate set.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn last_wall_momentum(&self) -> f64 {
        self.last_wall_momentum
    }

    /// Total kinetic energy in container units (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensemble(seed: u64) -> Result<Ensemble> {
        Ensemble::new([0.0, 0.0], &EngineConfig::default(), Some(seed))
    }

    #[test]
    fn pressure_follows_ideal_gas_law() -> Result<()> {
        let cfg = EngineConfig::default();
        let mut e = ensemble(1)?;
        e.add_default_particles(10)?;
        e.step(0.0, false);
        let expected = (10.0 / cfg.avogadro) * cfg.gas_constant * 300.0 / 1.0;
        assert!((e.pressure() - expected).abs() < 1e-12 * expected.abs());
        assert_eq!(e.metrics().pressure_display(), format!("{expected:.1e}"));
        Ok(())
    }

    #[test]
    fn temperature_is_clamped() -> Result<()> {
        let mut e = ensemble(2)?;
        e.set_temperature(5000.0);
        assert_eq!(e.temperature(), 1000.0);
        e.adjust_temperature(-2000.0);
        assert_eq!(e.temperature(), 0.0);
        assert_eq!(e.previous_temperature(), 1000.0);
        Ok(())
    }

    #[test]
    fn heating_scales_speeds_by_root_ratio() -> Result<()> {
        let mut e = ensemble(3)?;
        e.add_default_particles(6)?;
        let before: Vec<f64> = e.particles().iter().map(|p| p.speed()).collect();
        e.set_temperature(1200.0 / 2.0);
        for (p, s) in e.particles().iter().zip(&before) {
            assert!((p.speed() - s * 2.0_f64.sqrt()).abs() < 1e-9 * s.max(1.0));
        }
        Ok(())
    }

    #[test]
    fn pending_volume_applies_on_step() -> Result<()> {
        let mut e = ensemble(4)?;
        e.request_volume(2.0);
        assert_eq!(e.metrics().volume, 1.0);
        e.step(0.0, false);
        assert_eq!(e.metrics().volume, 2.0);
        e.request_volume_delta(0.5);
        e.request_volume_delta(5.0);
        e.step(0.0, false);
        assert_eq!(e.volume(), 3.0);
        Ok(())
    }

    #[test]
    fn tagged_mass_rejected_when_non_positive() -> Result<()> {
        let mut e = ensemble(5)?;
        assert!(e.add_particles(1, 0.0, 10.0, None, [100.0, 100.0]).is_err());
        assert!(e.add_particles(1, 1e-26, -1.0, None, [100.0, 100.0]).is_err());
        assert_eq!(e.num_particles(), 0);
        Ok(())
    }

    #[test]
    fn metrics_display() {
        let m = Metrics {
            volume: 1.5,
            temperature: 300.0,
            pressure: 4.14e-21,
        };
        assert_eq!(m.to_string(), "V = 1.50 m, T = 300 K, P = 4.1e-21 Pa");
    }
}
