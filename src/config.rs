//! Engine configuration.
//!
//! Physical constants, particle defaults and container geometry are handed to
//! the engine from outside rather than derived. Every field has a default, so
//! a YAML file only needs to name what it overrides:
//!
//! ```yaml
//! start_temperature: 450.0
//! container:
//!   min_volume: 0.75
//! seed: 42
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Geometry of one container: anchor, extents and the volume range of its cap.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub width: f64,
    pub height: f64,
    pub start_volume: f64,
    pub min_volume: f64,
    pub max_volume: f64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 300.0,
            start_volume: 1.0,
            min_volume: 0.5,
            max_volume: 3.0,
        }
    }
}

impl ContainerConfig {
    /// Check the geometry on its own (no particle size involved).
    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(Error::InvalidConfig("container width must be finite and > 0".into()));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(Error::InvalidConfig("container height must be finite and > 0".into()));
        }
        if !self.min_volume.is_finite() || self.min_volume < 0.0 {
            return Err(Error::InvalidConfig("min_volume must be finite and >= 0".into()));
        }
        if !self.max_volume.is_finite() || self.max_volume <= self.min_volume {
            return Err(Error::InvalidConfig(format!(
                "max_volume ({}) must exceed min_volume ({})",
                self.max_volume, self.min_volume
            )));
        }
        if !self.start_volume.is_finite() {
            return Err(Error::InvalidConfig("start_volume must be finite".into()));
        }
        Ok(())
    }
}

/// Externally configured constants for the whole engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Boltzmann constant (J/K).
    pub boltzmann: f64,
    /// Avogadro constant (1/mol).
    pub avogadro: f64,
    /// Ideal gas constant (J/(mol K)).
    pub gas_constant: f64,
    /// Shared particle mass used by the velocity sampler (kg).
    pub particle_mass: f64,
    /// Shared particle radius (container units).
    pub particle_radius: f64,
    pub max_temperature: f64,
    pub start_temperature: f64,
    /// Temperature change applied by one raise/lower intent.
    pub temperature_step: f64,
    pub target_fps: u32,
    /// Multiplier from physical speeds (m/s) to container units per second,
    /// tuned against `target_fps`.
    pub velocity_damping: f64,
    /// Speed (container units per second) rendered with the fully hot color.
    pub color_max_speed: f64,
    /// Particles added by one "add particles" intent.
    pub default_particle_count: usize,
    pub container: ContainerConfig,
    /// Top-left anchor of the top container.
    pub top_anchor: [f64; 2],
    /// Top-left anchor of the bottom container.
    pub bottom_anchor: [f64; 2],
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            boltzmann: 1.380649e-23,
            avogadro: 6.02214076e23,
            gas_constant: 8.314462618,
            particle_mass: 1e-26,
            particle_radius: 10.0,
            max_temperature: 1000.0,
            start_temperature: 300.0,
            temperature_step: 10.0,
            target_fps: 60,
            velocity_damping: 0.1,
            color_max_speed: 250.0,
            default_particle_count: 10,
            container: ContainerConfig::default(),
            top_anchor: [200.0, 50.0],
            bottom_anchor: [200.0, 400.0],
            seed: None,
        }
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidConfig(format!("{name} must be finite and > 0")));
    }
    Ok(())
}

impl EngineConfig {
    /// Parse a YAML document; missing fields take their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Reject configurations that would yield degenerate bounds or particles.
    pub fn validate(&self) -> Result<()> {
        positive("boltzmann", self.boltzmann)?;
        positive("avogadro", self.avogadro)?;
        positive("gas_constant", self.gas_constant)?;
        positive("particle_mass", self.particle_mass)?;
        positive("particle_radius", self.particle_radius)?;
        positive("max_temperature", self.max_temperature)?;
        positive("temperature_step", self.temperature_step)?;
        positive("velocity_damping", self.velocity_damping)?;
        positive("color_max_speed", self.color_max_speed)?;
        if self.target_fps == 0 {
            return Err(Error::InvalidConfig("target_fps must be > 0".into()));
        }
        if !self.start_temperature.is_finite() || self.start_temperature < 0.0 {
            return Err(Error::InvalidConfig("start_temperature must be finite and >= 0".into()));
        }
        self.container.validate()?;

        // The narrowest and shortest container must still fit one particle.
        let diameter = 2.0 * self.particle_radius;
        let min_extent =
            self.container.min_volume * self.container.width / self.container.max_volume;
        if min_extent < diameter || self.container.height < diameter {
            return Err(Error::InvalidConfig(format!(
                "container at min_volume ({min_extent:.1} x {:.1}) cannot hold a particle of radius {}",
                self.container.height, self.particle_radius
            )));
        }
        if self.top_anchor.iter().chain(&self.bottom_anchor).any(|c| !c.is_finite()) {
            return Err(Error::InvalidConfig("container anchors must be finite".into()));
        }
        Ok(())
    }

    /// Nominal frame duration in seconds.
    pub fn frame_dt(&self) -> f64 {
        1.0 / f64::from(self.target_fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        EngineConfig::default().validate()
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let cfg = EngineConfig::from_yaml_str("start_temperature: 450.0\ncontainer:\n  min_volume: 0.75\n")?;
        assert_eq!(cfg.start_temperature, 450.0);
        assert_eq!(cfg.container.min_volume, 0.75);
        assert_eq!(cfg.container.max_volume, 3.0);
        assert_eq!(cfg.particle_radius, 10.0);
        Ok(())
    }

    #[test]
    fn inverted_volume_range_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.container.min_volume = 3.0;
        cfg.container.max_volume = 3.0;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("max_volume"));
    }

    #[test]
    fn non_positive_mass_rejected() {
        let cfg = EngineConfig {
            particle_mass: 0.0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().unwrap_err().to_string().contains("particle_mass"));
    }

    #[test]
    fn container_too_narrow_for_particle_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.container.min_volume = 0.01;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(EngineConfig::from_yaml_str("particle_mass: [1, 2").is_err());
    }
}
