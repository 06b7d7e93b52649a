use crate::error::{Error, Result};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// An 8-bit RGB color for drawing.
pub type Rgb = [u8; 3];

/// Color of a particle at rest.
pub const COLD_COLOR: Rgb = [0, 0, 180];
/// Color of a particle at or above the configured hot speed.
pub const HOT_COLOR: Rgb = [220, 30, 30];

/// Map a speed to a display color by linear interpolation between
/// [`COLD_COLOR`] and [`HOT_COLOR`], clamped outside `[0, max_speed]`.
pub fn color_for_speed(speed: f64, max_speed: f64) -> Rgb {
    let t = if max_speed > 0.0 && speed.is_finite() {
        (speed / max_speed).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut out = [0u8; 3];
    for ((o, &c), &h) in out.iter_mut().zip(COLD_COLOR.iter()).zip(HOT_COLOR.iter()) {
        let v = f64::from(c) + (f64::from(h) - f64::from(c)) * t;
        *o = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// A rigid disk in D=2.
///
/// Fields:
/// - `id`: creation index within its ensemble
/// - `r`: position [x, y] in container coordinates
/// - `v`: velocity [vx, vy] in container units per second
/// - `radius`, `mass`: fixed at creation (> 0)
/// - `tint`: fixed display color; `None` means the color follows speed
/// - `color`: current display color
#[derive(Debug, Clone)]
pub struct Particle {
    /// Creation index.
    pub id: u32,
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
    /// Disk radius (> 0).
    pub radius: f64,
    /// Mass (> 0).
    pub mass: f64,
    /// Fixed color tag, overriding the speed gradient.
    pub tint: Option<Rgb>,
    /// Display color as of the last refresh.
    pub color: Rgb,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` or `mass` is non-positive or any component is NaN/inf.
    pub fn new(id: u32, r: [f64; DIM], v: [f64; DIM], radius: f64, mass: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            id,
            r,
            v,
            radius,
            mass,
            tint: None,
            color: COLD_COLOR,
        })
    }

    /// Tag the particle with a fixed display color.
    pub fn with_tint(mut self, tint: Option<Rgb>) -> Self {
        self.tint = tint;
        if let Some(c) = tint {
            self.color = c;
        }
        self
    }

    /// Speed |v|.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.v.iter().map(|&c| c * c).sum::<f64>().sqrt()
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let vsq: f64 = self.v.iter().map(|&c| c * c).sum();
        0.5 * self.mass * vsq
    }

    /// Recompute `color` from the current speed unless the particle is tinted.
    pub fn refresh_color(&mut self, max_speed: f64) {
        self.color = match self.tint {
            Some(c) => c,
            None => color_for_speed(self.speed(), max_speed),
        };
    }
}
