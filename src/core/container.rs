use crate::config::ContainerConfig;
use crate::error::Result;
use tracing::debug;

/// The live rectangle particles may occupy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Bounds {
    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Geometric center.
    pub fn center(&self) -> [f64; 2] {
        [
            0.5 * (self.left + self.right),
            0.5 * (self.top + self.bottom),
        ]
    }
}

/// Rectangular container whose right-hand cap slides between `min_volume`
/// and `max_volume`.
///
/// Volume is the horizontal extent of the gas region in abstract meters and
/// maps linearly onto coordinates through `pixel_ratio = width / max_volume`.
#[derive(Debug, Clone)]
pub struct Container {
    position: [f64; 2],
    width: f64,
    height: f64,
    volume: f64,
    min_volume: f64,
    max_volume: f64,
    pixel_ratio: f64,
}

impl Container {
    /// Build a container anchored at `position` (top-left corner).
    ///
    /// Errors:
    /// - `Error::InvalidConfig` for non-positive extents or `max_volume <= min_volume`.
    pub fn new(position: [f64; 2], config: &ContainerConfig) -> Result<Self> {
        config.validate()?;
        let mut container = Self {
            position,
            width: config.width,
            height: config.height,
            volume: config.min_volume,
            min_volume: config.min_volume,
            max_volume: config.max_volume,
            pixel_ratio: config.width / config.max_volume,
        };
        container.set_volume(config.start_volume);
        Ok(container)
    }

    /// Clamp `volume` to `[min_volume, max_volume]` and store it.
    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            debug!(volume, "ignoring non-finite volume");
            return;
        }
        let clamped = volume.clamp(self.min_volume, self.max_volume);
        if clamped != volume {
            debug!(requested = volume, clamped, "volume clamped to container range");
        }
        self.volume = clamped;
    }

    /// Shift the current volume by `delta`, clamping as [`Container::set_volume`].
    pub fn adjust_volume(&mut self, delta: f64) {
        self.set_volume(self.volume + delta);
    }

    /// Move the cap to the coordinate `pointer_x` (already resolved by the
    /// input layer from a drag gesture) and store the resulting volume.
    pub fn adjust_volume_from_pointer(&mut self, pointer_x: f64) {
        self.set_volume((pointer_x - self.position[0]) / self.pixel_ratio);
    }

    /// Current volume rounded to two decimals for display.
    pub fn volume(&self) -> f64 {
        (self.volume * 100.0).round() / 100.0
    }

    /// Unrounded volume; the value physics works with.
    #[inline]
    pub fn raw_volume(&self) -> f64 {
        self.volume
    }

    pub fn min_volume(&self) -> f64 {
        self.min_volume
    }

    pub fn max_volume(&self) -> f64 {
        self.max_volume
    }

    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    /// Current cap x-coordinate.
    pub fn cap_x(&self) -> f64 {
        let lo = self.position[0] + self.min_volume * self.pixel_ratio;
        let hi = self.position[0] + self.max_volume * self.pixel_ratio;
        (self.position[0] + self.volume * self.pixel_ratio).clamp(lo, hi)
    }

    /// Bounds for the current volume, computed fresh on every call.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            top: self.position[1],
            bottom: self.position[1] + self.height,
            left: self.position[0],
            right: self.cap_x(),
        }
    }
}
