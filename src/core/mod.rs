//! Particle ensemble physics engine.
//!
//! Leaves first: [`particle`] holds per-disk state, [`container`] turns a
//! volume into bounds, [`velocity`] maps temperatures to velocities,
//! [`collision`] resolves one fixed step, [`ensemble`] ties them into one
//! closed system and [`simulation`] routes user intents to two of them.

pub mod collision;
pub mod container;
pub mod ensemble;
pub mod particle;
pub mod simulation;
pub mod velocity;

pub use collision::CollisionResolver;
pub use container::{Bounds, Container};
pub use ensemble::{Ensemble, Metrics, ParticleView, VolumeRequest};
pub use particle::{color_for_speed, Particle, Rgb};
pub use simulation::{Intent, Selection, Simulation, SystemId};
pub use velocity::VelocityInitializer;
