//! Closed-system ideal gas: elastic hard disks in a container with a sliding cap.
//!
//! The engine is driven one frame at a time. A front end pushes user intents
//! (temperature, volume, pause, particle count) into a [`Simulation`] and
//! reads particle positions, colors and the volume/temperature/pressure
//! metrics back between frames. With the `python` feature the same surface
//! is exported to Python as `idealgas.GasSim`.

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use crate::config::EngineConfig;
pub use crate::core::{Ensemble, Intent, Selection, Simulation, SystemId};
pub use crate::error::{Error, Result};
