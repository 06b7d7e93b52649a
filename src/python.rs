use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::EngineConfig;
use crate::core::particle::DIM;
use crate::core::{Intent, Selection, Simulation, SystemId};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Which closed system a call addresses.
#[pyclass(name = "System", eq, eq_int)]
#[derive(Clone, Copy, PartialEq)]
pub enum PySystem {
    Top,
    Bottom,
    Both,
}

impl PySystem {
    fn selection(self) -> Selection {
        match self {
            PySystem::Top => Selection::Top,
            PySystem::Bottom => Selection::Bottom,
            PySystem::Both => Selection::Both,
        }
    }

    fn single(self) -> PyResult<SystemId> {
        match self {
            PySystem::Top => Ok(SystemId::Top),
            PySystem::Bottom => Ok(SystemId::Bottom),
            PySystem::Both => Err(py_err("expected System.Top or System.Bottom")),
        }
    }
}

/// GasSim: Python-facing wrapper around the two-system [`Simulation`].
///
/// A pygame (or any other) front end pushes intents as input arrives, calls
/// `frame()` once per rendered frame, and reads positions, colors and
/// metrics back as NumPy arrays.
#[pyclass]
pub struct GasSim {
    sim: Simulation,
    frame_dt: f64,
    default_count: usize,
}

#[pymethods]
impl GasSim {
    /// Parameters
    /// - config_path: optional YAML file overriding the default constants
    /// - seed: RNG seed (int) for reproducibility; None for nondeterministic
    ///
    /// Errors: raises ValueError on unreadable or invalid configuration.
    #[new]
    #[pyo3(signature = (config_path=None, seed=None))]
    fn new(config_path: Option<String>, seed: Option<u64>) -> PyResult<Self> {
        let mut config = match config_path {
            Some(path) => EngineConfig::from_yaml_file(path).map_err(py_err)?,
            None => EngineConfig::default(),
        };
        if seed.is_some() {
            config.seed = seed;
        }
        let sim = Simulation::new(&config).map_err(py_err)?;
        Ok(Self {
            sim,
            frame_dt: config.frame_dt(),
            default_count: config.default_particle_count,
        })
    }

    fn select(&mut self, system: PySystem) {
        self.sim.push(Intent::Select(system.selection()));
    }

    fn raise_temperature(&mut self) {
        self.sim.push(Intent::RaiseTemperature);
    }

    fn lower_temperature(&mut self) {
        self.sim.push(Intent::LowerTemperature);
    }

    fn set_temperature(&mut self, t: f64) {
        self.sim.push(Intent::SetTemperature(t));
    }

    fn adjust_volume(&mut self, delta: f64) {
        self.sim.push(Intent::AdjustVolume(delta));
    }

    /// Cap drag target, already resolved to an x-coordinate by the caller.
    fn set_cap_position(&mut self, x: f64) {
        self.sim.push(Intent::SetCapPosition(x));
    }

    #[pyo3(signature = (count=None))]
    fn add_particles(&mut self, count: Option<usize>) {
        self.sim
            .push(Intent::AddParticles(count.unwrap_or(self.default_count)));
    }

    fn toggle_pause(&mut self) {
        self.sim.push(Intent::TogglePause);
    }

    fn step_frame(&mut self) {
        self.sim.push(Intent::StepFrame);
    }

    #[getter]
    fn paused(&self) -> bool {
        self.sim.is_paused()
    }

    /// Apply queued intents and advance both systems (releases the GIL).
    /// `dt` defaults to one frame at the configured rate.
    #[pyo3(signature = (dt=None))]
    fn frame(&mut self, py: Python<'_>, dt: Option<f64>) -> PyResult<()> {
        let dt = dt.unwrap_or(self.frame_dt);
        if !dt.is_finite() || dt < 0.0 {
            return Err(py_err("dt must be a non-negative finite float"));
        }
        py.detach(|| self.sim.frame(dt)).map_err(py_err)
    }

    /// Positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(
        &self,
        py: Python<'py>,
        system: PySystem,
    ) -> PyResult<Bound<'py, PyArray2<f64>>> {
        let ensemble = self.sim.ensemble(system.single()?);
        let mut arr = Array2::<f64>::zeros((ensemble.num_particles(), DIM));
        for (i, view) in ensemble.render_state().enumerate() {
            for k in 0..DIM {
                arr[[i, k]] = view.position[k];
            }
        }
        Ok(arr.into_pyarray(py))
    }

    /// Colors as a NumPy array of shape (N, 3), dtype=uint8.
    fn get_colors<'py>(
        &self,
        py: Python<'py>,
        system: PySystem,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let ensemble = self.sim.ensemble(system.single()?);
        let mut arr = Array2::<u8>::zeros((ensemble.num_particles(), 3));
        for (i, view) in ensemble.render_state().enumerate() {
            for (k, c) in view.color.iter().enumerate() {
                arr[[i, k]] = *c;
            }
        }
        Ok(arr.into_pyarray(py))
    }

    /// Radii as a NumPy array of shape (N,), dtype=float64.
    fn get_radii<'py>(
        &self,
        py: Python<'py>,
        system: PySystem,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let ensemble = self.sim.ensemble(system.single()?);
        let radii: Array1<f64> = ensemble.render_state().map(|v| v.radius).collect();
        Ok(radii.into_pyarray(py))
    }

    /// Returns (volume, temperature, pressure, pressure_text).
    fn get_metrics(&self, system: PySystem) -> PyResult<(f64, f64, f64, String)> {
        let m = self.sim.ensemble(system.single()?).metrics();
        Ok((m.volume, m.temperature, m.pressure, m.pressure_display()))
    }

    /// Momentum handed to the walls during the last frame.
    fn get_wall_momentum(&self, system: PySystem) -> PyResult<f64> {
        Ok(self.sim.ensemble(system.single()?).last_wall_momentum())
    }

    /// Current cap x-coordinate, for drawing and hit-testing.
    fn get_cap_x(&self, system: PySystem) -> PyResult<f64> {
        Ok(self.sim.ensemble(system.single()?).container().cap_x())
    }
}

/// The idealgas Python module entry point.
#[pymodule]
fn idealgas(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<GasSim>()?;
    m.add_class::<PySystem>()?;
    Ok(())
}
