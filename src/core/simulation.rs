use crate::config::EngineConfig;
use crate::core::ensemble::Ensemble;
use crate::error::Result;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Identifies one of the two stacked closed systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemId {
    Top,
    Bottom,
}

impl SystemId {
    pub const ALL: [SystemId; 2] = [SystemId::Top, SystemId::Bottom];

    #[inline]
    fn index(self) -> usize {
        match self {
            SystemId::Top => 0,
            SystemId::Bottom => 1,
        }
    }
}

/// Which systems receive the user's intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    Top,
    Bottom,
    #[default]
    Both,
}

impl Selection {
    /// Systems addressed by this selection.
    pub fn targets(self) -> &'static [SystemId] {
        static TOP: [SystemId; 1] = [SystemId::Top];
        static BOTTOM: [SystemId; 1] = [SystemId::Bottom];
        match self {
            Selection::Top => &TOP,
            Selection::Bottom => &BOTTOM,
            Selection::Both => &SystemId::ALL,
        }
    }
}

/// A user request pushed by the input layer and applied at the next frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Select(Selection),
    /// Raise the temperature by the configured step.
    RaiseTemperature,
    /// Lower the temperature by the configured step.
    LowerTemperature,
    SetTemperature(f64),
    AdjustVolume(f64),
    /// Drag the cap to this x-coordinate.
    SetCapPosition(f64),
    AddParticles(usize),
    TogglePause,
    /// While paused, integrate motion for exactly one frame.
    StepFrame,
}

/// The two closed systems plus the routing of user intents between them.
///
/// The rendering layer calls [`Simulation::push`] as input arrives and
/// [`Simulation::frame`] once per rendered frame, then reads state through
/// [`Simulation::ensemble`].
#[derive(Debug)]
pub struct Simulation {
    ensembles: [Ensemble; 2],
    selection: Selection,
    paused: bool,
    step_once: bool,
    pending: VecDeque<Intent>,
    temperature_step: f64,
    frames: u64,
}

impl Simulation {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let seed_for = |offset: u64| config.seed.map(|s| s.wrapping_add(offset));
        let top = Ensemble::new(config.top_anchor, config, seed_for(0))?;
        let bottom = Ensemble::new(config.bottom_anchor, config, seed_for(1))?;
        info!(
            temperature = config.start_temperature,
            volume = config.container.start_volume,
            "simulation ready"
        );
        Ok(Self {
            ensembles: [top, bottom],
            selection: Selection::default(),
            paused: false,
            step_once: false,
            pending: VecDeque::new(),
            temperature_step: config.temperature_step,
            frames: 0,
        })
    }

    /// Queue an intent for the next frame.
    pub fn push(&mut self, intent: Intent) {
        self.pending.push_back(intent);
    }

    /// Apply queued intents in order, then step both systems by `dt`.
    ///
    /// Errors only if adding particles fails, which valid configuration rules out.
    pub fn frame(&mut self, dt: f64) -> Result<()> {
        while let Some(intent) = self.pending.pop_front() {
            self.apply(intent)?;
        }
        let integrate = !self.paused || self.step_once;
        self.step_once = false;
        for ensemble in &mut self.ensembles {
            ensemble.step(dt, integrate);
        }
        self.frames += 1;
        Ok(())
    }

    fn apply(&mut self, intent: Intent) -> Result<()> {
        debug!(?intent, selection = ?self.selection, "applying intent");
        match intent {
            Intent::Select(selection) => self.selection = selection,
            Intent::TogglePause => self.paused = !self.paused,
            Intent::StepFrame => self.step_once = true,
            other => {
                let step = self.temperature_step;
                for &id in self.selection.targets() {
                    let ensemble = &mut self.ensembles[id.index()];
                    match other {
                        Intent::RaiseTemperature => ensemble.adjust_temperature(step),
                        Intent::LowerTemperature => ensemble.adjust_temperature(-step),
                        Intent::SetTemperature(t) => ensemble.set_temperature(t),
                        Intent::AdjustVolume(dv) => ensemble.request_volume_delta(dv),
                        Intent::SetCapPosition(x) => ensemble.request_cap_position(x),
                        Intent::AddParticles(n) => ensemble.add_default_particles(n)?,
                        Intent::Select(_) | Intent::TogglePause | Intent::StepFrame => {}
                    }
                }
            }
        }
        Ok(())
    }

    pub fn ensemble(&self, id: SystemId) -> &Ensemble {
        &self.ensembles[id.index()]
    }

    pub fn ensemble_mut(&mut self, id: SystemId) -> &mut Ensemble {
        &mut self.ensembles[id.index()]
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frames stepped so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}
