//! Headless runner: drives the two closed systems for a fixed number of
//! frames without a display and logs their metrics.

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use idealgas::{EngineConfig, Intent, Selection, Simulation, SystemId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Target {
    Top,
    Bottom,
    Both,
}

impl From<Target> for Selection {
    fn from(t: Target) -> Self {
        match t {
            Target::Top => Selection::Top,
            Target::Bottom => Selection::Bottom,
            Target::Both => Selection::Both,
        }
    }
}

/// Run the ideal gas ensembles headless and report volume, temperature and pressure.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML configuration file; defaults are used for anything it omits
    #[arg(short, long)]
    config: Option<String>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Particles to add to the selected systems (defaults to the configured count)
    #[arg(short, long)]
    particles: Option<usize>,

    /// Systems that receive the temperature/volume/particle requests
    #[arg(short, long, value_enum, default_value_t = Target::Both)]
    system: Target,

    /// Target temperature applied after the particles are added
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Volume change applied on the first frame
    #[arg(long, allow_negative_numbers = true)]
    volume_delta: Option<f64>,

    /// RNG seed overriding the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Log metrics every N frames
    #[arg(long, default_value_t = 60)]
    report_every: u64,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => {
            info!("Reading configuration from: {}", path);
            EngineConfig::from_yaml_file(path)
                .wrap_err_with(|| format!("Unable to load configuration: {path}"))?
        }
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut sim = Simulation::new(&config).wrap_err("Invalid engine configuration")?;
    sim.push(Intent::Select(args.system.into()));
    sim.push(Intent::AddParticles(
        args.particles.unwrap_or(config.default_particle_count),
    ));
    if let Some(t) = args.temperature {
        sim.push(Intent::SetTemperature(t));
    }
    if let Some(dv) = args.volume_delta {
        sim.push(Intent::AdjustVolume(dv));
    }

    let dt = config.frame_dt();
    let every = args.report_every.max(1);
    for frame in 1..=args.frames {
        sim.frame(dt).wrap_err_with(|| format!("frame {frame} failed"))?;
        if frame % every == 0 || frame == args.frames {
            for id in SystemId::ALL {
                let e = sim.ensemble(id);
                info!(
                    frame,
                    system = ?id,
                    particles = e.num_particles(),
                    wall_momentum = e.last_wall_momentum(),
                    "{}",
                    e.metrics()
                );
            }
        }
    }
    Ok(())
}
