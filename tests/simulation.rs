use idealgas::error::Result;
use idealgas::{EngineConfig, Intent, Selection, Simulation, SystemId};

fn sim(seed: u64) -> Result<Simulation> {
    let cfg = EngineConfig {
        seed: Some(seed),
        ..EngineConfig::default()
    };
    Simulation::new(&cfg)
}

fn positions(sim: &Simulation, id: SystemId) -> Vec<[f64; 2]> {
    sim.ensemble(id).render_state().map(|v| v.position).collect()
}

#[test]
fn intents_reach_only_the_selected_systems() -> Result<()> {
    let mut s = sim(1)?;
    s.push(Intent::Select(Selection::Top));
    s.push(Intent::AddParticles(3));
    s.push(Intent::RaiseTemperature);
    s.frame(1.0 / 60.0)?;
    assert_eq!(s.selection(), Selection::Top);
    assert_eq!(s.ensemble(SystemId::Top).num_particles(), 3);
    assert_eq!(s.ensemble(SystemId::Bottom).num_particles(), 0);
    assert_eq!(s.ensemble(SystemId::Top).temperature(), 310.0);
    assert_eq!(s.ensemble(SystemId::Bottom).temperature(), 300.0);

    s.push(Intent::Select(Selection::Both));
    s.push(Intent::AddParticles(2));
    s.push(Intent::Select(Selection::Bottom));
    s.push(Intent::AdjustVolume(1.0));
    s.frame(1.0 / 60.0)?;
    assert_eq!(s.ensemble(SystemId::Top).num_particles(), 5);
    assert_eq!(s.ensemble(SystemId::Bottom).num_particles(), 2);
    assert_eq!(s.ensemble(SystemId::Top).metrics().volume, 1.0);
    assert_eq!(s.ensemble(SystemId::Bottom).metrics().volume, 2.0);
    Ok(())
}

#[test]
fn cap_drag_sets_volume_from_coordinate() -> Result<()> {
    let cfg = EngineConfig::default();
    let mut s = Simulation::new(&cfg)?;
    // Top anchor x = 200, pixel ratio = 800 / 3
    s.push(Intent::SetCapPosition(200.0 + 2.5 * 800.0 / 3.0));
    s.frame(cfg.frame_dt())?;
    for id in SystemId::ALL {
        let m = s.ensemble(id).metrics();
        if id == SystemId::Top {
            assert_eq!(m.volume, 2.5);
        }
        assert!(m.volume >= 0.5 && m.volume <= 3.0);
    }
    Ok(())
}

#[test]
fn pause_freezes_motion_and_step_frame_advances_once() -> Result<()> {
    let mut s = sim(2)?;
    s.push(Intent::AddParticles(1));
    s.frame(1.0 / 60.0)?;
    s.frame(1.0 / 60.0)?;

    s.push(Intent::TogglePause);
    s.frame(1.0 / 60.0)?;
    assert!(s.is_paused());
    let frozen = positions(&s, SystemId::Top);
    s.frame(1.0 / 60.0)?;
    assert_eq!(positions(&s, SystemId::Top), frozen);

    s.push(Intent::StepFrame);
    s.frame(1.0 / 60.0)?;
    let stepped = positions(&s, SystemId::Top);
    assert_ne!(stepped, frozen);
    s.frame(1.0 / 60.0)?;
    assert_eq!(positions(&s, SystemId::Top), stepped);

    s.push(Intent::TogglePause);
    s.frame(1.0 / 60.0)?;
    assert!(!s.is_paused());
    assert_ne!(positions(&s, SystemId::Top), stepped);
    assert_eq!(s.frame_count(), 7);
    Ok(())
}

#[test]
fn temperature_intents_are_clamped() -> Result<()> {
    let mut s = sim(3)?;
    s.push(Intent::SetTemperature(5.0));
    s.push(Intent::LowerTemperature);
    s.frame(0.0)?;
    assert_eq!(s.ensemble(SystemId::Top).temperature(), 0.0);
    s.push(Intent::SetTemperature(1e6));
    s.frame(0.0)?;
    assert_eq!(s.ensemble(SystemId::Bottom).temperature(), 1000.0);
    Ok(())
}

#[test]
fn same_seed_same_trajectory() -> Result<()> {
    let mut a = sim(77)?;
    let mut b = sim(77)?;
    for s in [&mut a, &mut b] {
        s.push(Intent::AddParticles(6));
        for _ in 0..120 {
            s.frame(1.0 / 60.0)?;
        }
    }
    assert_eq!(positions(&a, SystemId::Bottom), positions(&b, SystemId::Bottom));
    Ok(())
}

#[test]
fn shipped_config_loads_and_runs() -> Result<()> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/default.yaml");
    let cfg = EngineConfig::from_yaml_file(path)?;
    assert_eq!(cfg, EngineConfig::default());
    let mut s = Simulation::new(&cfg)?;
    s.push(Intent::AddParticles(cfg.default_particle_count));
    s.frame(cfg.frame_dt())?;
    assert_eq!(s.ensemble(SystemId::Top).num_particles(), 10);
    Ok(())
}
