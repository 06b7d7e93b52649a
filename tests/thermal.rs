use idealgas::core::VelocityInitializer;
use idealgas::error::Result;
use idealgas::{EngineConfig, Ensemble};
use rand::rngs::StdRng;
use rand::SeedableRng;

const K_B: f64 = 1.380649e-23;
const MASS: f64 = 1e-26;

fn energy(velocities: &[[f64; 2]], mass: f64) -> f64 {
    velocities
        .iter()
        .map(|v| 0.5 * mass * (v[0] * v[0] + v[1] * v[1]))
        .sum()
}

/// The sampled set carries exactly the kinetic energy of n particles at T.
#[test]
fn sampled_energy_matches_temperature() -> Result<()> {
    let init = VelocityInitializer::new(K_B, MASS, 0.1)?;
    let mut rng = StdRng::seed_from_u64(2024);
    for &(t, n) in &[(1.0, 1usize), (300.0, 10), (999.5, 57), (42.0, 400)] {
        let v = init.thermal_velocities(t, n, &mut rng);
        assert_eq!(v.len(), n);
        let expected = n as f64 * 0.5 * MASS * (3.0 * K_B * t / MASS);
        let got = energy(&v, MASS);
        assert!(
            ((got - expected) / expected).abs() < 1e-9,
            "T={t}, n={n}: E={got}, expected {expected}"
        );
    }
    Ok(())
}

/// Damping scales the energy by its square.
#[test]
fn damped_energy_is_scaled_by_damping_squared() -> Result<()> {
    let init = VelocityInitializer::new(K_B, MASS, 0.1)?;
    let mut rng = StdRng::seed_from_u64(7);
    let v = init.generate(300.0, 25, &mut rng);
    let expected = 25.0 * 1.5 * K_B * 300.0 * 0.01;
    assert!(((energy(&v, MASS) - expected) / expected).abs() < 1e-9);
    Ok(())
}

#[test]
fn zero_temperature_is_at_rest() -> Result<()> {
    let init = VelocityInitializer::new(K_B, MASS, 0.1)?;
    let v = init.generate(0.0, 12, &mut StdRng::seed_from_u64(1));
    assert!(v.iter().all(|c| c[0] == 0.0 && c[1] == 0.0));
    Ok(())
}

/// Heating then cooling back restores the original velocities.
#[test]
fn temperature_round_trip_restores_velocities() -> Result<()> {
    let init = VelocityInitializer::new(K_B, MASS, 0.1)?;
    let mut rng = StdRng::seed_from_u64(99);
    let original = init.generate(300.0, 16, &mut rng);
    let mut v = original.clone();
    init.rescale_for_temperature_change(300.0, 870.0, &mut v, &mut rng);
    init.rescale_for_temperature_change(870.0, 300.0, &mut v, &mut rng);
    for (a, b) in v.iter().zip(&original) {
        for k in 0..2 {
            assert!((a[k] - b[k]).abs() <= 1e-12 * b[k].abs().max(1.0));
        }
    }
    Ok(())
}

/// Cooling a populated ensemble to zero freezes it; a paused step then moves nothing.
#[test]
fn frozen_paused_ensemble_does_not_move() -> Result<()> {
    let cfg = EngineConfig::default();
    let mut e = Ensemble::new([200.0, 50.0], &cfg, Some(11))?;
    e.add_default_particles(8)?;
    e.set_temperature(0.0);
    assert!(e.particles().iter().all(|p| p.v == [0.0, 0.0]));
    let before: Vec<[f64; 2]> = e.particles().iter().map(|p| p.r).collect();
    e.step(cfg.frame_dt(), false);
    let after: Vec<[f64; 2]> = e.particles().iter().map(|p| p.r).collect();
    assert_eq!(before, after);
    assert_eq!(e.kinetic_energy(), 0.0);
    Ok(())
}

/// Reheating from zero resamples velocities at the new temperature.
#[test]
fn reheating_from_zero_resamples() -> Result<()> {
    let cfg = EngineConfig::default();
    let mut e = Ensemble::new([0.0, 0.0], &cfg, Some(12))?;
    e.add_default_particles(20)?;
    e.set_temperature(0.0);
    e.set_temperature(500.0);
    let expected = 20.0 * 1.5 * cfg.boltzmann * 500.0 * cfg.velocity_damping.powi(2);
    let got = e.kinetic_energy();
    assert!(((got - expected) / expected).abs() < 1e-9);
    Ok(())
}
