use chemsim::core::{Environment, SimConfig, Simulation};
use chemsim::error::Result;

fn free_space_config() -> SimConfig {
    SimConfig {
        env: Environment {
            gravity: 0.0,
            ..Environment::default()
        },
        ..SimConfig::default()
    }
}

/// Place a grid of particles in the center of a large box with bounded
/// pseudo-random velocities, far enough from every wall that no wall
/// contact can occur within the tested horizon.
fn populate_center(sim: &mut Simulation, symbol: &str, side: usize) -> Result<()> {
    for row in 0..side {
        for col in 0..side {
            let i = row * side + col;
            let x = 850.0 + 30.0 * col as f64;
            let y = 850.0 + 30.0 * row as f64;
            sim.spawn(x, y, symbol)?;
            let idx = sim.num_particles() - 1;
            sim.particles[idx].v = [
                ((i * 37) % 21) as f64 - 10.0,
                ((i * 53) % 21) as f64 - 10.0,
            ];
        }
    }
    Ok(())
}

/// Total mass is invariant under an arbitrary reaction cascade.
#[test]
fn mass_conserved_through_reaction_cascade() -> Result<()> {
    let mut sim = Simulation::new(1000.0, 500.0, SimConfig::default())?;
    sim.scatter(80, "H", Some(101))?;
    sim.scatter(40, "O", Some(202))?;
    sim.scatter(40, "N", Some(303))?;
    let mass0 = sim.total_mass();

    for _ in 0..120 {
        sim.advance(1.0 / 60.0)?;
    }

    assert!(
        (sim.total_mass() - mass0).abs() < 1e-9,
        "mass drifted: {} -> {}",
        mass0,
        sim.total_mass()
    );
    Ok(())
}

/// With gravity off and no wall contact, reactions and bounces preserve
/// total momentum.
#[test]
fn momentum_conserved_without_external_forces() -> Result<()> {
    let mut sim = Simulation::new(2000.0, 2000.0, free_space_config())?;
    populate_center(&mut sim, "H", 10)?;
    let p0 = sim.total_momentum();

    for _ in 0..60 {
        sim.advance(1.0 / 60.0)?;
    }

    let p1 = sim.total_momentum();
    assert!((p0[0] - p1[0]).abs() < 1e-6, "px drifted: {p0:?} -> {p1:?}");
    assert!((p0[1] - p1[1]).abs() < 1e-6, "py drifted: {p0:?} -> {p1:?}");
    Ok(())
}

/// An unreactive population (carbon has no C+C rule) only ever bounces, and
/// elastic bounces conserve kinetic energy exactly.
#[test]
fn energy_conserved_in_pure_bounces() -> Result<()> {
    let mut sim = Simulation::new(2000.0, 2000.0, free_space_config())?;
    populate_center(&mut sim, "C", 8)?;
    let e0 = sim.kinetic_energy();

    for _ in 0..120 {
        sim.advance(1.0 / 60.0)?;
    }

    let e1 = sim.kinetic_energy();
    let rel = ((e1 - e0) / e0).abs();
    assert!(rel < 1e-9, "relative energy drift {rel} (E0={e0}, E1={e1})");
    Ok(())
}

/// Reactions preserve momentum even when reactants carry velocity: the
/// product of H + H inherits the mass-weighted velocity.
#[test]
fn reaction_products_inherit_momentum() -> Result<()> {
    let mut sim = Simulation::new(2000.0, 2000.0, free_space_config())?;
    sim.spawn(1000.0, 1000.0, "H")?;
    sim.spawn(1005.0, 1000.0, "H")?;
    sim.particles[0].v = [40.0, -8.0];
    sim.particles[1].v = [-10.0, 4.0];
    let p0 = sim.total_momentum();

    sim.advance(1.0 / 60.0)?;

    assert_eq!(sim.num_particles(), 1);
    assert_eq!(sim.particles[0].symbol, "H₂");
    let p1 = sim.total_momentum();
    assert!((p0[0] - p1[0]).abs() < 1e-9);
    assert!((p0[1] - p1[1]).abs() < 1e-9);
    // v = (m1 v1 + m2 v2) / (m1 + m2) with equal masses.
    assert!((sim.particles[0].v[0] - 15.0).abs() < 1e-9);
    assert!((sim.particles[0].v[1] + 2.0).abs() < 1e-9);
    Ok(())
}
