use crate::core::collision;
use crate::core::grid;
use crate::core::particle::{Bounds, Environment, Particle};
use crate::core::reactions;
use crate::core::species::Registry;
use crate::error::{Error, Result};
use ordered_float::NotNan;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

/// Initial speed range for scattered particles, per component.
const SCATTER_SPEED: f64 = 20.0;

/// Simulation tuning: force/boundary constants plus stepping and capacity.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Force and boundary constants shared by all particles.
    pub env: Environment,
    /// Sub-steps per `advance` call (>= 1); more sub-steps keep fast or
    /// heavily-overlapping bodies stable.
    pub substeps: u32,
    /// Particle ceiling; spawns beyond it are rejected to keep the
    /// broadphase cost bounded.
    pub max_particles: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            substeps: 4,
            max_particles: 4096,
        }
    }
}

impl SimConfig {
    /// Validate all fields.
    pub fn validate(&self) -> Result<()> {
        self.env.validate()?;
        if self.substeps == 0 {
            return Err(Error::InvalidParam("substeps must be >= 1".into()));
        }
        if self.max_particles == 0 {
            return Err(Error::InvalidParam("max_particles must be >= 1".into()));
        }
        Ok(())
    }
}

/// The simulation: a bounded 2D area of chemical particles advanced in
/// fixed sub-steps.
///
/// Each sub-step runs force integration, position integration (with wall
/// response), the reaction pipeline, and the elastic bounce pass to
/// completion; the particle list is only observable between `advance`
/// calls, in a fully-reacted, fully-bounced state.
#[derive(Debug)]
pub struct Simulation {
    bounds: Bounds,
    config: SimConfig,
    registry: Registry,
    pub particles: Vec<Particle>,
}

impl Simulation {
    /// Create an empty simulation over a `width` x `height` area with the
    /// standard species registry.
    pub fn new(width: f64, height: f64, config: SimConfig) -> Result<Self> {
        let bounds = Bounds::new(width, height)?;
        config.validate()?;
        Ok(Self {
            bounds,
            config,
            registry: Registry::standard(),
            particles: Vec::new(),
        })
    }

    /// Simulation bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The species registry (immutable for the simulation's lifetime).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of live particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Spawn one particle of `symbol` at rest, clamped into the bounds
    /// interior.
    ///
    /// Errors: `UnknownSpecies` for symbols without a registry entry,
    /// `CapacityExceeded` at the particle ceiling, `InvalidParam` for
    /// non-finite coordinates.
    pub fn spawn(&mut self, x: f64, y: f64, symbol: &str) -> Result<()> {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidParam("spawn position must be finite".into()));
        }
        if self.particles.len() >= self.config.max_particles {
            return Err(Error::CapacityExceeded {
                limit: self.config.max_particles,
            });
        }
        let data = self.registry.get(symbol)?;
        let px = x.max(data.radius).min(self.bounds.width - data.radius);
        let py = y.max(data.radius).min(self.bounds.height - data.radius);
        let p = Particle::new(symbol, [px, py], [0.0, 0.0], data.radius, data.mass, data.color)?;
        self.particles.push(p);
        Ok(())
    }

    /// Spawn an element by atomic number (1..=118).
    pub fn spawn_atom(&mut self, atomic_number: u32, x: f64, y: f64) -> Result<()> {
        let symbol = self.registry.atom(atomic_number)?.symbol.clone();
        self.spawn(x, y, &symbol)
    }

    /// Scatter `n` non-overlapping particles of one species across the
    /// bounds by rejection sampling, with small random velocities. A seed
    /// makes placement reproducible.
    pub fn scatter(&mut self, n: usize, symbol: &str, seed: Option<u64>) -> Result<()> {
        if self.particles.len() + n > self.config.max_particles {
            return Err(Error::CapacityExceeded {
                limit: self.config.max_particles,
            });
        }
        let data = self.registry.get(symbol)?.clone();
        let (lo_x, hi_x) = (data.radius, self.bounds.width - data.radius);
        let (lo_y, hi_y) = (data.radius, self.bounds.height - data.radius);
        if hi_x < lo_x || hi_y < lo_y {
            return Err(Error::InvalidParam(
                "bounds too small for the species radius".into(),
            ));
        }

        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let max_attempts = 1_000_000usize;
        for placed in 0..n {
            let mut attempts = 0usize;
            let r = loop {
                if attempts >= max_attempts {
                    return Err(Error::InvalidParam(format!(
                        "failed to place particle {placed} without overlap; try fewer particles"
                    )));
                }
                attempts += 1;
                let r = [
                    rng.random_range(lo_x..=hi_x),
                    rng.random_range(lo_y..=hi_y),
                ];
                if !overlaps_existing(&self.particles, &r, data.radius) {
                    break r;
                }
            };
            let v = [
                rng.random_range(-SCATTER_SPEED..=SCATTER_SPEED),
                rng.random_range(-SCATTER_SPEED..=SCATTER_SPEED),
            ];
            self.particles.push(Particle::new(
                data.symbol.as_str(),
                r,
                v,
                data.radius,
                data.mass,
                data.color,
            )?);
        }
        Ok(())
    }

    /// Advance the simulation by `dt`, split into the configured number of
    /// sub-steps.
    ///
    /// Errors: `InvalidParam` for non-finite or negative `dt`.
    pub fn advance(&mut self, dt: f64) -> Result<()> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(Error::InvalidParam(
                "dt must be finite and non-negative".into(),
            ));
        }
        let sub_dt = dt / f64::from(self.config.substeps);
        for _ in 0..self.config.substeps {
            self.step(sub_dt)?;
        }
        Ok(())
    }

    /// One sub-step: forces, positions, reactions, bounce.
    fn step(&mut self, dt: f64) -> Result<()> {
        for p in &mut self.particles {
            p.integrate_forces(dt, &self.config.env);
        }
        for p in &mut self.particles {
            p.integrate_position(dt, &self.bounds, &self.config.env);
        }

        let candidates = grid::candidate_pairs(&self.particles);
        let colliding = collision::colliding_pairs(&self.particles, &candidates);
        reactions::resolve(&mut self.particles, &colliding, &self.registry)?;

        // Reactions mutate the particle list, so the bounce pass runs on a
        // freshly detected colliding set.
        let candidates = grid::candidate_pairs(&self.particles);
        let colliding = collision::colliding_pairs(&self.particles, &candidates);
        collision::elastic_bounce(&mut self.particles, &colliding);
        Ok(())
    }

    /// Index of the particle whose disc covers `(x, y)`, preferring the
    /// nearest center (ties break to the lower index). The index is only
    /// valid until the next structural change to the particle list.
    pub fn nearest_particle(&self, x: f64, y: f64) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        self.particles
            .iter()
            .enumerate()
            .filter_map(|(i, p)| {
                let dx = p.r[0] - x;
                let dy = p.r[1] - y;
                let d_sq = dx * dx + dy * dy;
                if d_sq < p.radius * p.radius {
                    NotNan::new(d_sq).ok().map(|d| (d, i))
                } else {
                    None
                }
            })
            .min()
            .map(|(_, i)| i)
    }

    /// Total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Total mass (diagnostic; conserved by every reaction).
    pub fn total_mass(&self) -> f64 {
        self.particles.iter().map(|p| p.mass).sum()
    }

    /// Total momentum (diagnostic).
    pub fn total_momentum(&self) -> [f64; 2] {
        let mut out = [0.0_f64; 2];
        for p in &self.particles {
            let m = p.momentum();
            out[0] += m[0];
            out[1] += m[1];
        }
        out
    }
}

fn overlaps_existing(existing: &[Particle], r: &[f64; 2], radius: f64) -> bool {
    existing.iter().any(|p| {
        let dx = r[0] - p.r[0];
        let dy = r[1] - p.r[1];
        let min = radius + p.radius;
        dx * dx + dy * dy < min * min
    })
}
