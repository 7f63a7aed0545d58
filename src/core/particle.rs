use crate::error::{Error, Result};
use std::f64::consts::PI;

/// Spatial dimension of the simulation (2D).
pub const DIM: usize = 2;

/// Axis-aligned simulation area: x in [0, width], y in [0, height].
///
/// The y axis grows downward (screen convention); gravity pulls toward the
/// floor at `y = height`.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    /// Horizontal extent (> 0).
    pub width: f64,
    /// Vertical extent (> 0).
    pub height: f64,
}

impl Bounds {
    /// Create simulation bounds after validating both extents.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(Error::InvalidParam("width must be finite and > 0".into()));
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(Error::InvalidParam("height must be finite and > 0".into()));
        }
        Ok(Self { width, height })
    }
}

/// Force and boundary constants shared by all particles.
///
/// `air_density = 0` disables the drag/buoyancy model and reduces
/// [`Particle::integrate_forces`] to plain gravity.
#[derive(Debug, Clone, Copy)]
pub struct Environment {
    /// Gravitational acceleration, positive downward.
    pub gravity: f64,
    /// Velocity retention factor applied on wall reflection (< 1).
    pub damping: f64,
    /// Reflected floor speeds below this snap to zero so bouncing converges.
    pub rest_speed: f64,
    /// Hard cap on speed magnitude after force integration.
    pub max_speed: f64,
    /// Ambient fluid density; 0 disables drag and buoyancy.
    pub air_density: f64,
    /// Drag coefficient for the quadratic drag model.
    pub drag_coefficient: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity: 9.80665,
            damping: 0.5,
            rest_speed: 1.0,
            max_speed: 1e4,
            air_density: 0.0,
            drag_coefficient: 0.47,
        }
    }
}

impl Environment {
    /// Validate all constants.
    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() {
            return Err(Error::InvalidParam("gravity must be finite".into()));
        }
        if !self.damping.is_finite() || !(0.0..1.0).contains(&self.damping) {
            return Err(Error::InvalidParam("damping must be in [0, 1)".into()));
        }
        if !self.rest_speed.is_finite() || self.rest_speed < 0.0 {
            return Err(Error::InvalidParam(
                "rest_speed must be finite and >= 0".into(),
            ));
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(Error::InvalidParam(
                "max_speed must be finite and > 0".into(),
            ));
        }
        if !self.air_density.is_finite() || self.air_density < 0.0 {
            return Err(Error::InvalidParam(
                "air_density must be finite and >= 0".into(),
            ));
        }
        if !self.drag_coefficient.is_finite() || self.drag_coefficient < 0.0 {
            return Err(Error::InvalidParam(
                "drag_coefficient must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// A chemical particle: point mass with a hard-circle collision envelope.
///
/// `symbol`, `mass`, `radius` and `color` are fixed at creation (copied from
/// the species registry, or computed by a reaction for product masses); a
/// particle never changes species in place.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Species symbol ("H", "O₂", "NH₃", ...). Immutable after creation.
    pub symbol: String,
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
    /// Collision and render radius (> 0).
    pub radius: f64,
    /// Mass (> 0).
    pub mass: f64,
    /// Render color as RGB.
    pub color: [u8; 3],
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors: `Error::InvalidParam` if `radius` or `mass` is non-positive
    /// or any coordinate is NaN/inf.
    pub fn new(
        symbol: impl Into<String>,
        r: [f64; DIM],
        v: [f64; DIM],
        radius: f64,
        mass: f64,
        color: [u8; 3],
    ) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            symbol: symbol.into(),
            r,
            v,
            radius,
            mass,
            color,
        })
    }

    /// Apply gravity (and the drag/buoyancy model when enabled) to the
    /// velocity over `dt`, then clamp the speed to `env.max_speed`.
    ///
    /// `dt` is not validated here; the simulation entry point owns that
    /// contract.
    pub fn integrate_forces(&mut self, dt: f64, env: &Environment) {
        if env.air_density > 0.0 {
            // Buoyancy: gravity reduced by the displaced fluid mass.
            let displaced = env.air_density * PI * self.radius * self.radius;
            self.v[1] += env.gravity * (1.0 - displaced / self.mass) * dt;

            // Quadratic drag opposing motion; 2D cross-section is the
            // diameter. The decrement is capped at the current speed so
            // drag can never reverse the velocity within one sub-step.
            let speed_sq = self.v[0] * self.v[0] + self.v[1] * self.v[1];
            if speed_sq > 0.0 {
                let speed = speed_sq.sqrt();
                let area = 2.0 * self.radius;
                let force = 0.5 * env.air_density * env.drag_coefficient * area * speed_sq;
                let dv = (force / self.mass * dt).min(speed);
                let scale = (speed - dv) / speed;
                self.v[0] *= scale;
                self.v[1] *= scale;
            }
        } else {
            self.v[1] += env.gravity * dt;
        }

        let sp_sq = self.v[0] * self.v[0] + self.v[1] * self.v[1];
        if sp_sq > env.max_speed * env.max_speed {
            let scale = env.max_speed / sp_sq.sqrt();
            self.v[0] *= scale;
            self.v[1] *= scale;
        }
    }

    /// Advance the position by `v * dt` and resolve wall crossings: clamp to
    /// the wall and reflect the offending velocity component scaled by
    /// `env.damping`. Reflected floor speeds below `env.rest_speed` snap to
    /// zero so a damped bounce settles instead of micro-bouncing forever.
    pub fn integrate_position(&mut self, dt: f64, bounds: &Bounds, env: &Environment) {
        self.r[0] += self.v[0] * dt;
        self.r[1] += self.v[1] * dt;

        // Floor (y grows downward).
        if self.r[1] + self.radius >= bounds.height {
            self.r[1] = bounds.height - self.radius;
            if self.v[1] > 0.0 {
                self.v[1] = -env.damping * self.v[1];
                if self.v[1].abs() < env.rest_speed {
                    self.v[1] = 0.0;
                }
            }
        }

        // Ceiling.
        if self.r[1] - self.radius < 0.0 {
            self.r[1] = self.radius;
            if self.v[1] < 0.0 {
                self.v[1] = -env.damping * self.v[1];
            }
        }

        // Left wall.
        if self.r[0] - self.radius < 0.0 {
            self.r[0] = self.radius;
            if self.v[0] < 0.0 {
                self.v[0] = -env.damping * self.v[0];
            }
        }

        // Right wall.
        if self.r[0] + self.radius > bounds.width {
            self.r[0] = bounds.width - self.radius;
            if self.v[0] > 0.0 {
                self.v[0] = -env.damping * self.v[0];
            }
        }
    }

    /// Returns the particle's speed |v|.
    #[inline]
    pub fn speed(&self) -> f64 {
        (self.v[0] * self.v[0] + self.v[1] * self.v[1]).sqrt()
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let vsq: f64 = self.v.iter().map(|&c| c * c).sum();
        0.5 * self.mass * vsq
    }

    /// Returns the particle's momentum m·v.
    #[inline]
    pub fn momentum(&self) -> [f64; DIM] {
        [self.mass * self.v[0], self.mass * self.v[1]]
    }
}
