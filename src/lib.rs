use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

pub mod core;
pub mod error;

use crate::core::{SimConfig, Simulation};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// ChemSim Python-facing wrapper around the Rust simulation core.
///
/// The host (rendering/input loop) spawns particles, calls `advance` once
/// per frame, and reads the render feed between calls:
/// - __new__(width, height, max_particles=4096)
/// - spawn(x, y, symbol) / spawn_atom(atomic_number, x, y)
/// - advance(dt)
/// - get_positions() -> np.ndarray, shape (N, 2)
/// - get_colors() -> np.ndarray, shape (N, 3), dtype=uint8
/// - get_symbols() -> list[str]
#[pyclass]
pub struct ChemSim {
    sim: Simulation,
}

#[pymethods]
impl ChemSim {
    /// Initialize an empty simulation over a `width` x `height` area.
    ///
    /// Parameters
    /// - width, height: simulation area extents (floats, > 0); y grows
    ///   downward and the floor sits at y = height
    /// - max_particles: particle ceiling; spawns beyond it raise ValueError
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (width, height, max_particles=4096))]
    fn new(width: f64, height: f64, max_particles: usize) -> PyResult<Self> {
        let config = SimConfig {
            max_particles,
            ..SimConfig::default()
        };
        let sim = Simulation::new(width, height, config).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Spawn one particle of `symbol` at rest at (x, y), clamped into the
    /// bounds. Raises ValueError for unknown symbols or at capacity.
    fn spawn(&mut self, x: f64, y: f64, symbol: &str) -> PyResult<()> {
        self.sim.spawn(x, y, symbol).map_err(py_err)
    }

    /// Spawn an element by atomic number (1..=118).
    fn spawn_atom(&mut self, atomic_number: u32, x: f64, y: f64) -> PyResult<()> {
        self.sim.spawn_atom(atomic_number, x, y).map_err(py_err)
    }

    /// Scatter `n` non-overlapping particles of one species with small
    /// random velocities; pass a seed for reproducible placement.
    #[pyo3(signature = (n, symbol, seed=None))]
    fn scatter(&mut self, n: usize, symbol: &str, seed: Option<u64>) -> PyResult<()> {
        self.sim.scatter(n, symbol, seed).map_err(py_err)
    }

    /// Advance the simulation by `dt` seconds (releases the GIL during
    /// computation). The particle list is fully reacted and bounced when
    /// this returns.
    fn advance(&mut self, py: Python<'_>, dt: f64) -> PyResult<()> {
        py.allow_threads(|| self.sim.advance(dt)).map_err(py_err)
    }

    /// Number of live particles.
    fn num_particles(&self) -> usize {
        self.sim.num_particles()
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let n = self.sim.num_particles();
        let mut arr = Array2::<f64>::zeros((n, 2));
        for (i, p) in self.sim.particles.iter().enumerate() {
            arr[[i, 0]] = p.r[0];
            arr[[i, 1]] = p.r[1];
        }
        Ok(arr.into_pyarray(py).unbind())
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let n = self.sim.num_particles();
        let mut arr = Array2::<f64>::zeros((n, 2));
        for (i, p) in self.sim.particles.iter().enumerate() {
            arr[[i, 0]] = p.v[0];
            arr[[i, 1]] = p.v[1];
        }
        Ok(arr.into_pyarray(py).unbind())
    }

    /// Return radii as a NumPy array of shape (N,), dtype=float64.
    fn get_radii<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<f64>>> {
        let radii: Vec<f64> = self.sim.particles.iter().map(|p| p.radius).collect();
        Ok(radii.into_pyarray(py).unbind())
    }

    /// Return masses as a NumPy array of shape (N,), dtype=float64.
    fn get_masses<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<f64>>> {
        let masses: Vec<f64> = self.sim.particles.iter().map(|p| p.mass).collect();
        Ok(masses.into_pyarray(py).unbind())
    }

    /// Return RGB colors as a NumPy array of shape (N, 3), dtype=uint8.
    fn get_colors<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<u8>>> {
        let n = self.sim.num_particles();
        let mut arr = Array2::<u8>::zeros((n, 3));
        for (i, p) in self.sim.particles.iter().enumerate() {
            for k in 0..3 {
                arr[[i, k]] = p.color[k];
            }
        }
        Ok(arr.into_pyarray(py).unbind())
    }

    /// Return species symbols as a list of strings, one per particle.
    fn get_symbols(&self) -> Vec<String> {
        self.sim.particles.iter().map(|p| p.symbol.clone()).collect()
    }

    /// Index of the particle whose disc covers (x, y), nearest center
    /// first, or None. The index is only valid until the next call that
    /// mutates the particle list.
    fn nearest_particle(&self, x: f64, y: f64) -> Option<usize> {
        self.sim.nearest_particle(x, y)
    }

    /// Info panel data for one particle: symbol, common name (or None),
    /// mass, radius, position, velocity, speed.
    fn particle_info<'py>(&self, py: Python<'py>, index: usize) -> PyResult<Py<PyDict>> {
        let Some(p) = self.sim.particles.get(index) else {
            return Err(py_err(format!(
                "particle index {index} out of range (N = {})",
                self.sim.num_particles()
            )));
        };
        let out = PyDict::new(py);
        out.set_item("symbol", &p.symbol)?;
        out.set_item("name", self.sim.registry().common_name(&p.symbol))?;
        out.set_item("mass", p.mass)?;
        out.set_item("radius", p.radius)?;
        out.set_item("position", (p.r[0], p.r[1]))?;
        out.set_item("velocity", (p.v[0], p.v[1]))?;
        out.set_item("speed", p.speed())?;
        Ok(out.into())
    }

    /// Registry data for a species symbol: symbol, common name (or None),
    /// mass, radius, color. Raises ValueError for unknown symbols.
    fn species_info<'py>(&self, py: Python<'py>, symbol: &str) -> PyResult<Py<PyDict>> {
        let data = self.sim.registry().get(symbol).map_err(py_err)?;
        let out = PyDict::new(py);
        out.set_item("symbol", &data.symbol)?;
        out.set_item("name", data.name)?;
        out.set_item("mass", data.mass)?;
        out.set_item("radius", data.radius)?;
        out.set_item("color", (data.color[0], data.color[1], data.color[2]))?;
        Ok(out.into())
    }

    /// Total kinetic energy (diagnostic).
    fn kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    /// Total mass (diagnostic; conserved by every reaction).
    fn total_mass(&self) -> f64 {
        self.sim.total_mass()
    }

    /// Total momentum as (px, py) (diagnostic).
    fn total_momentum(&self) -> (f64, f64) {
        let p = self.sim.total_momentum();
        (p[0], p[1])
    }
}

/// The chemsim Python module entry point.
#[pymodule]
fn chemsim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ChemSim>()?;
    Ok(())
}
