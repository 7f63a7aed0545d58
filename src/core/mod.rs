//! Core simulation: particles, broadphase, overlap detection, the reaction
//! pipeline, and the elastic bounce pass.
//!
//! Everything in here is pure Rust with no Python types; `lib.rs` adapts
//! this module for the host.

pub mod collision;
pub mod grid;
pub mod particle;
pub mod reactions;
pub mod sim;
pub mod species;

pub use particle::{Bounds, Environment, Particle};
pub use reactions::ReactionRule;
pub use sim::{SimConfig, Simulation};
pub use species::{Registry, SpeciesData};
