//! webrio core — the engine-agnostic half of the runtime.
//!
//! The simulation itself (physics, collision, animation) lives in an
//! external libsm64 build behind the [`engine::SimulationEngine`] trait.
//! This crate owns everything around it: the fixed-capacity output buffers
//! the engine writes into, keyboard-to-stick input mapping, and the
//! fixed-timestep loop that decouples the engine's 30 Hz tick from the
//! variable display refresh by interpolating between the last two
//! committed snapshots.

pub mod actor;
pub mod engine;
pub mod geometry;
pub mod input;
pub mod runtime;
