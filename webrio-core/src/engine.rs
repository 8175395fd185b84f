//! The narrow boundary behind which the actual simulation lives.
//!
//! Physics, collision and animation are all inside a precompiled libsm64
//! build; this trait is everything the runtime knows about it. Any
//! implementation that fills the output buffers per the contract can be
//! substituted — the wasm FFI adapter in production, scripted doubles in
//! tests.

use glam::Vec3;
use thiserror::Error;

use crate::actor::ActorState;
use crate::geometry::{GeometryBuffer, StaticGeometry, TextureAtlas};
use crate::input::InputFrame;

pub type ActorId = i32;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine global init failed")]
    GlobalInit,
    #[error("actor spawn at ({0}, {1}, {2}) failed: no floor below spawn point")]
    ActorSpawn(f32, f32, f32),
    #[error("engine used before init")]
    NotInitialized,
}

/// Level assets produced by one-time engine init.
pub struct LevelAssets {
    pub geometry: StaticGeometry,
    pub texture: TextureAtlas,
}

/// The external simulation engine.
pub trait SimulationEngine {
    /// One-time global init. Consumes the ROM blob, loads static collision
    /// geometry, and returns it together with the decoded player texture.
    fn load_level(&mut self, rom: &[u8]) -> Result<LevelAssets, EngineError>;

    /// Places the actor in the world. Fails when the spawn point is not
    /// above valid terrain; callers log and continue without an actor.
    fn create_actor(&mut self, spawn: Vec3) -> Result<ActorId, EngineError>;

    /// Advances the simulation exactly one fixed logical step, overwriting
    /// `geometry` and `state` in place. Returns the triangle count that is
    /// meaningful this tick. Calling faster than the logical rate does not
    /// speed the simulation up — the step size is fixed by the engine, so
    /// the caller must gate invocations, not pass a dt.
    fn tick(
        &mut self,
        input: &InputFrame,
        geometry: &mut GeometryBuffer,
        state: &mut ActorState,
    ) -> Result<u16, EngineError>;
}
