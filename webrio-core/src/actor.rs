//! Runtime state of the single simulated actor.

use glam::Vec3;

/// Actor state block, overwritten in place by the engine every tick.
#[derive(Clone, Copy, Debug)]
pub struct ActorState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Facing angle around Y, radians.
    pub face_angle: f32,
    pub health: i16,
    pub action: u32,
    pub flags: u32,
    pub particle_flags: u32,
    pub invinc_timer: i16,
}

impl Default for ActorState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            face_angle: 0.0,
            health: 0,
            action: 0,
            flags: 0,
            particle_flags: 0,
            invinc_timer: 0,
        }
    }
}
