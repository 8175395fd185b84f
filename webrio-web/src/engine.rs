//! The libsm64-backed engine adapter.
//!
//! libsm64 is an opaque collaborator: it owns all game logic and writes
//! its results into the buffers handed to it by raw pointer. This adapter
//! keeps the ABI structs alive between ticks and translates to and from
//! the core types.

use std::ffi::CStr;
use std::os::raw::c_char;

use glam::Vec3;
use webrio_core::actor::ActorState;
use webrio_core::engine::{ActorId, EngineError, LevelAssets, SimulationEngine};
use webrio_core::geometry::{GeometryBuffer, StaticGeometry, TextureAtlas};
use webrio_core::input::InputFrame;
use webrio_sys as sys;

unsafe extern "C" fn debug_print(msg: *const c_char) {
    if msg.is_null() {
        return;
    }
    let msg = CStr::from_ptr(msg).to_string_lossy();
    log::debug!("libsm64: {msg}");
}

/// `SimulationEngine` over the linked libsm64 build.
pub struct Libsm64Engine {
    initialized: bool,
    mario_id: Option<ActorId>,
    raw_inputs: sys::SM64MarioInputs,
    raw_state: sys::SM64MarioState,
}

impl Libsm64Engine {
    pub fn new() -> Self {
        Self {
            initialized: false,
            mario_id: None,
            raw_inputs: sys::SM64MarioInputs::default(),
            raw_state: sys::SM64MarioState::default(),
        }
    }
}

impl Default for Libsm64Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationEngine for Libsm64Engine {
    fn load_level(&mut self, rom: &[u8]) -> Result<LevelAssets, EngineError> {
        let mut rgba =
            vec![0u8; sys::SM64_TEXTURE_WIDTH * sys::SM64_TEXTURE_HEIGHT * 4];

        let geometry = StaticGeometry::default_ground();
        let surfaces = [sys::SM64Surface {
            surface_type: 0,
            force: 0,
            terrain: 0,
            v0: [-1000, 0, 0],
            v1: [1000, 0, 1000],
            v2: [1000, 0, -1000],
        }];

        unsafe {
            sys::sm64_register_debug_print_function(debug_print);
            sys::sm64_global_init(rom.as_ptr(), rgba.as_mut_ptr());
            sys::sm64_static_surfaces_load(surfaces.as_ptr(), surfaces.len() as u32);
        }
        self.initialized = true;
        log::info!(
            "libsm64 initialized: {} static surfaces, {} byte ROM",
            surfaces.len(),
            rom.len()
        );

        Ok(LevelAssets {
            geometry,
            texture: TextureAtlas {
                width: sys::SM64_TEXTURE_WIDTH as u32,
                height: sys::SM64_TEXTURE_HEIGHT as u32,
                rgba,
            },
        })
    }

    fn create_actor(&mut self, spawn: Vec3) -> Result<ActorId, EngineError> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }
        let id = unsafe { sys::sm64_mario_create(spawn.x, spawn.y, spawn.z) };
        if id < 0 {
            return Err(EngineError::ActorSpawn(spawn.x, spawn.y, spawn.z));
        }
        self.mario_id = Some(id);
        Ok(id)
    }

    fn tick(
        &mut self,
        input: &InputFrame,
        geometry: &mut GeometryBuffer,
        state: &mut ActorState,
    ) -> Result<u16, EngineError> {
        let Some(id) = self.mario_id else {
            return Err(EngineError::NotInitialized);
        };

        self.raw_inputs = sys::SM64MarioInputs {
            cam_look_x: input.cam_look.x,
            cam_look_z: input.cam_look.y,
            stick_x: input.stick.x,
            stick_y: input.stick.y,
            button_a: input.button_a as u8,
            button_b: input.button_b as u8,
            button_z: input.button_z as u8,
        };

        let mut buffers = sys::SM64MarioGeometryBuffers {
            position: geometry.positions.as_mut_ptr(),
            normal: geometry.normals.as_mut_ptr(),
            color: geometry.colors.as_mut_ptr(),
            uv: geometry.uvs.as_mut_ptr(),
            num_triangles_used: 0,
        };

        unsafe {
            sys::sm64_mario_tick(id, &self.raw_inputs, &mut self.raw_state, &mut buffers);
        }

        state.position = Vec3::from_array(self.raw_state.position);
        state.velocity = Vec3::from_array(self.raw_state.velocity);
        state.face_angle = self.raw_state.face_angle;
        state.health = self.raw_state.health;
        state.action = self.raw_state.action;
        state.flags = self.raw_state.flags;
        state.particle_flags = self.raw_state.particle_flags;
        state.invinc_timer = self.raw_state.invinc_timer;

        Ok(buffers.num_triangles_used)
    }
}
