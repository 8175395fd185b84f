//! Raw bindings to libsm64.
//!
//! libsm64 is compiled to wasm separately (via emscripten) and linked into
//! the final module; nothing here is implemented in Rust. The structs mirror
//! the C ABI exactly — libsm64 reads and writes them through raw pointers
//! that stay valid for the process lifetime.

use std::os::raw::c_char;

use bytemuck::Zeroable;

/// Upper bound on triangles libsm64 writes into a geometry buffer per tick.
pub const SM64_GEO_MAX_TRIANGLES: usize = 1024;

/// The player texture atlas is 11 tiles of 64x64 RGBA.
pub const SM64_TEXTURE_WIDTH: usize = 64 * 11;
/// Atlas height in texels.
pub const SM64_TEXTURE_HEIGHT: usize = 64;

/// Per-tick input block consumed by `sm64_mario_tick`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Zeroable)]
pub struct SM64MarioInputs {
    pub cam_look_x: f32,
    pub cam_look_z: f32,
    pub stick_x: f32,
    pub stick_y: f32,
    pub button_a: u8,
    pub button_b: u8,
    pub button_z: u8,
}

/// Actor state block written by `sm64_mario_tick`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Zeroable)]
pub struct SM64MarioState {
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub face_angle: f32,
    pub health: i16,
    pub action: u32,
    pub flags: u32,
    pub particle_flags: u32,
    pub invinc_timer: i16,
}

/// Pointers into caller-owned vertex buffers filled by `sm64_mario_tick`.
///
/// position/color/normal hold 9 floats per triangle, uv holds 6. Only the
/// first `num_triangles_used` triangles are meaningful after a tick.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SM64MarioGeometryBuffers {
    pub position: *mut f32,
    pub normal: *mut f32,
    pub color: *mut f32,
    pub uv: *mut f32,
    pub num_triangles_used: u16,
}

/// One static collision triangle, integer world coordinates.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Zeroable)]
pub struct SM64Surface {
    pub surface_type: i16,
    pub force: i16,
    pub terrain: u16,
    pub v0: [i32; 3],
    pub v1: [i32; 3],
    pub v2: [i32; 3],
}

/// Position plus euler rotation for an attached object.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Zeroable)]
pub struct SM64ObjectTransform {
    pub position: [f32; 3],
    pub euler_rotation: [f32; 3],
}

pub type SM64DebugPrintFn = unsafe extern "C" fn(msg: *const c_char);

extern "C" {
    /// One-time global init. `rom` must point at the full base ROM image;
    /// `texture_out` receives the decoded player atlas
    /// (`SM64_TEXTURE_WIDTH * SM64_TEXTURE_HEIGHT * 4` bytes).
    pub fn sm64_global_init(rom: *const u8, texture_out: *mut u8);
    pub fn sm64_global_terminate();

    pub fn sm64_register_debug_print_function(print: SM64DebugPrintFn);

    pub fn sm64_static_surfaces_load(surfaces: *const SM64Surface, num_surfaces: u32);

    /// Returns the new actor id, or -1 when the spawn point has no floor.
    pub fn sm64_mario_create(x: f32, y: f32, z: f32) -> i32;
    /// Advances the actor exactly one fixed logical step (30 Hz). The step
    /// size is baked into libsm64; there is no dt parameter.
    pub fn sm64_mario_tick(
        mario_id: i32,
        inputs: *const SM64MarioInputs,
        out_state: *mut SM64MarioState,
        out_buffers: *mut SM64MarioGeometryBuffers,
    );
    pub fn sm64_mario_delete(mario_id: i32);

    pub fn sm64_audio_tick(queued_frames: u32, desired_frames: u32, audio_buffer: *mut i16);
}
