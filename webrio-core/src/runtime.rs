//! The fixed-timestep loop bridging the 30 Hz engine tick to the display
//! refresh rate.
//!
//! The engine only ever sees whole logical steps; the renderer samples a
//! blend of the last two committed snapshots every frame. Everything runs
//! inside one render callback at a time — snapshot previous, tick, read
//! current — so the shared buffers need no locking.

use glam::Vec3;

use crate::actor::ActorState;
use crate::engine::{ActorId, EngineError, LevelAssets, SimulationEngine};
use crate::geometry::{GeometryBuffer, GEO_MAX_TRIANGLES, TRI_FLOATS};
use crate::input::{map_input, HeldKeys, Key};

/// What to do with logical steps missed during a long stall (tab hidden,
/// debugger paused, window dragged).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StallPolicy {
    /// Snap the logical clock to now and drop the missed steps. Favors
    /// responsiveness: the actor resumes immediately instead of
    /// fast-forwarding through the gap.
    SnapToNow,
    /// Keep the clock where it was and catch up one step per callback.
    /// Favors deterministic simulation at the cost of a visible replay
    /// burst after long stalls.
    ReplayAll,
}

#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Logical step length. libsm64 runs at 30 Hz.
    pub tick_interval_ms: f64,
    /// Lag beyond this many intervals counts as a stall.
    pub stall_threshold_ticks: u32,
    pub stall_policy: StallPolicy,
    /// Where the actor is placed at init.
    pub spawn: Vec3,
    /// Vertical offset from the actor origin to the camera look target,
    /// in engine units.
    pub eye_height: f32,
    /// Uniform scale from engine units to renderer units.
    pub world_scale: f32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000.0 / 30.0,
            stall_threshold_ticks: 10,
            stall_policy: StallPolicy::SnapToNow,
            spawn: Vec3::new(0.0, 2000.0, 0.0),
            eye_height: 120.0,
            world_scale: 1.0,
        }
    }
}

/// Per-frame output handed to the render side. The blended vertex arrays
/// are exposed separately via [`Runtime::blended_positions`] and friends.
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Whether a logical step was committed during this callback.
    pub ticked: bool,
    /// Blend fraction between the two snapshots, in [0, 1].
    pub fraction: f32,
    /// Valid triangle count in the blended buffers.
    pub triangles_used: u16,
    /// Interpolated actor position in renderer units. The blended mesh is
    /// recentred on this point, so it doubles as the mesh transform.
    pub mesh_origin: Vec3,
    /// How far the interpolated actor moved since the previous frame; the
    /// camera rides along by this much, preserving any user orbit offset.
    pub camera_delta: Vec3,
    /// Interpolated actor position plus eye height, for the camera to aim at.
    pub look_target: Vec3,
}

/// Owns the engine, the snapshot pairs, and the logical clock.
///
/// All buffers are allocated once here and reused for the process lifetime;
/// `frame` performs no allocation.
pub struct Runtime<E: SimulationEngine> {
    engine: E,
    config: RuntimeConfig,
    held: HeldKeys,
    camera_heading: f32,
    actor_id: Option<ActorId>,

    // Current snapshots, written by the engine at tick boundaries only.
    geometry: GeometryBuffer,
    actor: ActorState,
    // Previous snapshots. Invariant: exactly what the current snapshots
    // held immediately before the latest committed tick.
    prev_positions: Vec<f32>,
    prev_triangles_used: u16,
    prev_actor_pos: Vec3,

    blended_positions: Vec<f32>,

    /// Wall-clock time of the last committed tick. None until first frame.
    logical_clock_ms: Option<f64>,
    last_sampled_origin: Option<Vec3>,
    ticks_committed: u64,
    ticks_dropped: u64,
}

impl<E: SimulationEngine> Runtime<E> {
    pub fn new(engine: E, config: RuntimeConfig) -> Self {
        Self {
            engine,
            config,
            held: HeldKeys::new(),
            camera_heading: 0.0,
            actor_id: None,
            geometry: GeometryBuffer::new(),
            actor: ActorState::default(),
            prev_positions: vec![0.0; GEO_MAX_TRIANGLES * TRI_FLOATS],
            prev_triangles_used: 0,
            prev_actor_pos: Vec3::ZERO,
            blended_positions: vec![0.0; GEO_MAX_TRIANGLES * TRI_FLOATS],
            logical_clock_ms: None,
            last_sampled_origin: None,
            ticks_committed: 0,
            ticks_dropped: 0,
        }
    }

    /// One-time init: loads the ROM into the engine and places the actor.
    ///
    /// A failed actor spawn is logged and the runtime keeps going without
    /// one — frames still render the static level.
    pub fn load_level(&mut self, rom: &[u8]) -> Result<LevelAssets, EngineError> {
        let assets = self.engine.load_level(rom)?;
        match self.engine.create_actor(self.config.spawn) {
            Ok(id) => {
                self.actor.position = self.config.spawn;
                self.prev_actor_pos = self.config.spawn;
                self.actor_id = Some(id);
            }
            Err(e) => log::error!("continuing without actor: {e}"),
        }
        Ok(assets)
    }

    pub fn press(&mut self, key: Key) {
        self.held.press(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.release(key);
    }

    /// Camera heading around Y in radians, used to rotate stick input into
    /// view space. Updated by the render side whenever the user orbits.
    pub fn set_camera_heading(&mut self, radians: f32) {
        self.camera_heading = radians;
    }

    pub fn has_actor(&self) -> bool {
        self.actor_id.is_some()
    }

    pub fn ticks_committed(&self) -> u64 {
        self.ticks_committed
    }

    /// Logical steps discarded by the stall policy so far.
    pub fn ticks_dropped(&self) -> u64 {
        self.ticks_dropped
    }

    /// Blended, actor-recentred vertex positions for the valid prefix.
    pub fn blended_positions(&self) -> &[f32] {
        &self.blended_positions[..self.geometry.valid_position_floats()]
    }

    /// Colors are not interpolated; the current snapshot is authoritative.
    pub fn colors(&self) -> &[f32] {
        &self.geometry.colors[..self.geometry.valid_position_floats()]
    }

    pub fn normals(&self) -> &[f32] {
        &self.geometry.normals[..self.geometry.valid_position_floats()]
    }

    pub fn uvs(&self) -> &[f32] {
        &self.geometry.uvs[..self.geometry.triangles_used as usize * crate::geometry::TRI_UV_FLOATS]
    }

    pub fn actor_state(&self) -> &ActorState {
        &self.actor
    }

    /// Runs one render callback at wall-clock time `now_ms`.
    ///
    /// Commits at most one logical step, then writes the blended buffers
    /// regardless of whether a step was committed.
    pub fn frame(&mut self, now_ms: f64) -> Result<FrameSummary, EngineError> {
        let interval = self.config.tick_interval_ms;
        let clock = *self.logical_clock_ms.get_or_insert(now_ms);

        let mut ticked = false;
        if now_ms - clock > interval {
            // Snapshot current into previous before the engine overwrites it.
            self.prev_positions.copy_from_slice(&self.geometry.positions);
            self.prev_triangles_used = self.geometry.triangles_used;
            self.prev_actor_pos = self.actor.position;

            if self.actor_id.is_some() {
                let input = map_input(&self.held, self.camera_heading);
                let used = self
                    .engine
                    .tick(&input, &mut self.geometry, &mut self.actor)?;
                self.geometry.triangles_used = used.min(GEO_MAX_TRIANGLES as u16);
            }

            let lag = now_ms - clock;
            let stall_limit = f64::from(self.config.stall_threshold_ticks) * interval;
            let next_clock = if self.config.stall_policy == StallPolicy::SnapToNow
                && lag > stall_limit
            {
                let missed = (lag / interval) as u64 - 1;
                self.ticks_dropped += missed;
                log::warn!("render loop stalled {lag:.0}ms, dropping {missed} logical steps");
                now_ms
            } else {
                clock + interval
            };
            self.logical_clock_ms = Some(next_clock);
            self.ticks_committed += 1;
            ticked = true;
        }

        let clock = self.logical_clock_ms.unwrap_or(now_ms);
        let t = (((now_ms - clock) / interval).clamp(0.0, 1.0)) as f32;

        let origin = self.prev_actor_pos.lerp(self.actor.position, t);
        self.blend_geometry(t, origin);

        let scale = self.config.world_scale;
        let mesh_origin = origin * scale;
        let camera_delta = match self.last_sampled_origin {
            Some(last) => (origin - last) * scale,
            None => Vec3::ZERO,
        };
        self.last_sampled_origin = Some(origin);

        Ok(FrameSummary {
            ticked,
            fraction: t,
            triangles_used: self.geometry.triangles_used,
            mesh_origin,
            camera_delta,
            look_target: (origin + Vec3::Y * self.config.eye_height) * scale,
        })
    }

    /// Blends previous and current vertex positions, recentred into the
    /// actor's local frame.
    ///
    /// Only the valid prefix is touched. Where the triangle count grew this
    /// tick, the new triangles have no previous-snapshot counterpart and
    /// take the current values verbatim; stale data past the current count
    /// is never blended or exposed.
    fn blend_geometry(&mut self, t: f32, origin: Vec3) {
        let scale = self.config.world_scale;
        let cur_floats = self.geometry.valid_position_floats();
        let shared_floats =
            self.prev_triangles_used.min(self.geometry.triangles_used) as usize * TRI_FLOATS;
        let origin = origin.to_array();

        for ((out, prev), cur) in self.blended_positions[..shared_floats]
            .chunks_exact_mut(3)
            .zip(self.prev_positions[..shared_floats].chunks_exact(3))
            .zip(self.geometry.positions[..shared_floats].chunks_exact(3))
        {
            for k in 0..3 {
                let lerped = prev[k] + (cur[k] - prev[k]) * t;
                out[k] = (lerped - origin[k]) * scale;
            }
        }
        for (out, cur) in self.blended_positions[shared_floats..cur_floats]
            .chunks_exact_mut(3)
            .zip(self.geometry.positions[shared_floats..cur_floats].chunks_exact(3))
        {
            for k in 0..3 {
                out[k] = (cur[k] - origin[k]) * scale;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, LevelAssets, SimulationEngine};
    use crate::geometry::{StaticGeometry, TextureAtlas};

    const EPSILON: f32 = 1e-4;

    /// Scripted engine: tick n moves the actor along a fixed track and
    /// fills the geometry buffers with a known constant.
    struct ScriptedEngine {
        track: Vec<Vec3>,
        fill: Vec<f32>,
        used: Vec<u16>,
        ticks: usize,
        refuse_actor: bool,
    }

    impl ScriptedEngine {
        fn new(track: Vec<Vec3>, fill: Vec<f32>, used: Vec<u16>) -> Self {
            Self {
                track,
                fill,
                used,
                ticks: 0,
                refuse_actor: false,
            }
        }

        fn step(track: Vec<Vec3>) -> Self {
            let n = track.len();
            Self::new(track, vec![1.0; n], vec![1; n])
        }
    }

    impl SimulationEngine for ScriptedEngine {
        fn load_level(&mut self, _rom: &[u8]) -> Result<LevelAssets, EngineError> {
            Ok(LevelAssets {
                geometry: StaticGeometry::default_ground(),
                texture: TextureAtlas {
                    width: 4,
                    height: 4,
                    rgba: vec![0; 64],
                },
            })
        }

        fn create_actor(&mut self, spawn: Vec3) -> Result<ActorId, EngineError> {
            if self.refuse_actor {
                Err(EngineError::ActorSpawn(spawn.x, spawn.y, spawn.z))
            } else {
                Ok(0)
            }
        }

        fn tick(
            &mut self,
            _input: &crate::input::InputFrame,
            geometry: &mut GeometryBuffer,
            state: &mut ActorState,
        ) -> Result<u16, EngineError> {
            let n = self.ticks.min(self.track.len() - 1);
            state.position = self.track[n];
            let used = self.used[n];
            for v in &mut geometry.positions[..used as usize * TRI_FLOATS] {
                *v = self.fill[n];
            }
            self.ticks += 1;
            Ok(used)
        }
    }

    fn runtime_with(engine: ScriptedEngine, interval: f64) -> Runtime<ScriptedEngine> {
        let config = RuntimeConfig {
            tick_interval_ms: interval,
            spawn: Vec3::ZERO,
            eye_height: 1.0,
            ..RuntimeConfig::default()
        };
        let mut rt = Runtime::new(engine, config);
        rt.load_level(&[]).unwrap();
        rt
    }

    #[test]
    fn no_tick_before_interval_elapses() {
        let mut rt = runtime_with(ScriptedEngine::step(vec![Vec3::ZERO]), 33.33);
        for now in [0.0, 10.0, 20.0, 30.0] {
            let frame = rt.frame(now).unwrap();
            assert!(!frame.ticked);
            assert!((0.0..=1.0).contains(&frame.fraction));
        }
        assert_eq!(rt.ticks_committed(), 0);
    }

    #[test]
    fn commits_interpolates_per_callback_sequence() {
        // 30 Hz ticks against ~60 Hz frames: commits land near 33 and 66ms,
        // the frames in between render purely interpolated.
        let mut rt = runtime_with(ScriptedEngine::step(vec![Vec3::ZERO; 4]), 33.33);
        let mut ticked = Vec::new();
        for now in [0.0, 16.0, 34.0, 50.0, 67.0] {
            ticked.push(rt.frame(now).unwrap().ticked);
        }
        assert_eq!(ticked, vec![false, false, true, false, true]);
        assert_eq!(rt.ticks_committed(), 2);
    }

    #[test]
    fn at_most_one_tick_per_callback() {
        // Frames arrive at a third of the tick rate; the accumulator catches
        // up one step per callback rather than bursting.
        let mut rt = runtime_with(ScriptedEngine::step(vec![Vec3::ZERO; 16]), 10.0);
        rt.frame(0.0).unwrap();
        for i in 1..=3 {
            let frame = rt.frame(f64::from(i) * 30.0).unwrap();
            assert!(frame.ticked);
        }
        assert_eq!(rt.ticks_committed(), 3);
        assert_eq!(rt.ticks_dropped(), 0);
    }

    #[test]
    fn fraction_endpoints_match_snapshots() {
        let engine = ScriptedEngine::new(
            vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)],
            vec![1.0, 3.0],
            vec![1, 1],
        );
        let mut rt = runtime_with(engine, 100.0);
        rt.frame(0.0).unwrap();
        assert!(rt.frame(101.0).unwrap().ticked); // snapshot A: fill 1.0, actor origin
        assert!(rt.frame(201.0).unwrap().ticked); // snapshot B: fill 3.0, actor (1,0,0)

        // t = 0: blended equals previous, recentred on the previous origin.
        let frame = rt.frame(200.0).unwrap();
        assert!(frame.fraction.abs() < EPSILON);
        for v in rt.blended_positions() {
            assert!((v - 1.0).abs() < EPSILON);
        }

        // t = 1: blended equals current, recentred on (1,0,0).
        let frame = rt.frame(300.0).unwrap();
        assert!((frame.fraction - 1.0).abs() < EPSILON);
        let blended = rt.blended_positions();
        for vertex in blended.chunks_exact(3) {
            assert!((vertex[0] - 2.0).abs() < EPSILON);
            assert!((vertex[1] - 3.0).abs() < EPSILON);
            assert!((vertex[2] - 3.0).abs() < EPSILON);
        }
    }

    #[test]
    fn halfway_sample_recentres_by_half_the_motion() {
        let engine = ScriptedEngine::new(
            vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)],
            vec![1.0, 3.0],
            vec![1, 1],
        );
        let mut rt = runtime_with(engine, 100.0);
        rt.frame(0.0).unwrap();
        rt.frame(101.0).unwrap();
        rt.frame(201.0).unwrap();

        let frame = rt.frame(250.0).unwrap();
        assert!((frame.fraction - 0.5).abs() < EPSILON);
        assert!((frame.mesh_origin.x - 0.5).abs() < EPSILON);
        // Geometry lerps to 2.0 everywhere, then the x components lose the
        // interpolated origin (0.5, 0, 0).
        for vertex in rt.blended_positions().chunks_exact(3) {
            assert!((vertex[0] - 1.5).abs() < EPSILON);
            assert!((vertex[1] - 2.0).abs() < EPSILON);
            assert!((vertex[2] - 2.0).abs() < EPSILON);
        }
    }

    #[test]
    fn stall_snaps_clock_instead_of_bursting() {
        let mut rt = runtime_with(ScriptedEngine::step(vec![Vec3::ZERO; 64]), 10.0);
        rt.frame(0.0).unwrap();
        rt.frame(5.0).unwrap();

        // 500ms gap, 50 intervals: one tick executes, the rest are dropped.
        let frame = rt.frame(500.0).unwrap();
        assert!(frame.ticked);
        assert_eq!(rt.ticks_committed(), 1);
        assert_eq!(rt.ticks_dropped(), 49);

        // Clock was snapped to 500, so the very next frame does not tick.
        let frame = rt.frame(505.0).unwrap();
        assert!(!frame.ticked);
        assert_eq!(rt.ticks_committed(), 1);
    }

    #[test]
    fn replay_all_policy_catches_up_across_callbacks() {
        let config = RuntimeConfig {
            tick_interval_ms: 10.0,
            stall_policy: StallPolicy::ReplayAll,
            spawn: Vec3::ZERO,
            ..RuntimeConfig::default()
        };
        let mut rt = Runtime::new(ScriptedEngine::step(vec![Vec3::ZERO; 64]), config);
        rt.load_level(&[]).unwrap();
        rt.frame(0.0).unwrap();

        // After the same 500ms stall every subsequent callback commits one
        // step until the backlog is worked off.
        for i in 0..5 {
            let frame = rt.frame(500.0 + f64::from(i)).unwrap();
            assert!(frame.ticked);
        }
        assert_eq!(rt.ticks_committed(), 5);
        assert_eq!(rt.ticks_dropped(), 0);
    }

    #[test]
    fn shrinking_triangle_count_masks_stale_prefix() {
        let engine = ScriptedEngine::new(
            vec![Vec3::ZERO, Vec3::ZERO],
            vec![1.0, 5.0],
            vec![2, 1],
        );
        let mut rt = runtime_with(engine, 100.0);
        rt.frame(0.0).unwrap();
        rt.frame(101.0).unwrap();
        rt.frame(201.0).unwrap();

        let frame = rt.frame(250.0).unwrap();
        assert_eq!(frame.triangles_used, 1);
        // Only the surviving triangle is exposed; the dropped one is gone.
        assert_eq!(rt.blended_positions().len(), TRI_FLOATS);
    }

    #[test]
    fn grown_triangle_count_takes_current_verbatim() {
        let engine = ScriptedEngine::new(
            vec![Vec3::ZERO, Vec3::ZERO],
            vec![1.0, 5.0],
            vec![1, 2],
        );
        let mut rt = runtime_with(engine, 100.0);
        rt.frame(0.0).unwrap();
        rt.frame(101.0).unwrap();
        rt.frame(201.0).unwrap();

        let frame = rt.frame(250.0).unwrap();
        assert_eq!(frame.triangles_used, 2);
        let blended = rt.blended_positions();
        // First triangle blends 1.0 -> 5.0; the new second triangle has no
        // previous counterpart and shows the current value unblended.
        for v in &blended[..TRI_FLOATS] {
            assert!((v - 3.0).abs() < EPSILON);
        }
        for v in &blended[TRI_FLOATS..] {
            assert!((v - 5.0).abs() < EPSILON);
        }
    }

    #[test]
    fn camera_rides_along_with_interpolated_origin() {
        let engine = ScriptedEngine::step(vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)]);
        let mut rt = runtime_with(engine, 100.0);
        rt.frame(0.0).unwrap();
        rt.frame(101.0).unwrap();
        rt.frame(201.0).unwrap();

        let quarter = rt.frame(225.0).unwrap();
        let half = rt.frame(250.0).unwrap();
        // Deltas accumulate the origin's motion frame over frame.
        assert!((quarter.camera_delta.x + half.camera_delta.x - 1.0).abs() < 0.1);
        assert!((half.look_target.x - half.mesh_origin.x).abs() < EPSILON);
        assert!((half.look_target.y - (half.mesh_origin.y + 1.0)).abs() < EPSILON);
    }

    #[test]
    fn failed_actor_spawn_degrades_without_halting() {
        let mut engine = ScriptedEngine::step(vec![Vec3::ZERO; 4]);
        engine.refuse_actor = true;
        let config = RuntimeConfig {
            tick_interval_ms: 10.0,
            spawn: Vec3::new(0.0, 2000.0, 0.0),
            ..RuntimeConfig::default()
        };
        let mut rt = Runtime::new(engine, config);
        rt.load_level(&[]).unwrap();
        assert!(!rt.has_actor());

        rt.frame(0.0).unwrap();
        let frame = rt.frame(11.0).unwrap();
        // The clock still advances but the engine is never stepped.
        assert!(frame.ticked);
        assert_eq!(frame.triangles_used, 0);
        assert!(rt.blended_positions().is_empty());
    }
}
