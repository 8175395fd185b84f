//! Fixed-capacity geometry buffers the engine fills in place each tick.

/// Maximum triangles the engine can emit per tick.
pub const GEO_MAX_TRIANGLES: usize = 1024;

/// Floats per triangle in the position/color/normal buffers (3 vertices × xyz).
pub const TRI_FLOATS: usize = 9;
/// Floats per triangle in the uv buffer (3 vertices × uv).
pub const TRI_UV_FLOATS: usize = 6;

/// The per-tick output of the simulation engine.
///
/// All four arrays are allocated once at full capacity and reused for the
/// process lifetime; the engine overwrites them wholesale each tick. Only
/// the first `triangles_used` triangles are valid — everything past that
/// prefix is stale data from earlier ticks and must not be drawn.
pub struct GeometryBuffer {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub triangles_used: u16,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self {
            positions: vec![0.0; GEO_MAX_TRIANGLES * TRI_FLOATS],
            colors: vec![0.0; GEO_MAX_TRIANGLES * TRI_FLOATS],
            normals: vec![0.0; GEO_MAX_TRIANGLES * TRI_FLOATS],
            uvs: vec![0.0; GEO_MAX_TRIANGLES * TRI_UV_FLOATS],
            triangles_used: 0,
        }
    }

    /// Number of valid floats in the position buffer.
    pub fn valid_position_floats(&self) -> usize {
        self.triangles_used as usize * TRI_FLOATS
    }
}

impl Default for GeometryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Level collision geometry, loaded once and handed to the renderer.
pub struct StaticGeometry {
    /// Flat triangle list, 9 floats per triangle.
    pub positions: Vec<f32>,
    pub triangle_count: usize,
}

impl StaticGeometry {
    pub fn from_triangles(triangles: &[[[f32; 3]; 3]]) -> Self {
        Self {
            positions: bytemuck::cast_slice(triangles).to_vec(),
            triangle_count: triangles.len(),
        }
    }

    /// The fallback level: one large ground triangle at y = 0, matching the
    /// surface libsm64 demos load when no real level data is available.
    pub fn default_ground() -> Self {
        Self::from_triangles(&[[
            [-1000.0, 0.0, 0.0],
            [1000.0, 0.0, 1000.0],
            [1000.0, 0.0, -1000.0],
        ]])
    }
}

/// Decoded player texture atlas returned by engine init.
pub struct TextureAtlas {
    pub width: u32,
    pub height: u32,
    /// RGBA8, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}
