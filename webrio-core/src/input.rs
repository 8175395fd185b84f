//! Keyboard state tracking and mapping to the engine's input block.

use glam::Vec2;

/// Logical keys the runtime responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Jump,
    Kick,
    Crouch,
}

const KEY_COUNT: usize = 7;

impl Key {
    fn index(self) -> usize {
        match self {
            Key::Up => 0,
            Key::Down => 1,
            Key::Left => 2,
            Key::Right => 3,
            Key::Jump => 4,
            Key::Kick => 5,
            Key::Crouch => 6,
        }
    }
}

/// Set of currently-held keys, updated by press/release events.
///
/// Browser key-repeat fires `keydown` continuously while a key is held;
/// press is therefore idempotent.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeldKeys {
    down: [bool; KEY_COUNT],
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.down[key.index()] = true;
    }

    pub fn release(&mut self, key: Key) {
        self.down[key.index()] = false;
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down[key.index()]
    }
}

/// One tick's worth of engine input. Built fresh from the held-key set at
/// every tick boundary; has no identity of its own.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Camera look direction in the XZ plane (unit vector).
    pub cam_look: Vec2,
    /// Analog stick, each axis in [-1, 1], camera-relative.
    pub stick: Vec2,
    pub button_a: bool,
    pub button_b: bool,
    pub button_z: bool,
}

/// Maps held keys to an input frame, given the camera heading in radians.
///
/// Opposing keys cancel per axis. The resulting vector is rotated into
/// camera space so movement is relative to the current view, then
/// normalized to unit length when non-zero (diagonals are not faster).
/// Pure function of its arguments.
pub fn map_input(held: &HeldKeys, camera_heading: f32) -> InputFrame {
    let mut stick = Vec2::ZERO;
    if held.is_down(Key::Left) {
        stick.x -= 1.0;
    }
    if held.is_down(Key::Right) {
        stick.x += 1.0;
    }
    if held.is_down(Key::Up) {
        stick.y -= 1.0;
    }
    if held.is_down(Key::Down) {
        stick.y += 1.0;
    }

    let (sin, cos) = camera_heading.sin_cos();
    let rotated = Vec2::new(stick.x * cos - stick.y * sin, stick.x * sin + stick.y * cos);
    let stick = if rotated.length_squared() > 0.0 {
        rotated.normalize()
    } else {
        Vec2::ZERO
    };

    InputFrame {
        cam_look: Vec2::new(cos, sin),
        stick,
        button_a: held.is_down(Key::Jump),
        button_b: held.is_down(Key::Kick),
        button_z: held.is_down(Key::Crouch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn press_is_idempotent() {
        let mut held = HeldKeys::new();
        held.press(Key::Left);
        held.press(Key::Left);
        assert!(held.is_down(Key::Left));
        held.release(Key::Left);
        assert!(!held.is_down(Key::Left));
    }

    #[test]
    fn mapping_is_deterministic() {
        let mut held = HeldKeys::new();
        held.press(Key::Up);
        held.press(Key::Jump);
        let a = map_input(&held, 0.7);
        let b = map_input(&held, 0.7);
        assert_eq!(a, b);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut held = HeldKeys::new();
        held.press(Key::Left);
        held.press(Key::Right);
        let frame = map_input(&held, 0.0);
        assert!(frame.stick.x.abs() < EPSILON);
        assert!(frame.stick.y.abs() < EPSILON);

        held.press(Key::Up);
        held.press(Key::Down);
        let frame = map_input(&held, 0.0);
        assert!(frame.stick.length() < EPSILON);
    }

    #[test]
    fn stick_is_unit_length_when_nonzero() {
        let mut held = HeldKeys::new();
        held.press(Key::Up);
        held.press(Key::Right);
        let frame = map_input(&held, 0.0);
        assert!((frame.stick.length() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn stick_rotates_with_camera_heading() {
        let mut held = HeldKeys::new();
        held.press(Key::Right);
        let quarter = std::f32::consts::FRAC_PI_2;
        let frame = map_input(&held, quarter);
        // (1, 0) rotated a quarter turn lands on (0, 1).
        assert!(frame.stick.x.abs() < 1e-5);
        assert!((frame.stick.y - 1.0).abs() < 1e-5);
        assert!(frame.cam_look.x.abs() < 1e-5);
        assert!((frame.cam_look.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn buttons_map_directly() {
        let mut held = HeldKeys::new();
        held.press(Key::Jump);
        held.press(Key::Crouch);
        let frame = map_input(&held, 0.0);
        assert!(frame.button_a);
        assert!(!frame.button_b);
        assert!(frame.button_z);
    }
}
