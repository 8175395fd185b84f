//! KeyboardEvent.code to logical key mapping.

use webrio_core::input::Key;

/// Maps a browser `KeyboardEvent.code` to a logical key. Arrows and WASD
/// both steer; Space jumps, X kicks, Z crouches. Unknown codes are ignored
/// so the page keeps its own shortcuts.
pub fn map_key_code(code: &str) -> Option<Key> {
    match code {
        "ArrowUp" | "KeyW" => Some(Key::Up),
        "ArrowDown" | "KeyS" => Some(Key::Down),
        "ArrowLeft" | "KeyA" => Some(Key::Left),
        "ArrowRight" | "KeyD" => Some(Key::Right),
        "Space" => Some(Key::Jump),
        "KeyX" => Some(Key::Kick),
        "KeyZ" => Some(Key::Crouch),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_both_map() {
        assert_eq!(map_key_code("ArrowUp"), Some(Key::Up));
        assert_eq!(map_key_code("KeyW"), Some(Key::Up));
        assert_eq!(map_key_code("ArrowLeft"), Some(Key::Left));
        assert_eq!(map_key_code("KeyD"), Some(Key::Right));
    }

    #[test]
    fn unknown_codes_are_ignored() {
        assert_eq!(map_key_code("F5"), None);
        assert_eq!(map_key_code(""), None);
    }
}
