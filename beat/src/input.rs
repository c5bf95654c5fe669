use std::collections::HashSet;

use crate::math::Vec2;

/// Keys the game reacts to. Anything else still counts as "a key".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Space,
    Enter,
    Other(u32),
}

/// Tracks keyboard and pointer state across frames.
///
/// The platform layer feeds raw events in between frames; the engine clears
/// the per-frame pressed/released flags once every system has seen them.
#[derive(Clone, Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
    keys_pressed: HashSet<Key>,
    keys_released: HashSet<Key>,

    pointer: Vec2,
    pointer_down: bool,
    pointer_pressed: bool,
    pointer_released: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame pressed/released flags.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.pointer_pressed = false;
        self.pointer_released = false;
    }

    pub fn press_key(&mut self, key: Key) {
        if self.keys_down.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn release_key(&mut self, key: Key) {
        if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    /// Pointer moved to `position`, in screen pixels with y pointing down.
    pub fn move_pointer(&mut self, position: Vec2) {
        self.pointer = position;
    }

    pub fn press_pointer(&mut self, position: Vec2) {
        self.pointer = position;
        if !self.pointer_down {
            self.pointer_pressed = true;
        }
        self.pointer_down = true;
    }

    pub fn release_pointer(&mut self) {
        if self.pointer_down {
            self.pointer_released = true;
        }
        self.pointer_down = false;
    }

    /// Returns true if the key is currently held down.
    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn is_key_released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn any_key_pressed(&self) -> bool {
        !self.keys_pressed.is_empty()
    }

    pub fn any_key_released(&self) -> bool {
        !self.keys_released.is_empty()
    }

    pub fn is_touched(&self) -> bool {
        self.pointer_down
    }

    pub fn is_touch_started(&self) -> bool {
        self.pointer_pressed
    }

    pub fn is_touch_released(&self) -> bool {
        self.pointer_released
    }

    /// Current pointer position in screen pixels.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_and_release_flags() {
        let mut input = InputState::new();
        input.press_key(Key::Left);
        input.press_key(Key::Left);
        assert!(input.is_key_pressed(Key::Left));
        assert!(input.is_key_down(Key::Left));

        input.begin_frame();
        assert!(!input.is_key_pressed(Key::Left));
        assert!(input.is_key_down(Key::Left));

        input.release_key(Key::Left);
        assert!(input.is_key_released(Key::Left));
        assert!(!input.is_key_down(Key::Left));
    }

    #[test]
    fn test_pointer_lifecycle() {
        let mut input = InputState::new();
        input.press_pointer(Vec2::new(10.0, 20.0));
        assert!(input.is_touch_started() && input.is_touched());
        input.begin_frame();
        input.move_pointer(Vec2::new(15.0, 20.0));
        assert!(!input.is_touch_started());
        assert_eq!(input.pointer(), Vec2::new(15.0, 20.0));
        input.release_pointer();
        assert!(input.is_touch_released() && !input.is_touched());
    }
}
