// Raw OS key state, independent of whichever input system the host uses.

// Windows virtual-key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum KeyCode {
    F1 = 0x70,
    F2 = 0x71,
    F3 = 0x72,
    F4 = 0x73,
    F5 = 0x74,
    F6 = 0x75,
    F7 = 0x76,
    F8 = 0x77,
}

pub trait KeyStateSource {
    fn is_down(&self, key: KeyCode) -> bool;
}

pub struct OsKeyState;

#[cfg(windows)]
impl KeyStateSource for OsKeyState {
    fn is_down(&self, key: KeyCode) -> bool {
        // High bit set while the key is held.
        let state = unsafe { winapi::um::winuser::GetKeyState(key as i32) };
        (state as u16 & 0x8000) != 0
    }
}

#[cfg(not(windows))]
impl KeyStateSource for OsKeyState {
    fn is_down(&self, _key: KeyCode) -> bool {
        false
    }
}

// Edge-triggered key: reports a press once per transition to down.
pub struct KeyboardKey {
    key: KeyCode,
    was_down: bool,
}

impl KeyboardKey {
    pub fn new(key: KeyCode) -> KeyboardKey {
        KeyboardKey {
            key: key,
            was_down: false,
        }
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn set_key(&mut self, key: KeyCode) {
        if key != self.key {
            self.key = key;
            self.was_down = false;
        }
    }

    pub fn update_is_down(&mut self, source: &dyn KeyStateSource) -> bool {
        let is_down = source.is_down(self.key);
        let pressed = is_down && !self.was_down;
        self.was_down = is_down;
        pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeKeys(Cell<bool>);

    impl KeyStateSource for FakeKeys {
        fn is_down(&self, key: KeyCode) -> bool {
            key == KeyCode::F3 && self.0.get()
        }
    }

    #[test]
    fn reports_each_press_once() {
        let keys = FakeKeys(Cell::new(false));
        let mut key = KeyboardKey::new(KeyCode::F3);
        assert!(!key.update_is_down(&keys));
        keys.0.set(true);
        assert!(key.update_is_down(&keys));
        assert!(!key.update_is_down(&keys));
        keys.0.set(false);
        assert!(!key.update_is_down(&keys));
        keys.0.set(true);
        assert!(key.update_is_down(&keys));
    }
}
