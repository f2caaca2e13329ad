pub const KEY_COUNT: usize = 16;

/// Order in which a wait-for-key instruction looks for a held key.
pub const KEY_SCAN_ORDER: [u8; KEY_COUNT] = [
    0x1, 0x2, 0x3, 0x4, 0x5, 0x6, 0x7, 0x8, 0x9, 0xA, 0x0, 0xB, 0xC, 0xD, 0xE, 0xF,
];

/// Hex keypad, one flag per key 0x0 to 0xF.
///
/// Only the host input layer writes to it, and it only ever sees hex digits.
/// Key numbers are masked to their low nibble.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    pub fn set_pressed(&mut self, key: u8, pressed: bool) {
        self.keys[(key & 0xF) as usize] = pressed;
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[(key & 0xF) as usize]
    }

    /// First held key in scan order.
    pub fn first_pressed(&self) -> Option<u8> {
        KEY_SCAN_ORDER
            .iter()
            .copied()
            .find(|key| self.is_pressed(*key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release() {
        let mut keypad = Keypad::new();
        assert!(!keypad.is_pressed(0xE));
        keypad.set_pressed(0xE, true);
        assert!(keypad.is_pressed(0xE));
        assert_eq!(keypad.first_pressed(), Some(0xE));
        keypad.set_pressed(0xE, false);
        assert!(!keypad.is_pressed(0xE));
    }

    #[test]
    fn test_scan_order() {
        let mut keypad = Keypad::new();
        assert_eq!(keypad.first_pressed(), None);

        keypad.set_pressed(0xF, true);
        keypad.set_pressed(0x0, true);
        assert_eq!(keypad.first_pressed(), Some(0x0));

        // A is scanned before 0
        keypad.set_pressed(0xA, true);
        assert_eq!(keypad.first_pressed(), Some(0xA));

        keypad.set_pressed(0x9, true);
        assert_eq!(keypad.first_pressed(), Some(0x9));

        keypad.reset();
        assert_eq!(keypad.first_pressed(), None);
    }

    #[test]
    fn test_scan_order_covers_every_key() {
        let mut seen = [false; KEY_COUNT];
        for key in KEY_SCAN_ORDER {
            seen[key as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
