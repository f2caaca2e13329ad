use chip8vm::{
    display::{HEIGHT, WIDTH},
    prelude::*,
};
use minifb::{Key, Scale, Window, WindowOptions};

use crate::sound::Buzzer;

const OFF: u32 = 0x000000;
const ON: u32 = 0x007FFF;

/// Host keys laid out like the hex keypad:
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// Q W E R  ->  4 5 6 D
/// A S D F      7 8 9 E
/// Z X C V      A 0 B F
/// ```
const KEY_MAP: [(Key, u8); 16] = [
    (Key::Key1, 0x1),
    (Key::Key2, 0x2),
    (Key::Key3, 0x3),
    (Key::Key4, 0xC),
    (Key::Q, 0x4),
    (Key::W, 0x5),
    (Key::E, 0x6),
    (Key::R, 0xD),
    (Key::A, 0x7),
    (Key::S, 0x8),
    (Key::D, 0x9),
    (Key::F, 0xE),
    (Key::Z, 0xA),
    (Key::X, 0x0),
    (Key::C, 0xB),
    (Key::V, 0xF),
];

pub fn key_to_num(key: Key) -> Option<u8> {
    KEY_MAP
        .iter()
        .find(|(host_key, _)| *host_key == key)
        .map(|(_, num)| *num)
}

/// minifb window that presents frames, reads the keyboard and owns the buzzer.
pub struct WindowHost {
    window: Window,
    pixel_buffer: Vec<u32>,
    buzzer: Buzzer,
}

impl WindowHost {
    pub fn new(title: &str) -> Chip8Result<Self> {
        let mut window = Window::new(
            title,
            WIDTH,
            HEIGHT,
            WindowOptions {
                scale: Scale::X16,
                ..WindowOptions::default()
            },
        )
        .map_err(|err| Chip8Error::Host(err.to_string()))?;
        // the scheduler owns timing
        window.limit_update_rate(None);

        Ok(Self {
            window,
            pixel_buffer: vec![OFF; WIDTH * HEIGHT],
            buzzer: Buzzer::new(),
        })
    }
}

impl Host for WindowHost {
    fn poll(&mut self, keypad: &mut Keypad) -> HostSignal {
        // pumps pending window events without drawing
        self.window.update();

        if !self.window.is_open() || self.window.is_key_down(Key::Escape) {
            return HostSignal::Quit;
        }

        keypad.reset();
        for num in self.window.get_keys().into_iter().filter_map(key_to_num) {
            keypad.set_pressed(num, true);
        }

        HostSignal::Continue
    }

    fn present(&mut self, display: &DisplayBuffer) -> Chip8Result<()> {
        for (px, lit) in self.pixel_buffer.iter_mut().zip(display.pixels()) {
            *px = if *lit { ON } else { OFF };
        }

        self.window
            .update_with_buffer(&self.pixel_buffer, WIDTH, HEIGHT)
            .map_err(|err| Chip8Error::Host(err.to_string()))
    }

    fn buzz(&mut self, on: bool) {
        self.buzzer.set(on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_map_is_one_to_one() {
        let mut seen = [false; 16];
        for (_, num) in KEY_MAP {
            assert!(!seen[num as usize]);
            seen[num as usize] = true;
        }
        assert_eq!(key_to_num(Key::Key4), Some(0xC));
        assert_eq!(key_to_num(Key::X), Some(0x0));
        assert_eq!(key_to_num(Key::P), None);
    }
}
