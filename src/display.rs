use std::fmt::Write;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// 64x32 monochrome frame, row-major, one bool per pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    bit_buffer: [bool; WIDTH * HEIGHT],
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self {
            bit_buffer: [false; WIDTH * HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        self.bit_buffer = [false; WIDTH * HEIGHT];
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.bit_buffer[y * WIDTH + x]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.bit_buffer
    }

    pub fn is_blank(&self) -> bool {
        self.bit_buffer.iter().all(|px| !px)
    }

    /// XOR a sprite onto the buffer, one byte per row, most significant bit leftmost.
    ///
    /// The origin wraps onto the screen; the sprite itself does not. Rows
    /// past the bottom edge stop the draw and columns past the right edge are
    /// clipped. Returns true if any lit pixel was switched off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let (x0, y0) = (x as usize % WIDTH, y as usize % HEIGHT);
        let mut collision = false;

        for (r, row) in sprite.iter().enumerate() {
            let ny = y0 + r;
            if ny >= HEIGHT {
                break;
            }
            for c in 0..8 {
                let nx = x0 + c;
                if nx >= WIDTH {
                    break;
                }
                if (row >> (7 - c)) & 1 == 0 {
                    continue;
                }
                let index = ny * WIDTH + nx;
                // XOR erases a pixel when both old and new are lit.
                collision |= self.bit_buffer[index];
                self.bit_buffer[index] ^= true;
            }
        }

        collision
    }

    /// Renders the frame as text, `#` for lit pixels and `.` for dark ones.
    pub fn dump(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::with_capacity((WIDTH + 1) * HEIGHT);

        for row in self.bit_buffer.chunks(WIDTH) {
            for px in row {
                buf.write_char(if *px { '#' } else { '.' })?;
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DisplayBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.bit_buffer.iter().filter(|px| **px).count();
        write!(f, "DisplayBuffer {{ lit: {lit} }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_full_row() {
        let mut fb = DisplayBuffer::new();
        assert!(!fb.draw_sprite(0, 0, &[0b1111_1111]));
        for x in 0..8 {
            assert!(fb.get(x, 0));
        }
        assert!(!fb.get(8, 0));
        assert!(!fb.get(0, 1));

        // drawing again erases every pixel, which counts as a collision
        assert!(fb.draw_sprite(0, 0, &[0b1111_1111]));
        assert!(fb.is_blank());
    }

    #[test]
    fn test_zero_bits_dont_erase() {
        let mut fb = DisplayBuffer::new();
        assert!(!fb.draw_sprite(4, 0, &[0b1111_0000]));
        assert!(!fb.draw_sprite(0, 0, &[0b1111_0000]));
        assert!(fb.get(0, 0));
        assert!(fb.get(4, 0));
    }

    #[test]
    fn test_xor_pattern() {
        let mut fb = DisplayBuffer::new();
        fb.draw_sprite(0, 0, &[0b0101_0000]);
        let collided = fb.draw_sprite(0, 0, &[0b1100_0000]);
        assert!(collided);
        assert_eq!(
            (0..4).map(|x| fb.get(x, 0)).collect::<Vec<_>>(),
            vec![true, false, false, true]
        );
    }

    #[test]
    fn test_origin_wraps() {
        let mut fb = DisplayBuffer::new();
        fb.draw_sprite(64 + 2, 32 + 3, &[0b1000_0000]);
        assert!(fb.get(2, 3));
    }

    #[test]
    fn test_bottom_rows_clipped() {
        let mut fb = DisplayBuffer::new();
        fb.draw_sprite(0, 30, &[0x80, 0x80, 0x80, 0x80]);
        assert!(fb.get(0, 30));
        assert!(fb.get(0, 31));
        // no second wrap back to the top
        assert!(!fb.get(0, 0));
        assert!(!fb.get(0, 1));
    }

    #[test]
    fn test_right_columns_clipped() {
        let mut fb = DisplayBuffer::new();
        fb.draw_sprite(60, 0, &[0xFF]);
        for x in 60..64 {
            assert!(fb.get(x, 0));
        }
        assert!(!fb.get(0, 0));
        assert!(!fb.get(0, 1));
        assert_eq!(fb.pixels().iter().filter(|px| **px).count(), 4);
    }

    #[test]
    fn test_clear() {
        let mut fb = DisplayBuffer::new();
        fb.draw_sprite(10, 10, &[0xFF, 0xFF]);
        fb.clear();
        assert!(fb.is_blank());
    }

    #[test]
    fn test_dump() {
        let mut fb = DisplayBuffer::new();
        fb.draw_sprite(0, 0, &[0b1010_0000]);
        let dump = fb.dump().unwrap();
        let first = dump.lines().next().unwrap();
        assert_eq!(first.len(), WIDTH);
        assert!(first.starts_with("#.#."));
        assert_eq!(dump.lines().count(), HEIGHT);
    }
}
