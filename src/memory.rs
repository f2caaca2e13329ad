use std::fmt::Write;

use crate::error::{Chip8Error, Chip8Result};

pub type TypeAddr = u16; // in reality u12

pub const MEM_SIZE: usize = 4096;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEM_SIZE - PROGRAM_START as usize; // 3584
pub const FONT_START: TypeAddr = 0x50;
pub const FONT_HEIGHT: u16 = 5;
pub const STACK_SIZE: usize = 16;

type FontBytes = [u8; FONT_HEIGHT as usize * 16];

const DEFAULT_FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Address of the built-in glyph for a hex digit.
pub fn glyph_addr(digit: u8) -> TypeAddr {
    FONT_START + digit as u16 * FONT_HEIGHT
}

/// Flat 4K address space.
///
/// Font glyphs live at 050..0A0 (000..050 is empty by convention), programs
/// are loaded at 200. Addresses wrap at 4K, so out of range accesses land
/// back inside the bank instead of panicking.
#[derive(Clone)]
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEM_SIZE];
        let start = FONT_START as usize;
        bytes[start..start + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);
        Self { bytes }
    }

    #[inline]
    fn offset(addr: TypeAddr) -> usize {
        addr as usize & (MEM_SIZE - 1)
    }

    pub fn read_byte(&self, addr: TypeAddr) -> u8 {
        self.bytes[Self::offset(addr)]
    }

    pub fn write_byte(&mut self, addr: TypeAddr, val: u8) {
        self.bytes[Self::offset(addr)] = val;
    }

    /// Instructions are stored big-endian.
    pub fn read_word(&self, addr: TypeAddr) -> u16 {
        let (hi, lo) = (self.read_byte(addr), self.read_byte(addr.wrapping_add(1)));
        ((hi as u16) << 8) | lo as u16
    }

    /// Copies program bytes verbatim to 0x200.
    ///
    /// Anything left over from a previous program is zeroed first.
    pub fn load_program(&mut self, program: &[u8]) -> Chip8Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: program.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }

        let start = PROGRAM_START as usize;
        self.bytes[start..].fill(0);
        self.bytes[start..start + program.len()].copy_from_slice(program);

        Ok(())
    }

    /// Hex dump of `len` bytes starting at `start`, 16 bytes per line.
    pub fn dump(&self, start: TypeAddr, len: usize) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();

        for row in (0..len).step_by(16) {
            let addr = start.wrapping_add(row as u16);
            write!(buf, "{:03X}:", Self::offset(addr))?;
            for col in 0..16usize.min(len - row) {
                write!(buf, " {:02X}", self.read_byte(addr.wrapping_add(col as u16)))?;
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Subroutine return addresses, indexed by the stack pointer.
#[derive(Debug, Clone)]
pub struct Stack {
    addresses: [TypeAddr; STACK_SIZE],
    sp: u8,
}

/// The call could not be pushed, the stack is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackOverflow;

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: [0; STACK_SIZE],
            sp: 0,
        }
    }

    pub fn pointer(&self) -> u8 {
        self.sp
    }

    pub fn addresses(&self) -> &[TypeAddr] {
        &self.addresses[..self.sp as usize]
    }

    /// At most 15 return addresses are held; the last slot stays unused.
    pub fn push(&mut self, addr: TypeAddr) -> Result<(), StackOverflow> {
        if self.sp as usize >= STACK_SIZE - 1 {
            return Err(StackOverflow);
        }
        self.addresses[self.sp as usize] = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<TypeAddr> {
        if self.sp == 0 {
            return None;
        }
        self.sp -= 1;
        Some(self.addresses[self.sp as usize])
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
