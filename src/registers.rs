use crate::memory::{TypeAddr, PROGRAM_START};
use crate::timer::Timer;

/// Index of the flag register VF.
pub const FLAG: u8 = 0xF;

pub const REGISTER_COUNT: usize = 16;

/// Register file: V0 to VF, the index register, the program counter and both timers.
///
/// Register numbers come out of 4-bit opcode fields, so they are always in range.
#[derive(Debug, Clone)]
pub struct Registers {
    registers: [u8; REGISTER_COUNT],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub delay: Timer,
    pub sound: Timer,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            registers: [0; REGISTER_COUNT],
            pc: ProgramCounter(PROGRAM_START),
            index: IndexRegister(0x0),
            delay: Timer::default(),
            sound: Timer::default(),
        }
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[reg_num as usize]
    }

    pub fn set(&mut self, reg_num: u8, value: u8) {
        self.registers[reg_num as usize] = value;
    }

    pub fn add_wrapping(&mut self, reg_num: u8, value: u8) {
        let reg = &mut self.registers[reg_num as usize];
        *reg = reg.wrapping_add(value);
    }

    pub fn all(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    /// Clears V0 to VF, leaving the special registers alone.
    pub fn clear(&mut self) {
        self.registers = [0; REGISTER_COUNT];
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    /// Moves past one instruction word.
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    /// Moves back one instruction word, so it is fetched again.
    pub fn decrement(&mut self) {
        self.0 = self.0.wrapping_sub(2);
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_state() {
        let regs = Registers::new();
        assert!(regs.all().iter().all(|v| *v == 0));
        assert_eq!(regs.pc.0, 0x200);
        assert_eq!(regs.index.0, 0);
        assert_eq!(regs.delay.get(), 0);
        assert_eq!(regs.sound.get(), 0);
    }

    #[test]
    fn test_add_wraps() {
        let mut regs = Registers::new();
        regs.set(0x3, 0xFF);
        regs.add_wrapping(0x3, 0x02);
        assert_eq!(regs.get(0x3), 0x01);
        assert_eq!(regs.get(FLAG), 0);
    }

    #[test]
    fn test_pc_step() {
        let mut pc = ProgramCounter(0x200);
        pc.increment();
        assert_eq!(pc.0, 0x202);
        pc.decrement();
        assert_eq!(pc.0, 0x200);
    }
}
