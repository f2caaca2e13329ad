use std::fmt::Write;

use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::Config,
    decode::OpCode,
    display::DisplayBuffer,
    error::Chip8Result,
    keyboard::Keypad,
    memory::{glyph_addr, Memory, Stack, TypeAddr, PROGRAM_START},
    registers::{Registers, FLAG},
};

/// What happened during a single instruction, for the caller driving the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The display buffer changed.
    Draw,
    /// No key is held during `Fx0A`; the program counter was rewound so the
    /// same instruction runs again next cycle.
    KeyWait,
    /// `2nnn` with a full call stack. The call was dropped.
    StackOverflow,
    /// `00EE` with an empty call stack. The return was dropped.
    StackUnderflow,
}

pub struct Emulator {
    pub regs: Registers,
    pub mem: Memory,
    keypad: Keypad,
    stack: Stack,
    fb: DisplayBuffer,
    rng: StdRng,
    trace: bool,
}

impl Emulator {
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Machine with a fixed random sequence for `Cxkk`.
    pub fn with_seed(config: &Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &Config, rng: StdRng) -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            keypad: Keypad::new(),
            stack: Stack::new(),
            fb: DisplayBuffer::new(),
            rng,
            trace: config.debug,
        }
    }

    /// Places a program at 0x200 and resets the processor state to power-on.
    pub fn load_program(&mut self, program: &[u8]) -> Chip8Result<()> {
        self.mem.load_program(program)?;
        self.regs = Registers::new();
        self.stack = Stack::new();
        self.fb.clear();

        info!("loaded {} byte program at {PROGRAM_START:03X}", program.len());
        Ok(())
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.fb
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack.pointer()
    }

    pub fn sound_active(&self) -> bool {
        self.regs.sound.is_active()
    }

    pub fn fetch_decode(&mut self) -> (TypeAddr, u16, OpCode) {
        let addr = self.regs.pc.0;
        let word = self.mem.read_word(addr);
        self.regs.pc.increment();
        (addr, word, OpCode::decode(word))
    }

    /// Fetches, decodes and executes one instruction.
    pub fn cycle(&mut self) -> Flow {
        let (addr, word, op) = self.fetch_decode();
        let flow = self.execute(op);

        if self.traces(flow) {
            debug!(
                "{addr:03X}: {word:04X}  {:<16} {}",
                op.to_string(),
                self.dump_registers()
            );
        }

        flow
    }

    /// Key wait retries are skipped; the instruction is traced once a key arrives.
    fn traces(&self, flow: Flow) -> bool {
        self.trace && flow != Flow::KeyWait
    }

    /// Decrements both timers. Driven by the refresh cadence.
    pub fn tick_timers(&mut self) {
        self.regs.delay.tick();
        self.regs.sound.tick();
    }

    pub fn execute(&mut self, op: OpCode) -> Flow {
        match op {
            OpCode::ClearScreen => self.fb.clear(),
            OpCode::Return => match self.stack.pop() {
                Some(addr) => self.regs.pc.set_addr(addr),
                None => {
                    warn!(
                        "stack underflow: return at {:03X} with empty stack",
                        self.regs.pc.0.wrapping_sub(2)
                    );
                    return Flow::StackUnderflow;
                }
            },
            OpCode::Jump(addr) => self.regs.pc.set_addr(addr),
            OpCode::Call(addr) => {
                // return to the instruction after the call
                if self.stack.push(self.regs.pc.0).is_err() {
                    warn!(
                        "stack overflow: call to {addr:03X} at {:03X} dropped",
                        self.regs.pc.0.wrapping_sub(2)
                    );
                    return Flow::StackOverflow;
                }
                self.regs.pc.set_addr(addr);
            }
            OpCode::SkipEqualConstant(vx, kk) => {
                if self.regs.get(vx) == kk {
                    self.regs.pc.increment();
                }
            }
            OpCode::SkipNotEqualConstant(vx, kk) => {
                if self.regs.get(vx) != kk {
                    self.regs.pc.increment();
                }
            }
            OpCode::SkipEqualRegister(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.regs.pc.increment();
                }
            }
            OpCode::SkipNotEqualRegister(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.regs.pc.increment();
                }
            }
            OpCode::SetRegister(vx, kk) => self.regs.set(vx, kk),
            OpCode::AddToRegister(vx, kk) => self.regs.add_wrapping(vx, kk),
            OpCode::CopyRegister(vx, vy) => self.regs.set(vx, self.regs.get(vy)),
            OpCode::Or(vx, vy) => self.regs.set(vx, self.regs.get(vx) | self.regs.get(vy)),
            OpCode::And(vx, vy) => self.regs.set(vx, self.regs.get(vx) & self.regs.get(vy)),
            OpCode::XOr(vx, vy) => self.regs.set(vx, self.regs.get(vx) ^ self.regs.get(vy)),
            // Flags come from operands captured before any write. VF is
            // written last so it holds the flag even when it is the destination.
            OpCode::Add(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let (sum, carry) = x.overflowing_add(y);
                self.regs.set(vx, sum);
                self.regs.set(FLAG, carry as u8);
            }
            OpCode::SubtractForward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set(vx, x.wrapping_sub(y));
                self.regs.set(FLAG, (x > y) as u8);
            }
            OpCode::SubtractBackward(vx, vy) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                self.regs.set(vx, y.wrapping_sub(x));
                self.regs.set(FLAG, (y > x) as u8);
            }
            OpCode::RightShift(vx) => {
                let x = self.regs.get(vx);
                self.regs.set(vx, x >> 1);
                self.regs.set(FLAG, x & 1);
            }
            OpCode::LeftShift(vx) => {
                let x = self.regs.get(vx);
                self.regs.set(vx, x << 1);
                self.regs.set(FLAG, (x >> 7) & 1);
            }
            OpCode::SetIndexRegister(addr) => self.regs.index.set_addr(addr),
            OpCode::JumpWithOffset(addr) => {
                let offset = self.regs.get(0x0) as u16;
                self.regs.pc.set_addr(addr.wrapping_add(offset));
            }
            OpCode::Random(vx, kk) => {
                let byte: u8 = self.rng.gen();
                self.regs.set(vx, kk & byte);
            }
            OpCode::Draw(vx, vy, height) => {
                let (x, y) = (self.regs.get(vx), self.regs.get(vy));
                let index = self.regs.index.0;

                // rows I..I+N, 8 pixels wide because u8
                let mut sprite = [0u8; 15];
                for (r, row) in sprite.iter_mut().enumerate().take(height as usize) {
                    *row = self.mem.read_byte(index.wrapping_add(r as u16));
                }

                let collision = self.fb.draw_sprite(x, y, &sprite[..height as usize]);
                self.regs.set(FLAG, collision as u8);
                return Flow::Draw;
            }
            OpCode::SkipIfPressed(vx) => {
                if self.keypad.is_pressed(self.regs.get(vx)) {
                    self.regs.pc.increment();
                }
            }
            OpCode::SkipIfNotPressed(vx) => {
                if !self.keypad.is_pressed(self.regs.get(vx)) {
                    self.regs.pc.increment();
                }
            }
            OpCode::CopyDelayToRegister(vx) => self.regs.set(vx, self.regs.delay.get()),
            OpCode::WaitKey(vx) => match self.keypad.first_pressed() {
                Some(key) => self.regs.set(vx, key),
                None => {
                    self.regs.pc.decrement();
                    return Flow::KeyWait;
                }
            },
            OpCode::CopyRegisterToDelay(vx) => self.regs.delay.set(self.regs.get(vx)),
            OpCode::CopyRegisterToSound(vx) => self.regs.sound.set(self.regs.get(vx)),
            OpCode::AddToIndex(vx) => {
                let addr = self.regs.index.0.wrapping_add(self.regs.get(vx) as u16);
                self.regs.index.set_addr(addr);
            }
            OpCode::PointChar(vx) => self.regs.index.set_addr(glyph_addr(self.regs.get(vx))),
            #[rustfmt::skip]
            OpCode::ToDecimal(vx) => {
                let addr = self.regs.index.0;
                let x = self.regs.get(vx);
                self.mem.write_byte(addr,                   x / 100);
                self.mem.write_byte(addr.wrapping_add(1),   x / 10 % 10);
                self.mem.write_byte(addr.wrapping_add(2),   x % 10);
            }
            OpCode::StoreRegisterToMemory(vx) => {
                let addr = self.regs.index.0;
                for reg in 0..=vx {
                    self.mem.write_byte(addr.wrapping_add(reg as u16), self.regs.get(reg));
                }
            }
            OpCode::LoadRegisterFromMemory(vx) => {
                let addr = self.regs.index.0;
                for reg in 0..=vx {
                    self.regs.set(reg, self.mem.read_byte(addr.wrapping_add(reg as u16)));
                }
            }
            OpCode::Unknown(_) => {}
        }

        Flow::Continue
    }
}

/// Troubleshooting
impl Emulator {
    pub fn dump_registers(&self) -> String {
        format!(
            "V={:02X?} I={:03X} SP={:X} DT={:02X} ST={:02X}",
            self.regs.all(),
            self.regs.index.0,
            self.stack.pointer(),
            self.regs.delay.get(),
            self.regs.sound.get(),
        )
    }

    pub fn dump_stack(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();

        for (slot, addr) in self.stack.addresses().iter().enumerate() {
            writeln!(buf, "|{slot:X}| {addr:03X}")?;
        }

        Ok(buf)
    }

    pub fn dump_display(&self) -> Result<String, std::fmt::Error> {
        self.fb.dump()
    }
}
