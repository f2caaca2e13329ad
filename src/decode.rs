use std::fmt;

use crate::memory::TypeAddr;

/// Operand fields of a raw instruction word.
///
/// ```text
///  op   x    y    n
/// 1101 0001 0010 0101   D125
///           |-- kk --|
///      |---- nnn ----|
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInstruction(pub u16);

impl RawInstruction {
    /// Nibble `n`, counted from the most significant.
    pub fn nibble(&self, n: u8) -> u8 {
        let shift = (3 - n) * 4;
        ((self.0 >> shift) & 0xF) as u8
    }

    pub fn family(&self) -> u8 {
        self.nibble(0)
    }

    pub fn x(&self) -> u8 {
        self.nibble(1)
    }

    pub fn y(&self) -> u8 {
        self.nibble(2)
    }

    pub fn n(&self) -> u8 {
        self.nibble(3)
    }

    pub fn kk(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn nnn(&self) -> TypeAddr {
        self.0 & 0xFFF
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    // 00E0
    ClearScreen,
    // 00EE
    Return,
    // 1NNN
    Jump(TypeAddr),
    // 2NNN
    Call(TypeAddr),

    // 3XKK
    SkipEqualConstant(u8, u8),
    // 4XKK
    SkipNotEqualConstant(u8, u8),
    // 5XY0
    SkipEqualRegister(u8, u8),
    // 9XY0
    SkipNotEqualRegister(u8, u8),

    // 6XKK
    SetRegister(u8, u8),
    // 7XKK
    // carry flag is untouched
    AddToRegister(u8, u8),

    // 8XY0
    CopyRegister(u8, u8),
    // 8XY1
    Or(u8, u8),
    // 8XY2
    And(u8, u8),
    // 8XY3
    XOr(u8, u8),
    /// 8XY4, VF = carry
    Add(u8, u8),
    /// 8XY5, VF = Vx > Vy
    SubtractForward(u8, u8),
    /// 8XY6, VF = shifted out bit, Vy unused
    RightShift(u8),
    /// 8XY7, VF = Vy > Vx
    SubtractBackward(u8, u8),
    /// 8XYE, VF = shifted out bit, Vy unused
    LeftShift(u8),

    // ANNN
    SetIndexRegister(TypeAddr),
    // BNNN
    JumpWithOffset(TypeAddr),
    // CXKK
    Random(u8, u8),
    // DXYN
    // draw an N pixel tall sprite from I at (VX, VY), VF = collision
    Draw(u8, u8, u8),

    // EX9E
    SkipIfPressed(u8),
    // EXA1
    SkipIfNotPressed(u8),

    // FX07
    CopyDelayToRegister(u8),
    // FX0A
    WaitKey(u8),
    // FX15
    CopyRegisterToDelay(u8),
    // FX18
    CopyRegisterToSound(u8),
    // FX1E
    AddToIndex(u8),
    // FX29
    PointChar(u8),
    // FX33
    ToDecimal(u8),
    // FX55
    StoreRegisterToMemory(u8),
    // FX65
    LoadRegisterFromMemory(u8),

    /// Anything outside the base instruction set, executed as a no-op.
    Unknown(u16),
}

impl OpCode {
    pub fn decode(word: u16) -> Self {
        let raw = RawInstruction(word);
        let (x, y) = (raw.x(), raw.y());

        match raw.family() {
            0x0 => match word {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::Return,
                _ => Self::Unknown(word),
            },
            0x1 => Self::Jump(raw.nnn()),
            0x2 => Self::Call(raw.nnn()),
            0x3 => Self::SkipEqualConstant(x, raw.kk()),
            0x4 => Self::SkipNotEqualConstant(x, raw.kk()),
            0x5 if raw.n() == 0 => Self::SkipEqualRegister(x, y),
            0x6 => Self::SetRegister(x, raw.kk()),
            0x7 => Self::AddToRegister(x, raw.kk()),
            0x8 => match raw.n() {
                0x0 => Self::CopyRegister(x, y),
                0x1 => Self::Or(x, y),
                0x2 => Self::And(x, y),
                0x3 => Self::XOr(x, y),
                0x4 => Self::Add(x, y),
                0x5 => Self::SubtractForward(x, y),
                0x6 => Self::RightShift(x),
                0x7 => Self::SubtractBackward(x, y),
                0xE => Self::LeftShift(x),
                _ => Self::Unknown(word),
            },
            0x9 if raw.n() == 0 => Self::SkipNotEqualRegister(x, y),
            0xA => Self::SetIndexRegister(raw.nnn()),
            0xB => Self::JumpWithOffset(raw.nnn()),
            0xC => Self::Random(x, raw.kk()),
            0xD => Self::Draw(x, y, raw.n()),
            0xE => match raw.kk() {
                0x9E => Self::SkipIfPressed(x),
                0xA1 => Self::SkipIfNotPressed(x),
                _ => Self::Unknown(word),
            },
            0xF => match raw.kk() {
                0x07 => Self::CopyDelayToRegister(x),
                0x0A => Self::WaitKey(x),
                0x15 => Self::CopyRegisterToDelay(x),
                0x18 => Self::CopyRegisterToSound(x),
                0x1E => Self::AddToIndex(x),
                0x29 => Self::PointChar(x),
                0x33 => Self::ToDecimal(x),
                0x55 => Self::StoreRegisterToMemory(x),
                0x65 => Self::LoadRegisterFromMemory(x),
                _ => Self::Unknown(word),
            },
            _ => Self::Unknown(word),
        }
    }
}

/// Assembly style mnemonics, used by the instruction trace.
impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ClearScreen => write!(f, "CLS"),
            Self::Return => write!(f, "RET"),
            Self::Jump(nnn) => write!(f, "JP {nnn:03X}"),
            Self::Call(nnn) => write!(f, "CALL {nnn:03X}"),
            Self::SkipEqualConstant(x, kk) => write!(f, "SE V{x:X}, {kk:02X}"),
            Self::SkipNotEqualConstant(x, kk) => write!(f, "SNE V{x:X}, {kk:02X}"),
            Self::SkipEqualRegister(x, y) => write!(f, "SE V{x:X}, V{y:X}"),
            Self::SkipNotEqualRegister(x, y) => write!(f, "SNE V{x:X}, V{y:X}"),
            Self::SetRegister(x, kk) => write!(f, "LD V{x:X}, {kk:02X}"),
            Self::AddToRegister(x, kk) => write!(f, "ADD V{x:X}, {kk:02X}"),
            Self::CopyRegister(x, y) => write!(f, "LD V{x:X}, V{y:X}"),
            Self::Or(x, y) => write!(f, "OR V{x:X}, V{y:X}"),
            Self::And(x, y) => write!(f, "AND V{x:X}, V{y:X}"),
            Self::XOr(x, y) => write!(f, "XOR V{x:X}, V{y:X}"),
            Self::Add(x, y) => write!(f, "ADD V{x:X}, V{y:X}"),
            Self::SubtractForward(x, y) => write!(f, "SUB V{x:X}, V{y:X}"),
            Self::RightShift(x) => write!(f, "SHR V{x:X}"),
            Self::SubtractBackward(x, y) => write!(f, "SUBN V{x:X}, V{y:X}"),
            Self::LeftShift(x) => write!(f, "SHL V{x:X}"),
            Self::SetIndexRegister(nnn) => write!(f, "LD I, {nnn:03X}"),
            Self::JumpWithOffset(nnn) => write!(f, "JP V0, {nnn:03X}"),
            Self::Random(x, kk) => write!(f, "RND V{x:X}, {kk:02X}"),
            Self::Draw(x, y, n) => write!(f, "DRW V{x:X}, V{y:X}, {n:X}"),
            Self::SkipIfPressed(x) => write!(f, "SKP V{x:X}"),
            Self::SkipIfNotPressed(x) => write!(f, "SKNP V{x:X}"),
            Self::CopyDelayToRegister(x) => write!(f, "LD V{x:X}, DT"),
            Self::WaitKey(x) => write!(f, "LD V{x:X}, K"),
            Self::CopyRegisterToDelay(x) => write!(f, "LD DT, V{x:X}"),
            Self::CopyRegisterToSound(x) => write!(f, "LD ST, V{x:X}"),
            Self::AddToIndex(x) => write!(f, "ADD I, V{x:X}"),
            Self::PointChar(x) => write!(f, "LD F, V{x:X}"),
            Self::ToDecimal(x) => write!(f, "LD B, V{x:X}"),
            Self::StoreRegisterToMemory(x) => write!(f, "LD [I], V{x:X}"),
            Self::LoadRegisterFromMemory(x) => write!(f, "LD V{x:X}, [I]"),
            Self::Unknown(word) => write!(f, "??? {word:04X}"),
        }
    }
}
