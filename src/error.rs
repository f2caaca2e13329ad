//! Result and errors.

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    /// Attempt to load a program that can't fit between 0x200 and the end of memory.
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    /// A render or audio collaborator failed.
    #[error("host error: {0}")]
    Host(String),
}
