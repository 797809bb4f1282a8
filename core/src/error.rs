use thiserror::Error;

/// Everything that can stop a Chip-8 from loading or executing an instruction.
///
/// An instruction that fails leaves the machine state exactly as it was before the cycle.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unable to read ROM: {0}")]
    Io(#[from] std::io::Error),

    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("program counter {pc:#06X} has no instruction to fetch")]
    ProgramCounterOutOfBounds { pc: u16 },

    #[error("memory access of {len} bytes at {address:#06X} is out of bounds")]
    MemoryOutOfBounds { address: u16, len: usize },

    #[error("stack overflow: call at {pc:#06X} with a full call stack")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("unknown opcode {opcode:#06X} at {pc:#06X}")]
    UnknownOpcode { opcode: u16, pc: u16 },

    #[error("key {key:#04X} is not on the keypad")]
    InvalidKey { key: u8 },
}
