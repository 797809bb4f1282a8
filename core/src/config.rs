/// What the CPU does when it fetches a word it can't decode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// Log it and leave the program counter where it is; the word is fetched again next cycle.
    #[default]
    Stall,
    /// Log it and move on to the next instruction.
    Skip,
    /// Stop with `Chip8Error::UnknownOpcode`.
    Fault,
}

/// How sprite pixels that run off the edge of the screen are placed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SpriteWrap {
    /// Treat the frame buffer as one 2048 cell strip: running off the right edge
    /// continues on the next row, running off the bottom continues at the top.
    #[default]
    Linear,
    /// Wrap columns and rows independently.
    PerAxis,
}

/// Behaviour switches for the places where Chip-8 interpreters disagree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub unknown_opcode: UnknownOpcodePolicy,
    pub sprite_wrap: SpriteWrap,
}
