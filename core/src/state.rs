use crate::constants::{
    DISPLAY_SIZE, KEY_COUNT, MEMORY_SIZE, PROGRAM_START, REGISTER_COUNT, SPRITE_SHEET, STACK_DEPTH,
};
use crate::error::Chip8Error;
use crate::opcode;

/// The FrameBuffer is a flat row-major array of 64x32 cells, each 0 (off) or 1 (on);
/// the cell at (x, y) is `frame_buffer[y * 64 + x]`.
pub type FrameBuffer = [u8; DISPLAY_SIZE];

/// Pressed status of keys 0..F, written only by the host.
pub type Keypad = [bool; KEY_COUNT];

/// A snapshot of the Chip-8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) doubles as the carry/borrow/collision flag
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter, starting at 0x200
///
/// Pointer
/// - (sp) the number of occupied stack slots, 0..=16
///
/// Timers
/// - an 8-bit delay timer, decremented once per executed instruction while nonzero
///
/// ## Memory
/// - 16 slot stack of return addresses
/// - 4096 bytes of addressable memory, the first 80 of which hold the sprite sheet
/// - 64x32 frame buffer and a flag marking it as changed since the host last drew it
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
}

impl State {
    pub fn new() -> Self {
        // 0x000 - 0x050 is reserved for a sprite sheet
        let mut memory = [0; MEMORY_SIZE];
        memory[0..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            stack: [0; STACK_DEPTH],
            memory,
            frame_buffer: [0; DISPLAY_SIZE],
            draw_flag: false,
        }
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Both of its bytes must lie inside memory.
    pub fn fetch(&self) -> Result<u16, Chip8Error> {
        let bytes = self
            .read_memory(self.pc, 2)
            .map_err(|_| Chip8Error::ProgramCounterOutOfBounds { pc: self.pc })?;
        Ok(opcode::from_bytes(bytes[0], bytes[1]))
    }

    /// Borrows `len` bytes of memory starting at `address`
    pub fn read_memory(&self, address: u16, len: usize) -> Result<&[u8], Chip8Error> {
        let start = usize::from(address);
        self.memory
            .get(start..start + len)
            .ok_or(Chip8Error::MemoryOutOfBounds { address, len })
    }

    /// Copies `bytes` into memory starting at `address`; nothing is written if any byte would fall outside it
    pub fn write_memory(&mut self, address: u16, bytes: &[u8]) -> Result<(), Chip8Error> {
        let start = usize::from(address);
        let len = bytes.len();
        self.memory
            .get_mut(start..start + len)
            .ok_or(Chip8Error::MemoryOutOfBounds { address, len })?
            .copy_from_slice(bytes);
        Ok(())
    }

    /// Pushes a return address; the stack holds at most 16
    pub fn push(&mut self, address: u16) -> Result<(), Chip8Error> {
        let slot = self
            .stack
            .get_mut(usize::from(self.sp))
            .ok_or(Chip8Error::StackOverflow { pc: self.pc })?;
        *slot = address;
        self.sp += 1;
        Ok(())
    }

    /// Pops the most recently pushed return address
    pub fn pop(&mut self) -> Result<u16, Chip8Error> {
        self.sp = self
            .sp
            .checked_sub(1)
            .ok_or(Chip8Error::StackUnderflow { pc: self.pc })?;
        Ok(self.stack[usize::from(self.sp)])
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
