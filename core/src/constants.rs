/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded at, and execution begins from, 0x200.
/// Everything below it is reserved for the interpreter (and the sprite sheet).
pub const PROGRAM_START: u16 = 0x200;

/// The largest program image that fits between `PROGRAM_START` and the end of memory
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

pub const REGISTER_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xF;

pub const STACK_DEPTH: usize = 16;

pub const KEY_COUNT: usize = 16;

/// Nanoseconds the host waits between CPU cycles (1.5ms)
pub const CLOCK_SPEED: u64 = 1_500_000;

/// Each glyph in the sprite sheet is 8x5 pixels
pub const FONT_GLYPH_SIZE: u16 = 5;

/// # Sprite Sheet
/// Hexadecimal digits 0..F, five rows each, one byte per row.
/// Only the high nibble of each row is lit; e.g. 0:
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
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
