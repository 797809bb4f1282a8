/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each, stored big-endian across two bytes of memory.
/// Their behavior is cased on some combination of:
/// - `(n, _, _, _)` the family; applies to all opcodes
/// - `(_, _, _, n)` specific behavior within family 8
/// - `(_, _, n, n)` specific behavior within families E and F
/// - `(_, n, n, n)` a fixed function that doesn't take operands (CLS and RET in family 0)
///
/// Nibbles not used to determine the operation usually carry operands.
/// - `[_nnn]` a 12-bit address
/// - `[__kk]` a byte that is assigned to and/or compared with Vx
/// - `[_x__]` the register Vx, or the range of registers V0..=Vx
/// - `[__y_]` the register Vy
/// - `[___n]` the height of a sprite
pub trait Opcode {
    /// Returns the Opcode's component nibbles, most significant first.
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// `[x___]`
    fn family(&self) -> u8;

    /// Register index in the second nibble.
    /// `[_x__]`
    fn x(&self) -> usize;

    /// Register index in the third nibble.
    /// `[__y_]`
    fn y(&self) -> usize;

    /// `[___n]`
    fn n(&self) -> u8;

    /// `[__kk]`
    fn kk(&self) -> u8;

    /// `[_adr]`
    fn addr(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        (self.family(), self.x() as u8, self.y() as u8, self.n())
    }

    fn family(&self) -> u8 {
        ((self & 0xF000) >> 12) as u8
    }

    fn x(&self) -> usize {
        usize::from((self & 0x0F00) >> 8)
    }

    fn y(&self) -> usize {
        usize::from((self & 0x00F0) >> 4)
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn kk(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn addr(&self) -> u16 {
        self & 0x0FFF
    }
}

/// Combines the two bytes at PC and PC+1 into a single opcode.
pub fn from_bytes(high: u8, low: u8) -> u16 {
    u16::from(high) << 8 | u16::from(low)
}
