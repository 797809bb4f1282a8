use std::fmt;

use crate::config::Config;
use crate::error::Chip8Error;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::{Keypad, State};

/// A decoded Chip-8 instruction and its operands.
///
/// `x` and `y` are register indices (0..=0xF), `kk` an immediate byte,
/// `addr` a 12-bit address and `n` a sprite height.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqualByte { x: usize, kk: u8 },
    /// 4xkk
    SkipNotEqualByte { x: usize, kk: u8 },
    /// 5xy_
    SkipEqualRegister { x: usize, y: usize },
    /// 6xkk
    LoadByte { x: usize, kk: u8 },
    /// 7xkk
    AddByte { x: usize, kk: u8 },
    /// 8xy0
    Move { x: usize, y: usize },
    /// 8xy1
    Or { x: usize, y: usize },
    /// 8xy2
    And { x: usize, y: usize },
    /// 8xy3
    Xor { x: usize, y: usize },
    /// 8xy4
    AddRegister { x: usize, y: usize },
    /// 8xy5
    Sub { x: usize, y: usize },
    /// 8xy6
    ShiftRight { x: usize },
    /// 8xy7
    SubN { x: usize, y: usize },
    /// 8xyE
    ShiftLeft { x: usize },
    /// 9xy_
    SkipNotEqualRegister { x: usize, y: usize },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: usize, kk: u8 },
    /// Dxyn
    Draw { x: usize, y: usize, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: usize },
    /// ExA1
    SkipKeyReleased { x: usize },
    /// Fx07
    LoadDelay { x: usize },
    /// Fx0A
    WaitKey { x: usize },
    /// Fx15
    SetDelay { x: usize },
    /// Fx18
    SetSound { x: usize },
    /// Fx1E
    AddIndex { x: usize },
    /// Fx29
    LoadGlyph { x: usize },
    /// Fx33
    StoreBcd { x: usize },
    /// Fx55
    StoreRegisters { x: usize },
    /// Fx65
    LoadRegisters { x: usize },
}

impl Instruction {
    /// Selects the Instruction for a given Opcode, if there is one
    pub fn decode(op: u16) -> Option<Self> {
        let (x, y, n, kk, addr) = (op.x(), op.y(), op.n(), op.kk(), op.addr());
        let instruction = match op.nibbles() {
            (0x0, 0x0, 0xE, 0x0) => Self::Cls,
            (0x0, 0x0, 0xE, 0xE) => Self::Ret,
            (0x1, ..) => Self::Jump { addr },
            (0x2, ..) => Self::Call { addr },
            (0x3, ..) => Self::SkipEqualByte { x, kk },
            (0x4, ..) => Self::SkipNotEqualByte { x, kk },
            (0x5, ..) => Self::SkipEqualRegister { x, y },
            (0x6, ..) => Self::LoadByte { x, kk },
            (0x7, ..) => Self::AddByte { x, kk },
            (0x8, .., 0x0) => Self::Move { x, y },
            (0x8, .., 0x1) => Self::Or { x, y },
            (0x8, .., 0x2) => Self::And { x, y },
            (0x8, .., 0x3) => Self::Xor { x, y },
            (0x8, .., 0x4) => Self::AddRegister { x, y },
            (0x8, .., 0x5) => Self::Sub { x, y },
            (0x8, .., 0x6) => Self::ShiftRight { x },
            (0x8, .., 0x7) => Self::SubN { x, y },
            (0x8, .., 0xE) => Self::ShiftLeft { x },
            (0x9, ..) => Self::SkipNotEqualRegister { x, y },
            (0xA, ..) => Self::LoadIndex { addr },
            (0xB, ..) => Self::JumpOffset { addr },
            (0xC, ..) => Self::Random { x, kk },
            (0xD, ..) => Self::Draw { x, y, n },
            (0xE, _, 0x9, 0xE) => Self::SkipKeyPressed { x },
            (0xE, _, 0xA, 0x1) => Self::SkipKeyReleased { x },
            (0xF, _, 0x0, 0x7) => Self::LoadDelay { x },
            (0xF, _, 0x0, 0xA) => Self::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Self::SetDelay { x },
            (0xF, _, 0x1, 0x8) => Self::SetSound { x },
            (0xF, _, 0x1, 0xE) => Self::AddIndex { x },
            (0xF, _, 0x2, 0x9) => Self::LoadGlyph { x },
            (0xF, _, 0x3, 0x3) => Self::StoreBcd { x },
            (0xF, _, 0x5, 0x5) => Self::StoreRegisters { x },
            (0xF, _, 0x6, 0x5) => Self::LoadRegisters { x },
            _ => return None,
        };
        Some(instruction)
    }
}

/// Runs a single instruction against `state`, producing the state that follows it.
/// `state` itself is never modified, so a failed instruction leaves nothing half done.
pub(crate) fn execute(
    instruction: Instruction,
    state: &State,
    keypad: &Keypad,
    config: &Config,
) -> Result<State, Chip8Error> {
    use Instruction::*;

    let next = match instruction {
        Cls => clr(state),
        Ret => rts(state)?,
        Jump { addr } => jump(addr, state),
        Call { addr } => call(addr, state)?,
        SkipEqualByte { x, kk } => ske(x, kk, state),
        SkipNotEqualByte { x, kk } => skne(x, kk, state),
        SkipEqualRegister { x, y } => skre(x, y, state),
        LoadByte { x, kk } => load(x, kk, state),
        AddByte { x, kk } => add(x, kk, state),
        Move { x, y } => mv(x, y, state),
        Or { x, y } => or(x, y, state),
        And { x, y } => and(x, y, state),
        Xor { x, y } => xor(x, y, state),
        AddRegister { x, y } => addr(x, y, state),
        Sub { x, y } => sub(x, y, state),
        ShiftRight { x } => shr(x, state),
        SubN { x, y } => subn(x, y, state),
        ShiftLeft { x } => shl(x, state),
        SkipNotEqualRegister { x, y } => skrne(x, y, state),
        LoadIndex { addr } => loadi(addr, state),
        JumpOffset { addr } => jumpi(addr, state),
        Random { x, kk } => rnd(x, kk, state),
        Draw { x, y, n } => draw(x, y, n, state, config.sprite_wrap)?,
        SkipKeyPressed { x } => skpr(x, state, keypad)?,
        SkipKeyReleased { x } => skup(x, state, keypad)?,
        LoadDelay { x } => moved(x, state),
        WaitKey { x } => keyd(x, state, keypad),
        SetDelay { x } => loads(x, state),
        SetSound { x } => sound(x, state),
        AddIndex { x } => addi(x, state),
        LoadGlyph { x } => ldspr(x, state),
        StoreBcd { x } => bcd(x, state)?,
        StoreRegisters { x } => stor(x, state)?,
        LoadRegisters { x } => read(x, state)?,
    };
    Ok(next)
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instruction::*;

        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jump { addr } => write!(f, "JP {:#05X}", addr),
            Call { addr } => write!(f, "CALL {:#05X}", addr),
            SkipEqualByte { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            SkipNotEqualByte { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            SkipEqualRegister { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadByte { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            AddByte { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddRegister { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x } => write!(f, "SHR V{:X}", x),
            SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            SkipNotEqualRegister { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { addr } => write!(f, "LD I, {:#05X}", addr),
            JumpOffset { addr } => write!(f, "JP V0, {:#05X}", addr),
            Random { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            SkipKeyReleased { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod test_instruction {
    use super::*;
    use crate::constants::DISPLAY_WIDTH;

    /// Decodes and runs `op` against `state` with the default configuration
    fn run(op: u16, state: &State, keypad: &Keypad) -> State {
        let instruction = Instruction::decode(op).expect("opcode should decode");
        execute(instruction, state, keypad, &Config::default()).expect("opcode should execute")
    }

    fn run_err(op: u16, state: &State) -> Chip8Error {
        let instruction = Instruction::decode(op).expect("opcode should decode");
        execute(instruction, state, &[false; 16], &Config::default())
            .expect_err("opcode should fail")
    }

    #[test]
    fn test_decode_rejects_unknown_words() {
        for op in [0x0000, 0x0123, 0x00E1, 0x8008, 0x800F, 0xE000, 0xE19F, 0xF000, 0xF1FF] {
            assert_eq!(Instruction::decode(op), None, "{:04X}", op);
        }
    }

    #[test]
    fn test_decode_extracts_operands() {
        assert_eq!(
            Instruction::decode(0xD4A7),
            Some(Instruction::Draw { x: 0x4, y: 0xA, n: 0x7 })
        );
        assert_eq!(
            Instruction::decode(0x2EA8),
            Some(Instruction::Call { addr: 0xEA8 })
        );
        assert_eq!(
            Instruction::decode(0x73FE),
            Some(Instruction::AddByte { x: 0x3, kk: 0xFE })
        );
    }

    #[test]
    fn test_decode_ignores_low_nibble_of_register_skips() {
        assert_eq!(
            Instruction::decode(0x5127),
            Some(Instruction::SkipEqualRegister { x: 0x1, y: 0x2 })
        );
        assert_eq!(
            Instruction::decode(0x912F),
            Some(Instruction::SkipNotEqualRegister { x: 0x1, y: 0x2 })
        );
    }

    #[test]
    fn test_display_mnemonics() {
        assert_eq!(Instruction::Jump { addr: 0x2A0 }.to_string(), "JP 0x2A0");
        assert_eq!(
            Instruction::Draw { x: 0x1, y: 0x2, n: 5 }.to_string(),
            "DRW V1, V2, 5"
        );
        assert_eq!(
            Instruction::LoadByte { x: 0xA, kk: 0x0F }.to_string(),
            "LD VA, 0x0F"
        );
    }

    #[test]
    fn test_00e0_cls() {
        let mut state = State::new();
        state.frame_buffer[0] = 1;
        state.frame_buffer[2047] = 1;
        let state = run(0x00E0, &state, &[false; 16]);
        assert!(state.frame_buffer.iter().all(|&p| p == 0));
        assert!(state.draw_flag);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_00ee_ret() {
        let mut state = State::new();
        state.sp = 0x1;
        state.stack[0x0] = 0x0ABC;
        let state = run(0x00EE, &state, &[false; 16]);
        assert_eq!(state.sp, 0x0);
        // Returns to the instruction after the call
        assert_eq!(state.pc, 0x0ABC + 0x2);
    }

    #[test]
    fn test_00ee_ret_underflows() {
        let state = State::new();
        assert!(matches!(
            run_err(0x00EE, &state),
            Chip8Error::StackUnderflow { pc: 0x200 }
        ));
    }

    #[test]
    fn test_1nnn_jp() {
        let state = State::new();
        let state = run(0x1ABC, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0ABC);
    }

    #[test]
    fn test_2nnn_call() {
        let mut state = State::new();
        state.pc = 0x0ABC;
        let state = run(0x2123, &state, &[false; 16]);
        assert_eq!(state.sp, 0x1);
        assert_eq!(state.stack[0x0], 0x0ABC);
        assert_eq!(state.pc, 0x0123);
    }

    #[test]
    fn test_2nnn_call_overflows() {
        let mut state = State::new();
        state.sp = 16;
        assert!(matches!(
            run_err(0x2123, &state),
            Chip8Error::StackOverflow { pc: 0x200 }
        ));
    }

    #[test]
    fn test_3xkk_se_skips() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = run(0x3111, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_3xkk_se_doesntskip() {
        let state = State::new();
        let state = run(0x3111, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_4xkk_sne_skips() {
        let state = State::new();
        let state = run(0x4111, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_4xkk_sne_doesntskip() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = run(0x4111, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_5xy0_se_skips() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x11;
        let state = run(0x5120, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_5xy0_se_doesntskip() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = run(0x5120, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_6xkk_ld() {
        let state = State::new();
        let state = run(0x6122, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x22);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_7xkk_add_wraps_without_flag() {
        let mut state = State::new();
        state.v[0x1] = 0xFF;
        state.v[0xF] = 0x7;
        let state = run(0x7102, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x01);
        assert_eq!(state.v[0xF], 0x7);
    }

    #[test]
    fn test_8xy0_ld() {
        let mut state = State::new();
        state.v[0x2] = 0x1;
        let state = run(0x8120, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x1);
    }

    #[test]
    fn test_8xy1_or_clears_flag() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        state.v[0xF] = 0x1;
        let state = run(0x8121, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x7);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy2_and_clears_flag() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        state.v[0xF] = 0x1;
        let state = run(0x8122, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x2);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy3_xor_clears_flag() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        state.v[0xF] = 0x1;
        let state = run(0x8123, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x5);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy4_add_nocarry() {
        let mut state = State::new();
        state.v[0x1] = 0xEE;
        state.v[0x2] = 0x11;
        let state = run(0x8124, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0xFF);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy4_add_carry() {
        let mut state = State::new();
        state.v[0x1] = 250;
        state.v[0x2] = 10;
        let state = run(0x8124, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 4);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy4_sum_into_flag_register_adds_to_flag() {
        let mut state = State::new();
        state.v[0xF] = 0x10;
        state.v[0x2] = 0x02;
        let state = run(0x8F24, &state, &[false; 16]);
        // no carry, so VF = 0 + 0x02
        assert_eq!(state.v[0xF], 0x02);
    }

    #[test]
    fn test_8xy4_flag_register_as_source_reads_new_flag() {
        let mut state = State::new();
        state.v[0x1] = 0x10;
        state.v[0xF] = 0x05;
        let state = run(0x81F4, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x10);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy5_flag_register_as_source_reads_new_flag() {
        let mut state = State::new();
        state.v[0x1] = 0x10;
        state.v[0xF] = 0x05;
        let state = run(0x81F5, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x0F);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy7_flag_register_as_source_reads_new_flag() {
        let mut state = State::new();
        state.v[0x1] = 0x10;
        state.v[0xF] = 0x20;
        let state = run(0x81F7, &state, &[false; 16]);
        // VF = 1 (no borrow), then V1 = 0x01 - 0x10
        assert_eq!(state.v[0x1], 0xF1);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy6_shift_of_flag_register_shifts_new_flag() {
        let mut state = State::new();
        state.v[0xF] = 0x84;
        let state = run(0x8F06, &state, &[false; 16]);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xye_shift_of_flag_register_shifts_new_flag() {
        let mut state = State::new();
        state.v[0xF] = 0x84;
        let state = run(0x8F0E, &state, &[false; 16]);
        assert_eq!(state.v[0xF], 0x2);
    }

    #[test]
    fn test_8xy5_sub_noborrow() {
        let mut state = State::new();
        state.v[0x1] = 0x33;
        state.v[0x2] = 0x11;
        let state = run(0x8125, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x22);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy5_sub_equal_operands_is_not_a_borrow() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x11;
        let state = run(0x8125, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x0);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy5_sub_borrow() {
        let mut state = State::new();
        state.v[0x1] = 5;
        state.v[0x2] = 10;
        let state = run(0x8125, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 251);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy6_shr_lsb() {
        let mut state = State::new();
        state.v[0x1] = 0x5;
        let state = run(0x8106, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x2);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy6_shr_nolsb() {
        let mut state = State::new();
        state.v[0x1] = 0x4;
        state.v[0x2] = 0xFF;
        let state = run(0x8126, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x2);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy7_subn_noborrow() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x33;
        let state = run(0x8127, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x22);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy7_subn_borrow() {
        let mut state = State::new();
        state.v[0x1] = 0x12;
        state.v[0x2] = 0x11;
        let state = run(0x8127, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0xFF);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xye_shl_msb() {
        let mut state = State::new();
        state.v[0x1] = 0xFF;
        let state = run(0x810E, &state, &[false; 16]);
        // 0xFF << 1 = 0x01FE
        assert_eq!(state.v[0x1], 0xFE);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xye_shl_nomsb() {
        let mut state = State::new();
        state.v[0x1] = 0x4;
        let state = run(0x810E, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0x8);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_9xy0_sne_skips() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = run(0x9120, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_9xy0_sne_doesntskip() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x11;
        let state = run(0x9120, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_annn_ld() {
        let state = State::new();
        let state = run(0xAABC, &state, &[false; 16]);
        assert_eq!(state.i, 0xABC);
    }

    #[test]
    fn test_bnnn_jp() {
        let mut state = State::new();
        state.v[0x0] = 0x2;
        let state = run(0xBABC, &state, &[false; 16]);
        assert_eq!(state.pc, 0xABE);
    }

    #[test]
    fn test_cxkk_rnd_is_masked() {
        let state = State::new();
        for _ in 0..32 {
            let next = run(0xC100, &state, &[false; 16]);
            assert_eq!(next.v[0x1], 0x0);
            let next = run(0xC10F, &state, &[false; 16]);
            assert!(next.v[0x1] <= 0x0F);
            assert_eq!(next.pc, 0x0202);
        }
    }

    #[test]
    fn test_dxyn_drw_draws() {
        let mut state = State::new();
        state.v[0x0] = 0x1;
        // Draw the 0x0 glyph with a 1x 1y offset
        let state = run(0xD005, &state, &[false; 16]);
        let mut expected = [0; 2048];
        let rows: [[u8; 4]; 5] = [
            [1, 1, 1, 1],
            [1, 0, 0, 1],
            [1, 0, 0, 1],
            [1, 0, 0, 1],
            [1, 1, 1, 1],
        ];
        for (row, pixels) in rows.iter().enumerate() {
            let start = (row + 1) * DISPLAY_WIDTH + 1;
            expected[start..start + 4].copy_from_slice(pixels);
        }
        assert_eq!(state.frame_buffer[..], expected[..]);
        assert!(state.draw_flag);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_dxyn_drw_collides() {
        let mut state = State::new();
        state.frame_buffer[0] = 1;
        let state = run(0xD001, &state, &[false; 16]);
        assert_eq!(state.v[0xF], 0x1);
        assert_eq!(state.frame_buffer[0], 0);
    }

    #[test]
    fn test_dxyn_drw_xors() {
        let mut state = State::new();
        // 0 1 0 1 -> Set
        state.frame_buffer[2..6].copy_from_slice(&[0, 1, 0, 1]);
        // 1 1 0 0 -> Draw xor
        state.v[0x0] = 0x2;
        state.i = 0x300;
        state.memory[0x300] = 0b1100_0000;
        let state = run(0xD011, &state, &[false; 16]);
        assert_eq!(state.frame_buffer[2..6], [1, 0, 0, 1]);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_dxyn_drw_twice_erases() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300] = 0xFF;
        state.v[0x0] = 8;
        state.v[0x1] = 4;
        let row = 4 * DISPLAY_WIDTH + 8;

        let state = run(0xD011, &state, &[false; 16]);
        assert_eq!(state.frame_buffer[row..row + 8], [1; 8]);
        assert_eq!(state.v[0xF], 0x0);

        let state = run(0xD011, &state, &[false; 16]);
        assert_eq!(state.frame_buffer[row..row + 8], [0; 8]);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_dxy0_drw_draws_nothing_but_flags_redraw() {
        let mut state = State::new();
        state.v[0xF] = 0x1;
        let state = run(0xD010, &state, &[false; 16]);
        assert!(state.frame_buffer.iter().all(|&p| p == 0));
        assert!(state.draw_flag);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_ex9e_skp_skips() {
        let mut state = State::new();
        let mut keypad = [false; 16];
        keypad[0xE] = true;
        state.v[0x1] = 0xE;
        let state = run(0xE19E, &state, &keypad);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_ex9e_skp_doesntskip() {
        let state = State::new();
        let state = run(0xE19E, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_exa1_sknp_skips() {
        let state = State::new();
        let state = run(0xE1A1, &state, &[false; 16]);
        assert_eq!(state.pc, 0x0204);
    }

    #[test]
    fn test_exa1_sknp_doesntskip() {
        let mut state = State::new();
        let mut keypad = [false; 16];
        keypad[0xE] = true;
        state.v[0x1] = 0xE;
        let state = run(0xE1A1, &state, &keypad);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_fx07_ld() {
        let mut state = State::new();
        state.delay_timer = 0xF;
        let state = run(0xF107, &state, &[false; 16]);
        assert_eq!(state.v[0x1], 0xF);
    }

    #[test]
    fn test_fx0a_ld_waits_for_key() {
        let state = State::new();
        let next = run(0xF10A, &state, &[false; 16]);
        assert_eq!(next.pc, 0x0200);

        let mut keypad = [false; 16];
        keypad[0x7] = true;
        let next = run(0xF10A, &state, &keypad);
        assert_eq!(next.v[0x1], 0x7);
        assert_eq!(next.pc, 0x0202);
    }

    #[test]
    fn test_fx15_ld() {
        let mut state = State::new();
        state.v[0x1] = 0xF;
        let state = run(0xF115, &state, &[false; 16]);
        assert_eq!(state.delay_timer, 0xF);
    }

    #[test]
    fn test_fx18_ld_only_advances() {
        let mut state = State::new();
        state.v[0x1] = 0xF;
        let next = run(0xF118, &state, &[false; 16]);
        assert_eq!(next, State { pc: 0x0202, ..state });
    }

    #[test]
    fn test_fx1e_add() {
        let mut state = State::new();
        state.i = 0x1;
        state.v[0x1] = 0x1;
        state.v[0xF] = 0x1;
        let state = run(0xF11E, &state, &[false; 16]);
        assert_eq!(state.i, 0x2);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_fx1e_add_past_address_space() {
        let mut state = State::new();
        state.i = 0xFFF;
        state.v[0x1] = 0x2;
        let state = run(0xF11E, &state, &[false; 16]);
        assert_eq!(state.i, 0x1001);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_fx29_ld() {
        let mut state = State::new();
        state.v[0x1] = 0x2;
        let state = run(0xF129, &state, &[false; 16]);
        assert_eq!(state.i, 0xA);
    }

    #[test]
    fn test_fx33_ld() {
        let mut state = State::new();
        state.v[0x1] = 254;
        state.i = 0x300;
        let state = run(0xF133, &state, &[false; 16]);
        assert_eq!(state.memory[0x300..0x303], [0x2, 0x5, 0x4]);
    }

    #[test]
    fn test_fx33_ld_past_end_of_memory() {
        let mut state = State::new();
        state.i = 0xFFE;
        assert!(matches!(
            run_err(0xF133, &state),
            Chip8Error::MemoryOutOfBounds { address: 0xFFE, len: 3 }
        ));
    }

    #[test]
    fn test_fx55_ld() {
        let mut state = State::new();
        state.i = 0x300;
        state.v[0x0..0x5].copy_from_slice(&[0x1, 0x2, 0x3, 0x4, 0x5]);
        let state = run(0xF455, &state, &[false; 16]);
        assert_eq!(state.memory[0x300..0x306], [0x1, 0x2, 0x3, 0x4, 0x5, 0x0]);
        assert_eq!(state.i, 0x305);
    }

    #[test]
    fn test_fx65_ld() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300..0x306].copy_from_slice(&[0x1, 0x2, 0x3, 0x4, 0x5, 0x6]);
        let state = run(0xF465, &state, &[false; 16]);
        assert_eq!(state.v[0x0..0x6], [0x1, 0x2, 0x3, 0x4, 0x5, 0x0]);
        assert_eq!(state.i, 0x305);
    }
}
