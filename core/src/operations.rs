use crate::config::SpriteWrap;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_SIZE, DISPLAY_WIDTH, FLAG_REGISTER, FONT_GLYPH_SIZE};
use crate::error::Chip8Error;
use crate::state::{Keypad, State};

/// The address of the instruction following the current one
fn next(state: &State) -> u16 {
    state.pc + 0x2
}

/// Steps over the following instruction when `condition` holds
fn skip_if(state: &State, condition: bool) -> State {
    let pc = if condition {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    State { pc, ..*state }
}

fn is_pressed(keypad: &Keypad, key: u8) -> Result<bool, Chip8Error> {
    keypad
        .get(usize::from(key))
        .copied()
        .ok_or(Chip8Error::InvalidKey { key })
}

/// clear
pub fn clr(state: &State) -> State {
    State {
        pc: next(state),
        frame_buffer: [0; DISPLAY_SIZE],
        draw_flag: true,
        ..*state
    }
}

/// PC = STACK.pop() + 2
pub fn rts(state: &State) -> Result<State, Chip8Error> {
    let mut state = *state;
    state.pc = state.pop()? + 0x2;
    Ok(state)
}

/// PC = addr
pub fn jump(addr: u16, state: &State) -> State {
    State { pc: addr, ..*state }
}

/// STACK.push(PC); PC = addr
pub fn call(addr: u16, state: &State) -> Result<State, Chip8Error> {
    let mut state = *state;
    state.push(state.pc)?;
    state.pc = addr;
    Ok(state)
}

/// if Vx == kk then pc += 2
pub fn ske(x: usize, kk: u8, state: &State) -> State {
    skip_if(state, state.v[x] == kk)
}

/// if Vx != kk then pc += 2
pub fn skne(x: usize, kk: u8, state: &State) -> State {
    skip_if(state, state.v[x] != kk)
}

/// if Vx == Vy then pc += 2
pub fn skre(x: usize, y: usize, state: &State) -> State {
    skip_if(state, state.v[x] == state.v[y])
}

/// if Vx != Vy then pc += 2
pub fn skrne(x: usize, y: usize, state: &State) -> State {
    skip_if(state, state.v[x] != state.v[y])
}

/// Vx = kk
pub fn load(x: usize, kk: u8, state: &State) -> State {
    let mut v = state.v;
    v[x] = kk;
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx += kk
/// Wraps without touching VF
pub fn add(x: usize, kk: u8, state: &State) -> State {
    let mut v = state.v;
    v[x] = v[x].wrapping_add(kk);
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx = Vy
pub fn mv(x: usize, y: usize, state: &State) -> State {
    let mut v = state.v;
    v[x] = v[y];
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx |= Vy; VF = 0
pub fn or(x: usize, y: usize, state: &State) -> State {
    let mut v = state.v;
    v[x] |= v[y];
    v[FLAG_REGISTER] = 0x0;
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx &= Vy; VF = 0
pub fn and(x: usize, y: usize, state: &State) -> State {
    let mut v = state.v;
    v[x] &= v[y];
    v[FLAG_REGISTER] = 0x0;
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx ^= Vy; VF = 0
pub fn xor(x: usize, y: usize, state: &State) -> State {
    let mut v = state.v;
    v[x] ^= v[y];
    v[FLAG_REGISTER] = 0x0;
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx += Vy; VF = overflow
/// VF is written before Vx, so an operand of F reads the new flag.
pub fn addr(x: usize, y: usize, state: &State) -> State {
    let mut v = state.v;
    v[FLAG_REGISTER] = u8::from(v[x].checked_add(v[y]).is_none());
    v[x] = v[x].wrapping_add(v[y]);
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx -= Vy; VF = !underflow
pub fn sub(x: usize, y: usize, state: &State) -> State {
    let mut v = state.v;
    v[FLAG_REGISTER] = u8::from(v[x] >= v[y]);
    v[x] = v[x].wrapping_sub(v[y]);
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx = Vy - Vx; VF = !underflow
pub fn subn(x: usize, y: usize, state: &State) -> State {
    let mut v = state.v;
    v[FLAG_REGISTER] = u8::from(v[y] >= v[x]);
    v[x] = v[y].wrapping_sub(v[x]);
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx >>= 1; VF = lsb
pub fn shr(x: usize, state: &State) -> State {
    let mut v = state.v;
    v[FLAG_REGISTER] = v[x] & 0x1;
    v[x] >>= 1;
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Vx <<= 1; VF = msb
pub fn shl(x: usize, state: &State) -> State {
    let mut v = state.v;
    v[FLAG_REGISTER] = v[x] >> 7;
    v[x] <<= 1;
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// I = addr
pub fn loadi(addr: u16, state: &State) -> State {
    State {
        pc: next(state),
        i: addr,
        ..*state
    }
}

/// PC = V0 + addr
pub fn jumpi(addr: u16, state: &State) -> State {
    State {
        pc: u16::from(state.v[0x0]) + addr,
        ..*state
    }
}

/// Vx = rand_byte & kk
pub fn rnd(x: usize, kk: u8, state: &State) -> State {
    let rand_byte: u8 = rand::random();
    let mut v = state.v;
    v[x] = rand_byte & kk;
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// Index of the frame buffer cell a sprite pixel at (x, y) lands on
fn cell(wrap: SpriteWrap, x: usize, y: usize) -> usize {
    match wrap {
        SpriteWrap::Linear => (x + y * DISPLAY_WIDTH) % DISPLAY_SIZE,
        SpriteWrap::PerAxis => (x % DISPLAY_WIDTH) + (y % DISPLAY_HEIGHT) * DISPLAY_WIDTH,
    }
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer.
/// Sets VF if any lit pixel gets erased.
pub fn draw(
    x: usize,
    y: usize,
    n: u8,
    state: &State,
    wrap: SpriteWrap,
) -> Result<State, Chip8Error> {
    let sprite = state.read_memory(state.i, usize::from(n))?;
    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;

    // Only collisions caused by this sprite count. Cleared before the
    // coordinates are read, so a coordinate held in VF reads as 0.
    v[FLAG_REGISTER] = 0x0;
    let origin_x = usize::from(v[x]);
    let origin_y = usize::from(v[y]);

    for (row, byte) in sprite.iter().enumerate() {
        for bit in 0..8 {
            if (byte >> (7 - bit)) & 0x1 == 0 {
                continue;
            }
            let index = cell(wrap, origin_x + bit, origin_y + row);
            v[FLAG_REGISTER] |= frame_buffer[index];
            frame_buffer[index] ^= 0x1;
        }
    }

    Ok(State {
        pc: next(state),
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// if Vx.pressed then pc += 2
pub fn skpr(x: usize, state: &State, keypad: &Keypad) -> Result<State, Chip8Error> {
    Ok(skip_if(state, is_pressed(keypad, state.v[x])?))
}

/// if !Vx.pressed then pc += 2
pub fn skup(x: usize, state: &State, keypad: &Keypad) -> Result<State, Chip8Error> {
    Ok(skip_if(state, !is_pressed(keypad, state.v[x])?))
}

/// Vx = DT
pub fn moved(x: usize, state: &State) -> State {
    let mut v = state.v;
    v[x] = state.delay_timer;
    State {
        pc: next(state),
        v,
        ..*state
    }
}

/// await keypress for Vx
/// Polls: with no key held the pc stays put and this runs again next cycle.
/// With several held, the highest numbered key wins.
pub fn keyd(x: usize, state: &State, keypad: &Keypad) -> State {
    match keypad.iter().rposition(|&pressed| pressed) {
        Some(key) => {
            let mut v = state.v;
            v[x] = key as u8;
            State {
                pc: next(state),
                v,
                ..*state
            }
        }
        None => *state,
    }
}

/// DT = Vx
pub fn loads(x: usize, state: &State) -> State {
    State {
        pc: next(state),
        delay_timer: state.v[x],
        ..*state
    }
}

/// ST = Vx
/// There is no sound timer, so this only moves on.
pub fn sound(_x: usize, state: &State) -> State {
    State {
        pc: next(state),
        ..*state
    }
}

/// I += Vx; VF = I overflowed 0xFFF
pub fn addi(x: usize, state: &State) -> State {
    let sum = u32::from(state.i) + u32::from(state.v[x]);
    let mut v = state.v;
    v[FLAG_REGISTER] = u8::from(sum > 0xFFF);
    State {
        pc: next(state),
        i: (sum & 0xFFFF) as u16,
        v,
        ..*state
    }
}

/// I = Vx * 5
/// Set I to the memory address of the glyph for Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(x: usize, state: &State) -> State {
    State {
        pc: next(state),
        i: u16::from(state.v[x]) * FONT_GLYPH_SIZE,
        ..*state
    }
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(x: usize, state: &State) -> Result<State, Chip8Error> {
    let vx = state.v[x];
    let digits = [vx / 100, vx / 10 % 10, vx % 10];
    let mut state = *state;
    state.write_memory(state.i, &digits)?;
    state.pc += 0x2;
    Ok(state)
}

/// mem[I..=I+x] = V0..=Vx; I += x + 1
pub fn stor(x: usize, state: &State) -> Result<State, Chip8Error> {
    let mut next_state = *state;
    next_state.write_memory(state.i, &state.v[..=x])?;
    next_state.i = state.i.wrapping_add(x as u16 + 1);
    next_state.pc = next(state);
    Ok(next_state)
}

/// V0..=Vx = mem[I..=I+x]; I += x + 1
pub fn read(x: usize, state: &State) -> Result<State, Chip8Error> {
    let mut v = state.v;
    v[..=x].copy_from_slice(state.read_memory(state.i, x + 1)?);
    Ok(State {
        pc: next(state),
        i: state.i.wrapping_add(x as u16 + 1),
        v,
        ..*state
    })
}
