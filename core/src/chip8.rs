use std::io::Read;

use log::{debug, trace, warn};

use crate::config::{Config, UnknownOpcodePolicy};
use crate::constants::{KEY_COUNT, MAX_ROM_SIZE, PROGRAM_START, REGISTER_COUNT};
use crate::error::Chip8Error;
use crate::instruction::{execute, Instruction};
use crate::state::{FrameBuffer, Keypad, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `pressed_keys` with public interfaces for manipulating them
///  - the `config` deciding how ambiguous behavior is resolved
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU one instruction at a time
/// - inspecting its frame buffer for rendering by some display
/// - inspecting registers and memory
pub struct Chip8 {
    state: State,
    pressed_keys: Keypad,
    config: Config,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Chip8 {
            state: State::new(),
            pressed_keys: [false; KEY_COUNT],
            config,
        }
    }

    /// Load a rom from a source file
    ///
    /// The whole image is read before anything is copied, so an oversized rom leaves memory untouched.
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<usize, Chip8Error> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.load_bytes(&rom)?;
        Ok(rom.len())
    }

    /// Copy a rom into memory at 0x200
    ///
    /// # Arguments
    /// * `rom` the raw program image, no header
    pub fn load_bytes(&mut self, rom: &[u8]) -> Result<(), Chip8Error> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max_size: MAX_ROM_SIZE,
            });
        }
        self.state.write_memory(PROGRAM_START, rom)?;
        debug!("loaded {} byte ROM at {:#06X}", rom.len(), PROGRAM_START);
        Ok(())
    }

    /// Returns the FrameBuffer if the display should be redrawn
    pub fn get_frame(&self) -> Option<&FrameBuffer> {
        if self.state.draw_flag {
            Some(&self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    pub fn draw_flag(&self) -> bool {
        self.state.draw_flag
    }

    /// Marks the current frame as drawn; call after rendering it
    pub fn clear_draw_flag(&mut self) {
        self.state.draw_flag = false;
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad index (0x0..=0xF) of the key that was pressed
    pub fn key_press(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.set_key(key, true)
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad index (0x0..=0xF) of the key that was released
    pub fn key_release(&mut self, key: u8) -> Result<(), Chip8Error> {
        self.set_key(key, false)
    }

    fn set_key(&mut self, key: u8, pressed: bool) -> Result<(), Chip8Error> {
        let slot = self
            .pressed_keys
            .get_mut(usize::from(key))
            .ok_or(Chip8Error::InvalidKey { key })?;
        *slot = pressed;
        Ok(())
    }

    /// Advances the CPU by a single cycle
    /// - fetches the opcode at the pc
    /// - decodes and executes it, or applies the unknown opcode policy
    /// - decrements the delay timer
    ///
    /// On error the state is left exactly as it was before the cycle.
    pub fn advance_cpu(&mut self) -> Result<(), Chip8Error> {
        let op = self.state.fetch()?;
        let mut next = match Instruction::decode(op) {
            Some(instruction) => {
                trace!(
                    "{:04X} {:<16} v{:02X?} i{:04X} pc{:04X}",
                    op,
                    instruction.to_string(),
                    self.state.v,
                    self.state.i,
                    self.state.pc
                );
                execute(instruction, &self.state, &self.pressed_keys, &self.config)?
            }
            None => self.unknown_opcode(op)?,
        };

        if next.delay_timer > 0 {
            next.delay_timer -= 1;
        }
        self.state = next;
        Ok(())
    }

    fn unknown_opcode(&self, op: u16) -> Result<State, Chip8Error> {
        let pc = self.state.pc;
        match self.config.unknown_opcode {
            UnknownOpcodePolicy::Stall => {
                warn!("unknown opcode {:04X} at {:04X}", op, pc);
                Ok(self.state)
            }
            UnknownOpcodePolicy::Skip => {
                warn!("skipping unknown opcode {:04X} at {:04X}", op, pc);
                Ok(State {
                    pc: pc + 0x2,
                    ..self.state
                })
            }
            UnknownOpcodePolicy::Fault => Err(Chip8Error::UnknownOpcode { opcode: op, pc }),
        }
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    /// The I register
    pub fn index(&self) -> u16 {
        self.state.i
    }

    pub fn stack_pointer(&self) -> u8 {
        self.state.sp
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    /// `None` if `x` isn't a register index (0x0..=0xF).
    pub fn register(&self, x: usize) -> Option<u8> {
        self.state.v.get(x).copied()
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.state.v
    }

    pub fn memory(&self) -> &[u8] {
        &self.state.memory
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
