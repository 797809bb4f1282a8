pub use chip8::Chip8;
pub use config::{Config, SpriteWrap, UnknownOpcodePolicy};
pub use constants::CLOCK_SPEED;
pub use error::Chip8Error;
pub use instruction::Instruction;
pub use state::{FrameBuffer, Keypad};

mod chip8;
pub mod config;
pub mod constants;
mod error;
pub mod instruction;
mod opcode;
mod operations;
pub mod state;
