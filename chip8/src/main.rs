use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};

use chip8_core::{Chip8, Chip8Error, Config, SpriteWrap, UnknownOpcodePolicy};

mod keymap;
mod run;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum UnknownOpcodes {
    /// Log and fetch the same word again next cycle
    Stall,
    /// Log and move on to the next instruction
    Skip,
    /// Stop the emulator
    Fault,
}

impl From<UnknownOpcodes> for UnknownOpcodePolicy {
    fn from(choice: UnknownOpcodes) -> Self {
        match choice {
            UnknownOpcodes::Stall => UnknownOpcodePolicy::Stall,
            UnknownOpcodes::Skip => UnknownOpcodePolicy::Skip,
            UnknownOpcodes::Fault => UnknownOpcodePolicy::Fault,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Wrap {
    /// Sprites running off an edge continue on the next row
    Linear,
    /// Sprites wrap around each edge independently
    PerAxis,
}

impl From<Wrap> for SpriteWrap {
    fn from(choice: Wrap) -> Self {
        match choice {
            Wrap::Linear => SpriteWrap::Linear,
            Wrap::PerAxis => SpriteWrap::PerAxis,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "chip8", about = "Runs a Chip-8 program in an SDL2 window.")]
struct Args {
    /// Program image to load at 0x200.
    #[arg(value_name = "ROM")]
    rom: PathBuf,

    /// Window pixels per Chip-8 pixel.
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// What to do on an opcode the CPU doesn't know.
    #[arg(long, value_enum, default_value_t = UnknownOpcodes::Stall)]
    unknown_opcodes: UnknownOpcodes,

    /// How sprites wrap at the screen edges.
    #[arg(long, value_enum, default_value_t = Wrap::Linear)]
    wrap: Wrap,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut chip8 = Chip8::with_config(Config {
        unknown_opcode: args.unknown_opcodes.into(),
        sprite_wrap: args.wrap.into(),
    });

    // Load ROM
    let loaded = File::open(&args.rom)
        .map_err(Chip8Error::from)
        .and_then(|file| chip8.load_rom(&mut BufReader::new(file)));
    match loaded {
        Ok(size) => info!("loaded {} byte ROM from {}", size, args.rom.display()),
        Err(e) => {
            error!("unable to load {}: {}", args.rom.display(), e);
            return ExitCode::FAILURE;
        }
    }

    match run::run(chip8, args.scale) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
