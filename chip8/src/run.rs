use std::time::{Duration, Instant};

use log::error;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use thiserror::Error;

use chip8_core::{Chip8, Chip8Error, CLOCK_SPEED};
use chip8_display::{Display, DisplayError};

use crate::keymap::keymap;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Cpu(#[from] Chip8Error),

    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// Drives `chip8` until the window is closed or Escape is pressed.
/// Returns the first error raised by the CPU or the display.
pub fn run(mut chip8: Chip8, scale: u32) -> Result<(), RunError> {
    // Get SDL2 context
    let sdl = sdl2::init().map_err(DisplayError::from)?;
    let mut display = Display::new(&sdl, scale)?;
    let mut events = sdl.event_pump().map_err(DisplayError::from)?;

    // Set initial timing
    let cycle_time = Duration::from_nanos(CLOCK_SPEED);
    let mut last_cycle = Instant::now();

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        chip8.key_press(kc)?;
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        chip8.key_release(kc)?;
                    }
                }
                _ => continue,
            };
        }

        // Update state
        if let Err(e) = chip8.advance_cpu() {
            error!(
                "halting at pc {:04X}: v{:02X?} i{:04X} sp{}",
                chip8.pc(),
                chip8.registers(),
                chip8.index(),
                chip8.stack_pointer()
            );
            return Err(e.into());
        }

        // If the draw flag is set, render the current frame and unset it
        if let Some(frame) = chip8.get_frame() {
            display.render(frame)?;
            chip8.clear_draw_flag();
        }

        // Handle timing
        let elapsed_cycle_time = last_cycle.elapsed();
        if cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    Ok(())
}
