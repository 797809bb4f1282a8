use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{TextureValueError, UpdateTextureError, WindowCanvas};
use sdl2::video::WindowBuildError;
use sdl2::IntegerOrSdlError;
use thiserror::Error;

use chip8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8_core::FrameBuffer;

/// Bytes per pixel in an RGB24 texture
const CHANNELS: usize = 3;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("sdl error: {0}")]
    Sdl(String),

    #[error(transparent)]
    Window(#[from] WindowBuildError),

    #[error(transparent)]
    Canvas(#[from] IntegerOrSdlError),

    #[error(transparent)]
    Texture(#[from] TextureValueError),

    #[error(transparent)]
    Update(#[from] UpdateTextureError),
}

impl From<String> for DisplayError {
    fn from(message: String) -> Self {
        DisplayError::Sdl(message)
    }
}

/// # Display
/// The Chip-8 display is composed of 64x32 black/white pixels.
/// The on/off state of these pixels is encoded as 1/0 respectively in a flat, row-major FrameBuffer.
/// The display only gets a call to `render` when the Chip-8 FrameBuffer is updated.
pub struct Display {
    canvas: WindowCanvas,
}

impl Display {
    /// Creates a new window bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, scale: u32) -> Result<Self, DisplayError> {
        let video_subsystem = sdl.video()?;
        let window = video_subsystem
            .window(
                "Chip-8",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()?;
        let canvas = window.into_canvas().build()?;

        Ok(Display { canvas })
    }

    /// Formats a Chip-8 FrameBuffer for rendering as an SDL2 texture.
    ///
    /// An SDL2 RGB24 texture is a 1D array of bytes that represent concatenated rows of RGB pixels,
    /// so each cell is triplicated and scaled from a binary state to 0-255 intensity.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    fn frame_to_sdl_texture(frame: &FrameBuffer) -> Vec<u8> {
        frame
            .iter()
            .flat_map(|&cell| std::iter::repeat(cell * 0xFF).take(CHANNELS))
            .collect()
    }

    /// Formats the Chip-8 FrameBuffer as an SDL2 RGB24 texture and renders it.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGB24,
            DISPLAY_WIDTH as u32,
            DISPLAY_HEIGHT as u32,
        )?;

        texture.update(
            None,
            &Display::frame_to_sdl_texture(frame),
            DISPLAY_WIDTH * CHANNELS,
        )?;

        self.canvas.clear();
        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
