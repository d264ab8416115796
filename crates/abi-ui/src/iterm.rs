//! iTerm2 inline image output.
//!
//! Sends the frame as a PNG inside an OSC 1337 escape:
//! ```text
//! \x1b]1337;File=inline=1;width={cells};height={cells};preserveAspectRatio=0:{base64}\x07
//! ```
//! ratatui's cell buffer cannot carry this, so the frame loop writes it
//! straight to the backend after each `terminal.draw()`.

use std::io::{self, Cursor, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbaImage};
use ratatui::layout::Rect;

/// Writes frames as inline images, re-encoding only when the face changed.
///
/// The frame loop renders far more often than the face ticks, so the encoded
/// PNG is cached per `generation` (the loop's tick count).
#[derive(Default)]
pub struct InlineImageWriter {
    cached: Option<(u64, String)>,
}

impl InlineImageWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `frame` over `area` (terminal cells).
    pub fn write(
        &mut self,
        writer: &mut impl Write,
        area: Rect,
        frame: &RgbaImage,
        generation: u64,
    ) -> io::Result<()> {
        if area.width == 0 || area.height == 0 {
            return Ok(());
        }

        if !matches!(&self.cached, Some((cached, _)) if *cached == generation) {
            self.cached = Some((generation, encode_png_base64(frame)?));
        }
        let encoded = self
            .cached
            .as_ref()
            .map(|(_, encoded)| encoded.as_str())
            .unwrap_or_default();

        // ANSI cursor positions are 1-based.
        write!(writer, "\x1b[{};{}H", area.y + 1, area.x + 1)?;
        write!(
            writer,
            "\x1b]1337;File=inline=1;width={};height={};preserveAspectRatio=0:{}\x07",
            area.width, area.height, encoded
        )?;
        writer.flush()
    }
}

fn encode_png_base64(frame: &RgbaImage) -> io::Result<String> {
    let mut png = Vec::new();
    frame
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(io::Error::other)?;
    Ok(STANDARD.encode(&png))
}
