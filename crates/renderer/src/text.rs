//! TrueType text for titles, tick labels and the colorbar label.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use std::path::Path;

use crate::error::RenderError;

/// Horizontal placement of a text run relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Loaded font plus drawing helpers.
pub struct TextRenderer {
    font: Font<'static>,
}

impl TextRenderer {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RenderError> {
        let font = Font::try_from_vec(data)
            .ok_or_else(|| RenderError::Font("not a TrueType/OpenType font".to_string()))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read(path)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// Width and height in pixels of a single line.
    pub fn measure(&self, text: &str, size: f32) -> (i32, i32) {
        text_size(Scale::uniform(size), &self.font, text)
    }

    /// Draw one line with its top edge at `y`.
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        color: Rgba<u8>,
        align: Align,
    ) {
        let (w, _) = self.measure(text, size);
        let x = match align {
            Align::Left => x,
            Align::Center => x - w / 2,
            Align::Right => x - w,
        };
        draw_text_mut(canvas, color, x, y, Scale::uniform(size), &self.font, text);
    }

    /// Draw several lines separated by `\n`, returning the total height.
    pub fn draw_lines(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        color: Rgba<u8>,
        align: Align,
    ) -> i32 {
        let line_height = (size * 1.25).ceil() as i32;
        let mut offset = 0;
        for line in text.lines() {
            self.draw(canvas, line, x, y + offset, size, color, align);
            offset += line_height;
        }
        offset
    }
}
