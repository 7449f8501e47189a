//! # Rendering
//!
//! Overlays are built as a flat list of drawing commands in PDF user space
//! (origin bottom-left) and serialized by [`crate::pdf::PdfWriter`].
//!
//! - [`overlay`] lays template data into nodes (word-wrapped, aligned).
//! - [`whiteout`] paints over one located box and centers new text in it.

pub mod overlay;
pub mod whiteout;

use crate::font::StandardFont;
use crate::geometry::PdfRect;

pub use overlay::{render_template, wrap_text};
pub use whiteout::render_replacement;

/// A4 in points, the page size overlays use when no base page is known.
pub const A4: (f64, f64) = (595.28, 841.89);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
}

/// One baseline-positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    /// Baseline.
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Opaque filled rectangle, no stroke.
    FillRect { rect: PdfRect, color: Color },
    /// Lines of text sharing one font.
    Text {
        lines: Vec<TextLine>,
        font: StandardFont,
        font_size: f64,
        color: Color,
    },
}

/// A single transparent page: only what the commands paint is visible once
/// the page is laid over a base document.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPage {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
}

impl Default for OverlayPage {
    /// An empty A4 page.
    fn default() -> Self {
        Self::new(A4.0, A4.1)
    }
}

impl OverlayPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Every line of text on the page, in drawing order.
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.commands.iter().flat_map(|cmd| match cmd {
            DrawCommand::Text { lines, .. } => lines.as_slice(),
            DrawCommand::FillRect { .. } => [].as_slice(),
        })
    }

    /// Fonts used by text commands, deduplicated, in first-use order.
    pub fn fonts(&self) -> Vec<StandardFont> {
        let mut fonts = Vec::new();
        for cmd in &self.commands {
            if let DrawCommand::Text { font, .. } = cmd {
                if !fonts.contains(font) {
                    fonts.push(*font);
                }
            }
        }
        fonts
    }
}
