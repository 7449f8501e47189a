//! Single-box replacement: white out one box and center new text in it.

use super::{Color, DrawCommand, OverlayPage, TextLine};
use crate::config::ReplacementSettings;
use crate::font::StandardFont;
use crate::geometry::PdfRect;

/// Paint `rect` grown by `padding` white, then draw `text` on top.
///
/// `text` is split on `\n` only; it is never wrapped and may overflow the
/// box. Each line is centered horizontally, and the block of lines is
/// centered vertically.
pub fn render_replacement(
    rect: &PdfRect,
    text: &str,
    page_width: f64,
    page_height: f64,
    padding: f64,
    settings: &ReplacementSettings,
) -> OverlayPage {
    let mut page = OverlayPage::new(page_width, page_height);
    page.commands.push(DrawCommand::FillRect {
        rect: rect.expand(padding),
        color: Color::WHITE,
    });

    let font = StandardFont::resolve(&settings.font);
    let size = settings.font_size;
    let leading = size * settings.line_height;

    let raw_lines: Vec<&str> = text.split('\n').collect();
    let block_height = raw_lines.len() as f64 * leading;
    let mut y = rect.y + rect.h - (rect.h - block_height) / 2.0 - size;

    let mut lines = Vec::with_capacity(raw_lines.len());
    for line in raw_lines {
        let width = font.measure(line, size);
        lines.push(TextLine {
            x: rect.x + (rect.w - width) / 2.0,
            y,
            text: line.to_string(),
        });
        y -= leading;
    }

    page.commands.push(DrawCommand::Text {
        lines,
        font,
        font_size: size,
        color: Color::BLACK,
    });
    page
}
