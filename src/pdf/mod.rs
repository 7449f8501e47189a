//! # PDF Serializer
//!
//! Writes overlay pages as a small, self-contained PDF. Only the standard
//! Type1 fonts are referenced, so nothing is embedded; content streams are
//! Flate-compressed.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, content streams, pages
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::encoding::encode_literal;
use crate::font::StandardFont;
use crate::render::{Color, DrawCommand, OverlayPage};

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Font -> object id; the resource name is `/F{index}`.
    font_objects: Vec<(StandardFont, usize)>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write one overlay page.
    pub fn write(&self, page: &OverlayPage) -> Vec<u8> {
        self.write_pages(std::slice::from_ref(page))
    }

    /// Write several pages into one document, in order.
    pub fn write_pages(&self, pages: &[OverlayPage]) -> Vec<u8> {
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then content stream / page pairs
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            font_objects: Vec::new(),
        };

        for page in pages {
            for font in page.fonts() {
                if builder.font_objects.iter().any(|(f, _)| *f == font) {
                    continue;
                }
                let id = builder.objects.len();
                builder.objects.push(
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                        font.pdf_name()
                    )
                    .into_bytes(),
                );
                builder.font_objects.push((font, id));
            }
        }

        let font_resources: String = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, id))| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_obj_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.build_content_stream(page, &builder.font_objects);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(content_data);

            let page_obj_id = builder.objects.len();
            builder.objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                    page.width, page.height, content_obj_id, font_resources
                )
                .into_bytes(),
            );
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.objects.len();
        builder.objects.push(
            format!(
                "<< /Producer (orgchart {}) >>",
                env!("CARGO_PKG_VERSION")
            )
            .into_bytes(),
        );

        self.serialize(&builder, info_obj_id)
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &OverlayPage, font_objects: &[(StandardFont, usize)]) -> String {
        let mut stream = String::new();

        for command in &page.commands {
            match command {
                DrawCommand::FillRect { rect, color } => {
                    let _ = write!(stream, "q\n{}", fill_color(color));
                    let _ = write!(
                        stream,
                        "{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        rect.x, rect.y, rect.w, rect.h
                    );
                }
                DrawCommand::Text {
                    lines,
                    font,
                    font_size,
                    color,
                } => {
                    let idx = font_objects
                        .iter()
                        .position(|(f, _)| f == font)
                        .unwrap_or(0);
                    for line in lines {
                        if line.text.is_empty() {
                            continue;
                        }
                        let _ = write!(
                            stream,
                            "BT\n{}/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                            fill_color(color),
                            idx,
                            font_size,
                            line.x,
                            line.y,
                            encode_literal(&line.text)
                        );
                    }
                }
            }
        }

        stream
    }

    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

fn fill_color(color: &Color) -> String {
    format!("{:.3} {:.3} {:.3} rg\n", color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PdfRect;
    use crate::render::TextLine;

    fn text(font: StandardFont, s: &str) -> DrawCommand {
        DrawCommand::Text {
            lines: vec![TextLine {
                x: 54.0,
                y: 700.0,
                text: s.to_string(),
            }],
            font,
            font_size: 10.0,
            color: Color::BLACK,
        }
    }

    #[test]
    fn test_empty_page_produces_valid_pdf() {
        let bytes = PdfWriter::new().write(&OverlayPage::default());

        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn test_fonts_registered_once_each() {
        let mut page = OverlayPage::new(600.0, 800.0);
        page.commands.push(text(StandardFont::Helvetica, "A"));
        page.commands.push(text(StandardFont::HelveticaBold, "B"));
        page.commands.push(text(StandardFont::Helvetica, "C"));
        let bytes = PdfWriter::new().write(&page);
        let text = String::from_utf8_lossy(&bytes);

        assert_eq!(text.matches("/BaseFont /Helvetica ").count(), 1);
        assert_eq!(text.matches("/BaseFont /Helvetica-Bold ").count(), 1);
    }

    #[test]
    fn test_content_stream_operators() {
        let mut page = OverlayPage::new(600.0, 800.0);
        page.commands.push(DrawCommand::FillRect {
            rect: PdfRect::new(10.0, 20.0, 30.0, 40.0),
            color: Color::WHITE,
        });
        page.commands.push(text(StandardFont::HelveticaBold, "Diego (Piñero)"));
        let content = PdfWriter::new().build_content_stream(&page, &[(StandardFont::HelveticaBold, 3)]);

        assert!(content.contains("1.000 1.000 1.000 rg\n10.00 20.00 30.00 40.00 re\nf\n"));
        assert!(content.contains("/F0 10.0 Tf\n54.00 700.00 Td\n(Diego \\(Pi\\361ero\\)) Tj"));
    }

    #[test]
    fn test_reparses_with_lopdf() {
        let mut page = OverlayPage::new(600.0, 800.0);
        page.commands.push(text(StandardFont::Helvetica, "CEO"));
        let bytes = PdfWriter::new().write_pages(&[page.clone(), page]);
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }
}
