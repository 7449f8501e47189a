//! # Word Extraction
//!
//! Reads positioned words off a PDF page. This is the narrow interface the
//! rest of the crate consumes: a list of [`WordBox`]es in top-down
//! coordinates relative to the page's media box, plus the page size.
//!
//! [`content`] interprets the page's content stream into glyph boxes;
//! this module assembles glyphs into words and searches them.

pub mod content;

use std::path::Path;

use log::debug;
use lopdf::Document;

use crate::config::ExtractionSettings;
use crate::document;
use crate::error::Result;
use crate::geometry::TopDownBox;

pub use content::Glyph;

/// `top` tolerance used when bucketing words into lines for search.
const SEARCH_LINE_TOLERANCE: f64 = 3.0;

/// One word as reported by text extraction, in top-down coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct WordBox {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    /// `(x0, x1)` of each character of `text`. May be empty for words not
    /// built from glyphs; the word's width is then split evenly.
    pub chars: Vec<(f64, f64)>,
}

impl WordBox {
    pub fn bounds(&self) -> TopDownBox {
        TopDownBox {
            x0: self.x0,
            x1: self.x1,
            top: self.top,
            bottom: self.bottom,
        }
    }

    /// Box of the characters `start..end` (char indices, end exclusive).
    pub fn char_bounds(&self, start: usize, end: usize) -> TopDownBox {
        let n = self.text.chars().count();
        let (x0, x1) = if self.chars.len() == n && start < end && end <= n {
            (self.chars[start].0, self.chars[end - 1].1)
        } else if n > 0 {
            let step = (self.x1 - self.x0) / n as f64;
            (
                self.x0 + step * start.min(n) as f64,
                self.x0 + step * end.min(n) as f64,
            )
        } else {
            (self.x0, self.x1)
        };
        TopDownBox {
            x0,
            x1,
            top: self.top,
            bottom: self.bottom,
        }
    }
}

/// The words of one page and that page's size.
#[derive(Debug, Clone)]
pub struct PageText {
    pub width: f64,
    pub height: f64,
    pub words: Vec<WordBox>,
}

/// Thresholds for splitting glyph runs into words and lines.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Horizontal gap between glyphs that starts a new word.
    pub word_gap: f64,
    /// Max `top` difference for two glyphs or words to share a line.
    pub line_tolerance: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            word_gap: 3.0,
            line_tolerance: 3.0,
        }
    }
}

impl From<&ExtractionSettings> for ExtractOptions {
    fn from(s: &ExtractionSettings) -> Self {
        Self {
            word_gap: s.word_gap_tolerance,
            line_tolerance: s.same_line_tolerance,
        }
    }
}

/// Extract the words of the zero-based `page_index`.
pub fn extract_page(doc: &Document, page_index: usize, opts: &ExtractOptions) -> Result<PageText> {
    let page_id = document::page_id(doc, page_index)?;
    let [llx, lly, urx, ury] = document::media_box(doc, page_id);

    let glyphs = content::page_glyphs(doc, page_id)?;
    let words = assemble_words(&glyphs, opts);
    debug!(
        "page {}: {} glyphs, {} words",
        page_index,
        glyphs.len(),
        words.len()
    );

    Ok(PageText {
        width: urx - llx,
        height: ury - lly,
        words,
    })
}

/// Open `path` and extract one page.
pub fn extract_file(path: &Path, page_index: usize, opts: &ExtractOptions) -> Result<PageText> {
    let doc = document::open(path)?;
    extract_page(&doc, page_index, opts)
}

/// Split a glyph run into words.
///
/// A word ends at whitespace, at a gap wider than `word_gap`, when the
/// baseline moves off the line, or when text steps backwards.
pub fn assemble_words(glyphs: &[Glyph], opts: &ExtractOptions) -> Vec<WordBox> {
    let mut words = Vec::new();
    let mut current: Option<WordBox> = None;
    let mut last_x0 = f64::NEG_INFINITY;

    for glyph in glyphs {
        if glyph.ch.is_whitespace() {
            words.extend(current.take());
            continue;
        }

        if let Some(word) = &current {
            let off_line = (glyph.top - word.top).abs() >= opts.line_tolerance;
            let gap = glyph.x0 - word.x1 > opts.word_gap;
            let backwards = glyph.x0 < last_x0;
            if off_line || gap || backwards {
                words.extend(current.take());
            }
        }

        match current.as_mut() {
            Some(word) => {
                word.text.push(glyph.ch);
                word.x0 = word.x0.min(glyph.x0);
                word.x1 = word.x1.max(glyph.x1);
                word.top = word.top.min(glyph.top);
                word.bottom = word.bottom.max(glyph.bottom);
                word.chars.push((glyph.x0, glyph.x1));
            }
            None => {
                current = Some(WordBox {
                    text: glyph.ch.to_string(),
                    x0: glyph.x0,
                    x1: glyph.x1,
                    top: glyph.top,
                    bottom: glyph.bottom,
                    chars: vec![(glyph.x0, glyph.x1)],
                });
            }
        }
        last_x0 = glyph.x0;
    }
    words.extend(current);
    words
}

/// Every occurrence of `needle` on the page, boxed to the matched
/// characters only. Case-sensitive; matches never span lines.
/// Results are in reading order.
pub fn search_page(page: &PageText, needle: &str) -> Vec<TopDownBox> {
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for line in lines(&page.words, SEARCH_LINE_TOLERANCE) {
        // Join words with single spaces and remember each word's byte span.
        let mut text = String::new();
        let mut spans = Vec::with_capacity(line.len());
        for word in &line {
            if !text.is_empty() {
                text.push(' ');
            }
            let start = text.len();
            text.push_str(&word.text);
            spans.push((start, text.len()));
        }

        for (start, matched) in text.match_indices(needle) {
            let end = start + matched.len();
            let bounds = line
                .iter()
                .zip(&spans)
                .filter(|(_, (s, e))| *s < end && start < *e)
                .map(|(w, (s, e))| {
                    // cut the word at the matched characters
                    let from = w.text[..start.max(*s) - s].chars().count();
                    let to = w.text[..end.min(*e) - s].chars().count();
                    w.char_bounds(from, to)
                })
                .reduce(|acc, b| acc.union(&b));
            hits.extend(bounds);
        }
    }
    hits
}

/// Words bucketed into visual lines, each line sorted left to right.
fn lines(words: &[WordBox], tolerance: f64) -> Vec<Vec<&WordBox>> {
    let mut sorted: Vec<&WordBox> = words.iter().collect();
    sorted.sort_by(|a, b| {
        a.top
            .round_ties_even()
            .total_cmp(&b.top.round_ties_even())
            .then_with(|| a.x0.total_cmp(&b.x0))
    });

    let mut out: Vec<Vec<&WordBox>> = Vec::new();
    for word in sorted {
        match out.last_mut() {
            Some(line) if (word.top - line[0].top).abs() < tolerance => line.push(word),
            _ => out.push(vec![word]),
        }
    }
    for line in &mut out {
        line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
    out
}
