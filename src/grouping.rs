//! # Phrase Grouping
//!
//! Text extraction yields single words. Titles and names on an org chart are
//! multi-word phrases and have to be replaced as one unit, otherwise a
//! replacement leaves stray fragments behind.
//!
//! Words are put in reading order (rounded `top`, then `x0`) and walked once.
//! A word joins the open group when it sits on the same line as the group's
//! last word and starts within `distance` of that word's right edge.
//! Grouping is line-local: it never merges across a vertical gap.

use std::cmp::Ordering;

use crate::extract::WordBox;
use crate::geometry::{to_pdf_space, TopDownBox};
use crate::snapshot::TextElement;

/// Thresholds for [`group_words`], in extraction units.
#[derive(Debug, Clone, Copy)]
pub struct GroupingParams {
    /// Max gap between a word's `x0` and the previous word's `x1`.
    pub distance: f64,
    /// Max `top` difference for two words to share a line.
    pub same_line: f64,
    /// Padding handed to the coordinate transform.
    pub padding: f64,
}

impl Default for GroupingParams {
    fn default() -> Self {
        Self {
            distance: 5.0,
            same_line: 3.0,
            padding: 2.0,
        }
    }
}

impl From<&crate::config::ExtractionSettings> for GroupingParams {
    fn from(s: &crate::config::ExtractionSettings) -> Self {
        Self {
            distance: s.group_distance,
            same_line: s.same_line_tolerance,
            padding: s.box_padding,
        }
    }
}

/// Merge words into phrase-level elements, one per group.
///
/// Output elements are in reading order and have no type yet.
pub fn group_words(words: &[WordBox], page_height: f64, params: &GroupingParams) -> Vec<TextElement> {
    let mut sorted: Vec<&WordBox> = words.iter().collect();
    sorted.sort_by(|a, b| reading_order(a, b));

    let mut groups: Vec<Vec<&WordBox>> = Vec::new();
    let mut current: Vec<&WordBox> = Vec::new();

    for word in sorted {
        if let Some(last) = current.last() {
            let same_line = (word.top - last.top).abs() < params.same_line;
            let close = word.x0 - last.x1 < params.distance;
            if !(same_line && close) {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(word);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
        .iter()
        .map(|group| group_to_element(group, page_height, params.padding))
        .collect()
}

fn reading_order(a: &WordBox, b: &WordBox) -> Ordering {
    let row_a = a.top.round_ties_even();
    let row_b = b.top.round_ties_even();
    row_a
        .total_cmp(&row_b)
        .then_with(|| a.x0.total_cmp(&b.x0))
        // Full tie-break keeps the output independent of input order.
        .then_with(|| a.top.total_cmp(&b.top))
        .then_with(|| a.x1.total_cmp(&b.x1))
        .then_with(|| a.text.cmp(&b.text))
}

fn group_to_element(group: &[&WordBox], page_height: f64, padding: f64) -> TextElement {
    let text = group
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let bounds = group
        .iter()
        .map(|w| w.bounds())
        .reduce(|acc, b| acc.union(&b))
        .unwrap_or(TopDownBox { x0: 0.0, x1: 0.0, top: 0.0, bottom: 0.0 });

    TextElement::new(text, to_pdf_space(&bounds, page_height, padding))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x0: f64, x1: f64, top: f64) -> WordBox {
        WordBox {
            text: text.to_string(),
            x0,
            x1,
            top,
            bottom: top + 8.0,
            chars: Vec::new(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(group_words(&[], 800.0, &GroupingParams::default()).is_empty());
    }

    #[test]
    fn test_single_word() {
        let out = group_words(&[word("CEO", 10.0, 30.0, 100.0)], 800.0, &GroupingParams::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "CEO");
        assert!(out[0].element_type.is_none());
    }

    #[test]
    fn test_close_words_merge() {
        let words = vec![
            word("Carlos", 100.0, 126.0, 50.0),
            word("Andreani", 129.0, 165.0, 50.2),
        ];
        let out = group_words(&words, 800.0, &GroupingParams::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "Carlos Andreani");
        // union box: x0=100 x1=165 top=50 bottom=58.2, padded by 2
        let r = out[0].rect;
        assert!((r.x - 98.0).abs() < 1e-9);
        assert!((r.w - 69.0).abs() < 1e-9);
        assert!((r.y - (800.0 - 58.2 - 2.0)).abs() < 1e-9);
        assert!((r.h - 12.2).abs() < 1e-9);
    }

    #[test]
    fn test_wide_gap_splits() {
        let words = vec![
            word("Carlos", 100.0, 126.0, 50.0),
            word("Andreani", 140.0, 176.0, 50.0),
        ];
        let out = group_words(&words, 800.0, &GroupingParams::default());
        let texts: Vec<&str> = out.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Carlos", "Andreani"]);
    }

    #[test]
    fn test_never_merges_across_lines() {
        let words = vec![
            word("GERENTE", 100.0, 140.0, 50.0),
            word("GENERAL", 100.0, 140.0, 60.0),
        ];
        let out = group_words(&words, 800.0, &GroupingParams::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_reading_order_from_shuffled_input() {
        let words = vec![
            word("GENERAL", 143.0, 180.0, 50.0),
            word("Second", 10.0, 40.0, 90.0),
            word("GERENTE", 100.0, 140.0, 50.0),
        ];
        let out = group_words(&words, 800.0, &GroupingParams::default());
        let texts: Vec<&str> = out.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["GERENTE GENERAL", "Second"]);
    }

    #[test]
    fn test_half_row_rounds_to_even() {
        // 10.5 is row 10, so it reads before row 11 despite its larger x0
        let words = vec![
            word("Left", 100.0, 120.0, 11.4),
            word("Right", 300.0, 330.0, 10.5),
        ];
        let out = group_words(&words, 800.0, &GroupingParams::default());
        let texts: Vec<&str> = out.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["Right", "Left"]);
    }
}
