//! # Overlap Detection
//!
//! Axis-aligned box intersection with padding, plus the adaptive padding
//! policy used before painting a white-out rectangle.
//!
//! Both boxes are grown by `padding` on every side. They are separate only
//! when one expanded edge lies strictly past the other's on some axis, so
//! boxes whose expanded edges touch exactly still count as overlapping.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ReplacementSettings;
use crate::geometry::PdfRect;
use crate::snapshot::TextElement;

/// Separating-axis test on the padded boxes.
pub fn overlaps(a: &PdfRect, b: &PdfRect, padding: f64) -> bool {
    let a = a.expand(padding);
    let b = b.expand(padding);
    let separated = a.right() < b.x || b.right() < a.x || a.top() < b.y || b.top() < a.y;
    !separated
}

/// Elements whose boxes overlap `target`, skipping elements with the
/// target's own text.
pub fn find_overlapping<'a, I>(target: &TextElement, candidates: I, padding: f64) -> Vec<&'a TextElement>
where
    I: IntoIterator<Item = &'a TextElement>,
{
    candidates
        .into_iter()
        .filter(|other| other.text != target.text && overlaps(&target.rect, &other.rect, padding))
        .collect()
}

/// Shrink the white-out area when a neighbor sits strictly above it.
///
/// Only the height changes; the box keeps its bottom edge, so the top edge
/// moves down and away from the neighbor.
pub fn adjust_replacement_area(target: &PdfRect, neighbors: &[&TextElement], height_shrink: f64) -> PdfRect {
    let above = neighbors
        .iter()
        .map(|n| n.rect.y)
        .filter(|y| *y > target.y)
        .fold(f64::NEG_INFINITY, f64::max);

    if above > target.top() {
        debug!(
            "neighbor above at y={:.2}, shrinking height {:.2} by factor {}",
            above, target.h, height_shrink
        );
        PdfRect {
            h: target.h * height_shrink,
            ..*target
        }
    } else {
        *target
    }
}

/// Minimal padding when neighbors are close, the roomier default otherwise.
pub fn whiteout_padding(has_neighbors: bool, settings: &ReplacementSettings) -> f64 {
    if has_neighbors {
        settings.tight_padding
    } else {
        settings.padding
    }
}

/// A pair of elements that sit close enough to collide, for operator review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub a: String,
    pub b: String,
}

/// Every unordered pair of overlapping elements, in input order.
pub fn collisions(elements: &[&TextElement], padding: f64) -> Vec<Collision> {
    let mut found = Vec::new();
    for (i, a) in elements.iter().enumerate() {
        for b in &elements[i + 1..] {
            if overlaps(&a.rect, &b.rect, padding) {
                found.push(Collision {
                    a: a.text.clone(),
                    b: b.text.clone(),
                });
            }
        }
    }
    found
}
