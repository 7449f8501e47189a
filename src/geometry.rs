//! # Page Geometry
//!
//! Two coordinate systems meet in this crate:
//!
//! ```text
//! extraction space (top-down)      drawing space (PDF user space)
//! (0,0) ──────► x                  y ▲
//!   │                                │
//!   ▼ y                        (0,0) └──────► x
//! ```
//!
//! Word extraction reports `x0, x1, top, bottom` measured from the top-left
//! corner. PDF drawing operators want `x, y, w, h` with `y` measured up from
//! the bottom edge. The transform flips the y axis and pads the box on every
//! side; it never clamps to the page.

use serde::{Deserialize, Serialize};

/// Padding applied by the coordinate transform unless configured otherwise.
pub const DEFAULT_BOX_PADDING: f64 = 2.0;

/// An axis-aligned box in extraction (top-down) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopDownBox {
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

/// An axis-aligned box in drawing space: bottom-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl TopDownBox {
    /// Smallest box containing both.
    pub fn union(&self, other: &TopDownBox) -> TopDownBox {
        TopDownBox {
            x0: self.x0.min(other.x0),
            x1: self.x1.max(other.x1),
            top: self.top.min(other.top),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

impl PdfRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn top(&self) -> f64 {
        self.y + self.h
    }

    /// Grow the rectangle by `padding` on all four sides.
    pub fn expand(&self, padding: f64) -> PdfRect {
        PdfRect {
            x: self.x - padding,
            y: self.y - padding,
            w: self.w + padding * 2.0,
            h: self.h + padding * 2.0,
        }
    }

    /// Round every component to two decimals, as snapshots store them.
    pub fn rounded(&self) -> PdfRect {
        PdfRect {
            x: round2(self.x),
            y: round2(self.y),
            w: round2(self.w),
            h: round2(self.h),
        }
    }
}

/// Flip a top-down box into drawing space and pad it.
///
/// `x = x0 - p`, `y = H - bottom - p`, `w = (x1 - x0) + 2p`,
/// `h = (bottom - top) + 2p`.
pub fn to_pdf_space(b: &TopDownBox, page_height: f64, padding: f64) -> PdfRect {
    PdfRect {
        x: b.x0 - padding,
        y: page_height - b.bottom - padding,
        w: b.width() + padding * 2.0,
        h: b.height() + padding * 2.0,
    }
}

/// Inverse of [`to_pdf_space`] for the same page height and padding.
pub fn to_top_down(r: &PdfRect, page_height: f64, padding: f64) -> TopDownBox {
    let x0 = r.x + padding;
    let bottom = page_height - r.y - padding;
    TopDownBox {
        x0,
        x1: x0 + r.w - padding * 2.0,
        top: bottom - (r.h - padding * 2.0),
        bottom,
    }
}

/// Two decimals, ties to even.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_and_pad() {
        let b = TopDownBox { x0: 100.0, x1: 150.0, top: 40.0, bottom: 52.0 };
        let r = to_pdf_space(&b, 842.0, 2.0);
        assert_eq!(r, PdfRect::new(98.0, 788.0, 54.0, 16.0));
    }

    #[test]
    fn test_zero_padding_is_pure_flip() {
        let b = TopDownBox { x0: 0.0, x1: 10.0, top: 0.0, bottom: 10.0 };
        let r = to_pdf_space(&b, 100.0, 0.0);
        assert_eq!(r, PdfRect::new(0.0, 90.0, 10.0, 10.0));
    }

    #[test]
    fn test_no_clamping_at_page_edge() {
        let b = TopDownBox { x0: 0.5, x1: 20.0, top: 0.5, bottom: 8.0 };
        let r = to_pdf_space(&b, 100.0, 2.0);
        assert!(r.x < 0.0);
        assert!(r.top() > 100.0);
    }

    #[test]
    fn test_inverse() {
        let b = TopDownBox { x0: 12.25, x1: 80.5, top: 300.0, bottom: 311.75 };
        let back = to_top_down(&to_pdf_space(&b, 595.0, 2.0), 595.0, 2.0);
        assert!((back.x0 - b.x0).abs() < 1e-9);
        assert!((back.x1 - b.x1).abs() < 1e-9);
        assert!((back.top - b.top).abs() < 1e-9);
        assert!((back.bottom - b.bottom).abs() < 1e-9);
    }

    #[test]
    fn test_union() {
        let a = TopDownBox { x0: 10.0, x1: 20.0, top: 5.0, bottom: 15.0 };
        let b = TopDownBox { x0: 22.0, x1: 40.0, top: 4.0, bottom: 14.0 };
        assert_eq!(
            a.union(&b),
            TopDownBox { x0: 10.0, x1: 40.0, top: 4.0, bottom: 15.0 }
        );
    }

    #[test]
    fn test_rounded() {
        let r = PdfRect::new(1.005, 2.344, 3.999, 4.0).rounded();
        assert_eq!(r.y, 2.34);
        assert_eq!(r.w, 4.0);
    }

    #[test]
    fn test_round2_ties_to_even() {
        // both are exact binary halves after scaling
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
    }
}
