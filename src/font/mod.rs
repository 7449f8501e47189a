//! # Font Management
//!
//! Overlays only use the standard PDF fonts, which every viewer ships and
//! which need no embedding. Templates name fonts by their PDF base name
//! (`Helvetica`, `Times-Roman`, ...); unknown names fall back to the
//! closest standard face, keeping serif and weight where the name says so.

pub mod encoding;
pub mod metrics;

use log::warn;

pub use metrics::StandardFontMetrics;

/// The standard fonts an overlay can draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
        }
    }

    /// Exact lookup by PDF base name.
    pub fn from_name(name: &str) -> Option<Self> {
        let font = match name {
            "Helvetica" => Self::Helvetica,
            "Helvetica-Bold" => Self::HelveticaBold,
            "Helvetica-Oblique" => Self::HelveticaOblique,
            "Helvetica-BoldOblique" => Self::HelveticaBoldOblique,
            "Courier" => Self::Courier,
            "Courier-Bold" => Self::CourierBold,
            "Courier-Oblique" => Self::CourierOblique,
            "Courier-BoldOblique" => Self::CourierBoldOblique,
            "Times-Roman" => Self::TimesRoman,
            "Times-Bold" => Self::TimesBold,
            "Times-Italic" => Self::TimesItalic,
            "Times-BoldItalic" => Self::TimesBoldItalic,
            _ => return None,
        };
        Some(font)
    }

    /// Look up a font, falling back to the closest standard face with a
    /// warning.
    pub fn resolve(name: &str) -> Self {
        let base = name.split_once('+').map(|(_, rest)| rest).unwrap_or(name);
        if let Some(font) = Self::from_name(base) {
            return font;
        }
        let fallback = Self::closest(name);
        warn!("Unknown font '{}', using {}", name, fallback.pdf_name());
        fallback
    }

    /// Exact match, else a guess from the name: embedded subset prefixes
    /// (`ABCDEF+`) are ignored, `Times`/`Serif` picks the serif faces and
    /// `Bold`/`Italic`/`Oblique` keep the style. Everything else is
    /// Helvetica.
    pub fn closest(name: &str) -> Self {
        let base = name.split_once('+').map(|(_, rest)| rest).unwrap_or(name);
        if let Some(font) = Self::from_name(base) {
            return font;
        }
        let bold = base.contains("Bold");
        let slanted = base.contains("Italic") || base.contains("Oblique");
        let serif = base.contains("Times") || (base.contains("Serif") && !base.contains("Sans"));
        match (serif, bold, slanted) {
            (true, false, false) => Self::TimesRoman,
            (true, true, false) => Self::TimesBold,
            (true, false, true) => Self::TimesItalic,
            (true, true, true) => Self::TimesBoldItalic,
            (false, false, false) => Self::Helvetica,
            (false, true, false) => Self::HelveticaBold,
            (false, false, true) => Self::HelveticaOblique,
            (false, true, true) => Self::HelveticaBoldOblique,
        }
    }

    /// Glyph metrics for this font.
    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA_METRICS,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD_METRICS,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                &metrics::COURIER_METRICS
            }
            Self::TimesRoman => &metrics::TIMES_ROMAN_METRICS,
            Self::TimesBold => &metrics::TIMES_BOLD_METRICS,
            Self::TimesItalic => &metrics::TIMES_ITALIC_METRICS,
            Self::TimesBoldItalic => &metrics::TIMES_BOLD_ITALIC_METRICS,
        }
    }

    /// Width of `text` at `font_size`, in points.
    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        self.metrics().measure_string(text, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_roundtrip() {
        for font in [
            StandardFont::Helvetica,
            StandardFont::HelveticaBold,
            StandardFont::CourierBoldOblique,
            StandardFont::TimesRoman,
            StandardFont::TimesBoldItalic,
        ] {
            assert_eq!(StandardFont::from_name(font.pdf_name()), Some(font));
        }
    }

    #[test]
    fn test_resolve_fallbacks() {
        assert_eq!(StandardFont::resolve("Arial"), StandardFont::Helvetica);
        assert_eq!(StandardFont::resolve("Arial-BoldMT"), StandardFont::HelveticaBold);
        assert_eq!(StandardFont::resolve("TimesNewRomanPS-BoldMT"), StandardFont::TimesBold);
        assert_eq!(
            StandardFont::resolve("ABCDEF+Helvetica-Bold"),
            StandardFont::HelveticaBold
        );
    }

    #[test]
    fn test_times_uses_its_own_widths() {
        let font = StandardFont::resolve("Times-Roman");
        assert_eq!(font, StandardFont::TimesRoman);
        // C 667, E 611, O 722
        assert!((font.measure("CEO", 10.0) - 20.0).abs() < 1e-9);
        assert!((StandardFont::Helvetica.measure("CEO", 10.0) - 21.67).abs() < 1e-9);
    }

    #[test]
    fn test_oblique_shares_upright_widths() {
        let a = StandardFont::Helvetica.measure("Gerente", 10.0);
        let b = StandardFont::HelveticaOblique.measure("Gerente", 10.0);
        assert!((a - b).abs() < 1e-9);
    }
}
