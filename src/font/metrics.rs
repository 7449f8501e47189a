//! Advance widths for the standard PDF fonts, in 1/1000 em.
//!
//! Values come from the Adobe Core 14 AFM files for the printable ASCII
//! range (0x20..=0x7E). Latin-1 letters with diacritics share the width of
//! their base letter in these fonts, so they are folded onto it.

/// Width table for one standard font face.
#[derive(Debug)]
pub struct StandardFontMetrics {
    /// Widths for 0x20..=0x7E, or `None` for monospaced faces.
    ascii: Option<&'static [u16; 95]>,
    /// Width used for monospaced faces and unknown glyphs.
    default_width: u16,
    /// Descent below the baseline, in 1/1000 em (negative).
    pub descent: i16,
}

impl StandardFontMetrics {
    /// Width of one glyph in 1/1000 em.
    pub fn glyph_width(&self, ch: char) -> u16 {
        let Some(table) = self.ascii else {
            return self.default_width;
        };
        let ch = fold_diacritic(ch);
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            table[(cp - 0x20) as usize]
        } else {
            self.default_width
        }
    }

    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.glyph_width(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|c| self.char_width(c, font_size)).sum()
    }
}

fn fold_diacritic(ch: char) -> char {
    match ch {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        'Ý' => 'Y',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        '\u{00A0}' => ' ',
        other => other,
    }
}

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
static TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

#[rustfmt::skip]
static TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

#[rustfmt::skip]
static TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 675, 675, 675, 500, 920,
    611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833,
    667, 722, 611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556,
    389, 278, 389, 422, 500, 333,
    500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722,
    500, 500, 500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389,
    400, 275, 400, 541,
];

#[rustfmt::skip]
static TIMES_BOLD_ITALIC: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 832,
    667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889,
    722, 722, 611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611,
    333, 278, 333, 570, 500, 333,
    500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778,
    556, 500, 500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389,
    348, 220, 348, 570,
];

pub(crate) static HELVETICA_METRICS: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&HELVETICA),
    default_width: 556,
    descent: -207,
};

pub(crate) static HELVETICA_BOLD_METRICS: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&HELVETICA_BOLD),
    default_width: 556,
    descent: -207,
};

pub(crate) static COURIER_METRICS: StandardFontMetrics = StandardFontMetrics {
    ascii: None,
    default_width: 600,
    descent: -157,
};

pub(crate) static TIMES_ROMAN_METRICS: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&TIMES_ROMAN),
    default_width: 500,
    descent: -217,
};

pub(crate) static TIMES_BOLD_METRICS: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&TIMES_BOLD),
    default_width: 500,
    descent: -217,
};

pub(crate) static TIMES_ITALIC_METRICS: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&TIMES_ITALIC),
    default_width: 500,
    descent: -217,
};

pub(crate) static TIMES_BOLD_ITALIC_METRICS: StandardFontMetrics = StandardFontMetrics {
    ascii: Some(&TIMES_BOLD_ITALIC),
    default_width: 500,
    descent: -217,
};


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_width() {
        assert!((HELVETICA_METRICS.char_width(' ', 12.0) - 3.336).abs() < 1e-9);
    }

    #[test]
    fn test_times_roman_afm_widths() {
        // T 611, i 278, m 778, e 444, s 389
        let w = TIMES_ROMAN_METRICS.measure_string("Times", 10.0);
        assert!((w - 25.0).abs() < 1e-9);
        assert_eq!(TIMES_BOLD_METRICS.glyph_width('W'), 1000);
        assert_eq!(TIMES_ITALIC_METRICS.glyph_width('m'), 722);
        assert_eq!(TIMES_BOLD_ITALIC_METRICS.glyph_width('@'), 832);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = HELVETICA_METRICS.measure_string("Carlos Andreani", 10.0);
        let bold = HELVETICA_BOLD_METRICS.measure_string("Carlos Andreani", 10.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_accents_fold_to_base_letter() {
        assert_eq!(HELVETICA_METRICS.glyph_width('ñ'), HELVETICA_METRICS.glyph_width('n'));
        assert_eq!(HELVETICA_METRICS.glyph_width('Í'), HELVETICA_METRICS.glyph_width('I'));
    }

    #[test]
    fn test_courier_is_monospaced() {
        assert_eq!(COURIER_METRICS.glyph_width('i'), COURIER_METRICS.glyph_width('W'));
    }

    #[test]
    fn test_table_spot_checks() {
        assert_eq!(HELVETICA_METRICS.glyph_width('A'), 667);
        assert_eq!(HELVETICA_METRICS.glyph_width('z'), 500);
        assert_eq!(HELVETICA_METRICS.glyph_width('~'), 584);
        assert_eq!(HELVETICA_BOLD_METRICS.glyph_width('m'), 889);
    }
}
