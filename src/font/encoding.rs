//! WinAnsiEncoding, the single-byte encoding used for standard fonts.
//!
//! WinAnsiEncoding is based on Windows-1252. Most codepoints in
//! 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
//! contains special mappings for smart quotes, bullets, dashes, etc.

const SPECIALS: [(u32, u8); 27] = [
    (0x20AC, 0x80), // Euro sign
    (0x201A, 0x82), // Single low-9 quotation mark
    (0x0192, 0x83), // Latin small letter f with hook
    (0x201E, 0x84), // Double low-9 quotation mark
    (0x2026, 0x85), // Horizontal ellipsis
    (0x2020, 0x86), // Dagger
    (0x2021, 0x87), // Double dagger
    (0x02C6, 0x88), // Modifier letter circumflex accent
    (0x2030, 0x89), // Per mille sign
    (0x0160, 0x8A), // Latin capital letter S with caron
    (0x2039, 0x8B), // Single left-pointing angle quotation
    (0x0152, 0x8C), // Latin capital ligature OE
    (0x017D, 0x8E), // Latin capital letter Z with caron
    (0x2018, 0x91), // Left single quotation mark
    (0x2019, 0x92), // Right single quotation mark
    (0x201C, 0x93), // Left double quotation mark
    (0x201D, 0x94), // Right double quotation mark
    (0x2022, 0x95), // Bullet
    (0x2013, 0x96), // En dash
    (0x2014, 0x97), // Em dash
    (0x02DC, 0x98), // Small tilde
    (0x2122, 0x99), // Trade mark sign
    (0x0161, 0x9A), // Latin small letter s with caron
    (0x203A, 0x9B), // Single right-pointing angle quotation
    (0x0153, 0x9C), // Latin small ligature oe
    (0x017E, 0x9E), // Latin small letter z with caron
    (0x0178, 0x9F), // Latin capital letter Y with diaeresis
];

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
pub fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    SPECIALS.iter().find(|(u, _)| *u == cp).map(|(_, b)| *b)
}

/// Map a WinAnsiEncoding byte back to its character.
///
/// Control bytes and unassigned slots decode to `None`.
pub fn winansi_to_unicode(byte: u8) -> Option<char> {
    match byte {
        0x20..=0x7E | 0xA0..=0xFF => Some(byte as char),
        0x80..=0x9F => SPECIALS
            .iter()
            .find(|(_, b)| *b == byte)
            .and_then(|(u, _)| char::from_u32(*u)),
        _ => None,
    }
}

/// Encode text as the body of a PDF literal string, escaping delimiters
/// and writing non-ASCII bytes as octal escapes. Unmappable characters
/// become `?`.
pub fn encode_literal(text: &str) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}
