//! Base-14 fonts used in exported documents
//!
//! Every PDF reader ships Helvetica and Courier, so nothing is embedded.
//! Text is written in WinAnsi (Windows-1252) encoding; widths come from the
//! standard Adobe font metrics for the printable ASCII range.

use encoding_rs::{EncoderResult, WINDOWS_1252};

/// Helvetica advance widths for U+0020..=U+007E, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Helvetica-Bold advance widths for U+0020..=U+007E, in 1/1000 em
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// Width used for characters outside the table
const FALLBACK_WIDTH: u16 = 556;

/// Every Courier glyph has the same advance
const COURIER_WIDTH: u16 = 600;

/// A base-14 font face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    Mono,
    MonoBold,
}

impl Font {
    /// All faces, in resource order
    pub const ALL: [Font; 6] = [
        Font::Regular,
        Font::Bold,
        Font::Italic,
        Font::BoldItalic,
        Font::Mono,
        Font::MonoBold,
    ];

    /// Pick the face for a combination of inline styles
    pub fn for_style(bold: bool, italic: bool, code: bool) -> Self {
        match (code, bold, italic) {
            (true, true, _) => Self::MonoBold,
            (true, false, _) => Self::Mono,
            (false, true, true) => Self::BoldItalic,
            (false, true, false) => Self::Bold,
            (false, false, true) => Self::Italic,
            (false, false, false) => Self::Regular,
        }
    }

    /// PostScript name of the standard font
    pub fn base_name(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Italic => "Helvetica-Oblique",
            Self::BoldItalic => "Helvetica-BoldOblique",
            Self::Mono => "Courier",
            Self::MonoBold => "Courier-Bold",
        }
    }

    /// Name under which the font is registered in page resources
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
            Self::BoldItalic => "F4",
            Self::Mono => "F5",
            Self::MonoBold => "F6",
        }
    }

    pub fn is_mono(self) -> bool {
        matches!(self, Self::Mono | Self::MonoBold)
    }

    /// Advance width of a character, in 1/1000 em
    pub fn advance(self, ch: char) -> u16 {
        if self.is_mono() {
            return COURIER_WIDTH;
        }
        let table = match self {
            Self::Bold | Self::BoldItalic => &HELVETICA_BOLD_WIDTHS,
            _ => &HELVETICA_WIDTHS,
        };
        let code = ch as u32;
        if (0x20..=0x7e).contains(&code) {
            table[(code - 0x20) as usize]
        } else {
            FALLBACK_WIDTH
        }
    }

    /// Width of `text` set at `size`, in the same unit as `size`
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.advance(c))).sum();
        units as f32 * size / 1000.0
    }
}

/// Encode text as WinAnsi bytes; characters outside the code page become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut encoder = WINDOWS_1252.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 256];
    let mut src = text;

    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(src, &mut buf, true);
        out.extend_from_slice(&buf[..written]);
        src = &src[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => out.push(b'?'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_for_style() {
        assert_eq!(Font::for_style(false, false, false), Font::Regular);
        assert_eq!(Font::for_style(true, true, false), Font::BoldItalic);
        assert_eq!(Font::for_style(false, true, true), Font::Mono);
        assert_eq!(Font::for_style(true, false, true), Font::MonoBold);
    }

    #[test]
    fn test_resource_names_are_unique() {
        let names: std::collections::HashSet<_> =
            Font::ALL.iter().map(|f| f.resource_name()).collect();
        assert_eq!(names.len(), Font::ALL.len());
    }

    #[test]
    fn test_helvetica_widths() {
        assert_eq!(Font::Regular.advance(' '), 278);
        assert_eq!(Font::Regular.advance('W'), 944);
        assert_eq!(Font::Regular.advance('i'), 222);
        assert_eq!(Font::Bold.advance('i'), 278);
        assert_eq!(Font::Italic.advance('m'), Font::Regular.advance('m'));
        assert_eq!(Font::Regular.advance('\u{4e2d}'), FALLBACK_WIDTH);
    }

    #[test]
    fn test_text_width() {
        // "Hi" = 722 + 222
        assert_relative_eq!(Font::Regular.text_width("Hi", 10.0), 9.44, epsilon = 1e-4);
        assert_relative_eq!(Font::Mono.text_width("abcd", 10.0), 24.0, epsilon = 1e-4);
        assert_relative_eq!(Font::Regular.text_width("", 12.0), 0.0);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("abc"), b"abc".to_vec());
        assert_eq!(encode_win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(
            encode_win_ansi("\u{2022} \u{201c}q\u{201d}"),
            vec![0x95, b' ', 0x93, b'q', 0x94]
        );
        assert_eq!(encode_win_ansi("\u{4e2d}x"), b"?x".to_vec());
    }

    #[test]
    fn test_encode_long_input() {
        let text = "a".repeat(1000);
        assert_eq!(encode_win_ansi(&text).len(), 1000);
    }
}
