//! Preview themes
//!
//! A theme selects the stylesheet class applied to the preview container and
//! the palette used when that preview is written to PDF.

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build a color from a `0xRRGGBB` literal
    pub const fn hex(value: u32) -> Self {
        Self(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }

    /// Components in the 0.0..=1.0 range PDF operators expect
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        ]
    }
}

/// Presentation applied to the rendered preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Plain black-on-white typography
    #[default]
    Simple,
    /// Accent-colored headings, links, and code
    Colorful,
}

impl Theme {
    /// The other theme
    pub fn toggle(self) -> Self {
        match self {
            Self::Simple => Self::Colorful,
            Self::Colorful => Self::Simple,
        }
    }

    /// CSS class applied to the preview container
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Simple => "markdown-simple",
            Self::Colorful => "markdown-colorful",
        }
    }

    /// Label of the toggle control, naming the theme a click switches to
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Simple => "Colorful Theme",
            Self::Colorful => "Simple Theme",
        }
    }

    /// Glyph shown on the toggle control
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Self::Simple => "\u{2600}",
            Self::Colorful => "\u{263e}",
        }
    }

    /// Colors used when the preview is exported
    pub fn palette(self) -> Palette {
        match self {
            Self::Simple => Palette {
                text: Rgb::hex(0x1f2937),
                headings: [Rgb::hex(0x111827); 6],
                link: Rgb::hex(0x2563eb),
                code_text: Rgb::hex(0x111827),
                code_background: Rgb::hex(0xf3f4f6),
                quote_text: Rgb::hex(0x4b5563),
                quote_bar: Rgb::hex(0xd1d5db),
                rule: Rgb::hex(0xe5e7eb),
                table_border: Rgb::hex(0xd1d5db),
                table_header: Rgb::hex(0xf9fafb),
            },
            Self::Colorful => Palette {
                text: Rgb::hex(0x1f2937),
                headings: [
                    Rgb::hex(0x4f46e5),
                    Rgb::hex(0x7c3aed),
                    Rgb::hex(0xdb2777),
                    Rgb::hex(0x0d9488),
                    Rgb::hex(0x0d9488),
                    Rgb::hex(0x0d9488),
                ],
                link: Rgb::hex(0xdb2777),
                code_text: Rgb::hex(0x4338ca),
                code_background: Rgb::hex(0xeef2ff),
                quote_text: Rgb::hex(0x5b21b6),
                quote_bar: Rgb::hex(0xa78bfa),
                rule: Rgb::hex(0xc7d2fe),
                table_border: Rgb::hex(0xa5b4fc),
                table_header: Rgb::hex(0xe0e7ff),
            },
        }
    }
}

/// Export colors for one theme
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub text: Rgb,
    /// Heading colors indexed by level - 1
    pub headings: [Rgb; 6],
    pub link: Rgb,
    pub code_text: Rgb,
    pub code_background: Rgb,
    pub quote_text: Rgb,
    pub quote_bar: Rgb,
    pub rule: Rgb,
    pub table_border: Rgb,
    pub table_header: Rgb,
}

impl Palette {
    /// Heading color for a 1-based level (clamped to 1..=6)
    pub fn heading(&self, level: u8) -> Rgb {
        let idx = usize::from(level.clamp(1, 6)) - 1;
        self.headings[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_simple() {
        assert_eq!(Theme::default(), Theme::Simple);
    }

    #[test]
    fn test_toggle_switches_class_and_label() {
        let theme = Theme::Simple;
        assert_eq!(theme.css_class(), "markdown-simple");
        assert_eq!(theme.toggle_label(), "Colorful Theme");

        let toggled = theme.toggle();
        assert_eq!(toggled.css_class(), "markdown-colorful");
        assert_eq!(toggled.toggle_label(), "Simple Theme");
        assert_ne!(theme.toggle_icon(), toggled.toggle_icon());
    }

    #[test]
    fn test_double_toggle_round_trips() {
        for theme in [Theme::Simple, Theme::Colorful] {
            assert_eq!(theme.toggle().toggle(), theme);
            assert_eq!(theme.toggle().toggle().css_class(), theme.css_class());
        }
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::hex(0x4f46e5), Rgb(0x4f, 0x46, 0xe5));
        assert_eq!(Rgb::hex(0xffffff).to_unit(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_palette_heading_clamps_level() {
        let palette = Theme::Colorful.palette();
        assert_eq!(palette.heading(0), palette.headings[0]);
        assert_eq!(palette.heading(9), palette.headings[5]);
    }
}
