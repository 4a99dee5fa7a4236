//! Snapshot of the live preview handed to the exporter

use crate::document::Document;
use crate::theme::Theme;
use std::path::PathBuf;

/// Size of the captured region in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Letter width at 96 dpi; used when the preview cannot be measured
    pub const DEFAULT: Viewport = Viewport {
        width: 816.0,
        height: 1056.0,
    };

    /// Build a viewport, rejecting degenerate measurements
    pub fn new(width: f32, height: f32) -> Self {
        if width.is_finite() && width >= 1.0 {
            Self {
                width,
                height: if height.is_finite() { height.max(1.0) } else { 1.0 },
            }
        } else {
            Self::DEFAULT
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The preview as it stands when export is triggered
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewCapture {
    /// Rendered content (placeholder included when the editor is empty)
    pub document: Document,
    pub theme: Theme,
    /// Scroll size of the preview element
    pub viewport: Viewport,
    /// Directory relative image paths resolve against
    pub base_dir: Option<PathBuf>,
}

impl PreviewCapture {
    /// Capture the preview for the given editor text and theme
    pub fn new(text: &str, theme: Theme, viewport: Viewport) -> Self {
        Self {
            document: Document::render(text),
            theme,
            viewport,
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_rejects_degenerate_sizes() {
        assert_eq!(Viewport::new(0.0, 100.0), Viewport::DEFAULT);
        assert_eq!(Viewport::new(f32::NAN, 100.0), Viewport::DEFAULT);
        assert_eq!(Viewport::new(640.0, 0.0), Viewport { width: 640.0, height: 1.0 });
    }

    #[test]
    fn test_capture_renders_text() {
        let capture = PreviewCapture::new("# Title", Theme::Colorful, Viewport::DEFAULT);
        assert_eq!(capture.document, Document::render("# Title"));
        assert_eq!(capture.theme, Theme::Colorful);
        assert!(capture.base_dir.is_none());
    }
}
