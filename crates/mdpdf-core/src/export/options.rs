//! Export configuration
//!
//! The application always exports with `ExportOptions::default()`; the
//! builder methods exist for tests and embedding.

use crate::{Error, Result};

/// File name every export is saved under
pub const EXPORT_FILENAME: &str = "markdown-converted.pdf";

/// PDF user space units per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Page margins in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    /// The same margin on all four sides, given in inches
    pub fn uniform_inches(inches: f32) -> Self {
        let pt = inches * POINTS_PER_INCH;
        Self {
            top: pt,
            right: pt,
            bottom: pt,
            left: pt,
        }
    }
}

/// Paper size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFormat {
    /// US Letter, 8.5 x 11 in
    #[default]
    Letter,
    /// ISO A4, 210 x 297 mm
    A4,
}

impl PageFormat {
    /// Portrait width and height in points
    pub fn size(self) -> (f32, f32) {
        match self {
            Self::Letter => (612.0, 792.0),
            Self::A4 => (595.28, 841.89),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Paper size and orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSetup {
    pub format: PageFormat,
    pub orientation: Orientation,
}

impl PageSetup {
    /// Page width and height in points, after orientation
    pub fn size(self) -> (f32, f32) {
        let (w, h) = self.format.size();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// How captured images are stored in the PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageEncoding {
    /// Lossy, stored with the DCT filter
    #[default]
    Jpeg,
    /// Lossless raw samples, Flate-compressed when compression is on
    Png,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageOptions {
    pub encoding: ImageEncoding,
    /// JPEG quality in 0.0..=1.0
    pub quality: f32,
}

impl ImageOptions {
    /// Quality on the 1..=100 scale JPEG encoders take
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality.clamp(0.01, 1.0) * 100.0).round() as u8
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            encoding: ImageEncoding::Jpeg,
            quality: 0.98,
        }
    }
}

/// How the preview is captured
///
/// The capture viewport is always the preview element's scroll size, taken
/// from [`crate::PreviewCapture::viewport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Raster resolution multiplier for images (device pixels per CSS pixel)
    pub scale: f32,
    /// Allow images from other origins (remote URLs) to be fetched
    pub use_cors: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            use_cors: true,
        }
    }
}

/// Page break strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageBreakMode {
    /// Move a block that does not fit to the next page when it would fit there
    #[default]
    AvoidAll,
    /// Fill every page and split blocks between lines
    Auto,
}

/// Configuration record passed to the exporter
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Name of the downloaded file
    pub filename: String,
    pub margins: Margins,
    pub page: PageSetup,
    pub image: ImageOptions,
    pub capture: CaptureOptions,
    /// Flate-compress content streams
    pub compress: bool,
    pub page_break: PageBreakMode,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: EXPORT_FILENAME.to_string(),
            margins: Margins::uniform_inches(1.0),
            page: PageSetup::default(),
            image: ImageOptions::default(),
            capture: CaptureOptions::default(),
            compress: true,
            page_break: PageBreakMode::AvoidAll,
        }
    }
}

impl ExportOptions {
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn with_page(mut self, page: PageSetup) -> Self {
        self.page = page;
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_page_break(mut self, page_break: PageBreakMode) -> Self {
        self.page_break = page_break;
        self
    }

    pub fn with_image(mut self, image: ImageOptions) -> Self {
        self.image = image;
        self
    }

    pub fn with_capture(mut self, capture: CaptureOptions) -> Self {
        self.capture = capture;
        self
    }

    /// Width and height left for content, in points
    pub fn printable_area(&self) -> Result<(f32, f32)> {
        let (page_w, page_h) = self.page.size();
        let width = page_w - self.margins.left - self.margins.right;
        let height = page_h - self.margins.top - self.margins.bottom;
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::Layout(format!(
                "margins leave no printable area on a {page_w}x{page_h}pt page"
            )));
        }
        Ok((width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fixed_defaults() {
        let opts = ExportOptions::default();
        assert_eq!(opts.filename, "markdown-converted.pdf");
        assert_eq!(opts.margins, Margins::uniform_inches(1.0));
        assert_eq!(opts.page.format, PageFormat::Letter);
        assert_eq!(opts.page.orientation, Orientation::Portrait);
        assert_eq!(opts.image.encoding, ImageEncoding::Jpeg);
        assert_relative_eq!(opts.image.quality, 0.98);
        assert_relative_eq!(opts.capture.scale, 2.0);
        assert!(opts.capture.use_cors);
        assert!(opts.compress);
        assert_eq!(opts.page_break, PageBreakMode::AvoidAll);
    }

    #[test]
    fn test_printable_area_letter() {
        let (w, h) = ExportOptions::default()
            .printable_area()
            .expect("letter with 1in margins has room");
        assert_relative_eq!(w, 468.0);
        assert_relative_eq!(h, 648.0);
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let page = PageSetup {
            format: PageFormat::Letter,
            orientation: Orientation::Landscape,
        };
        assert_eq!(page.size(), (792.0, 612.0));
    }

    #[test]
    fn test_oversized_margins_rejected() {
        let opts = ExportOptions::default().with_margins(Margins::uniform_inches(5.0));
        assert!(matches!(opts.printable_area(), Err(Error::Layout(_))));
    }

    #[test]
    fn test_jpeg_quality_scale() {
        assert_eq!(ImageOptions::default().jpeg_quality(), 98);
        let low = ImageOptions {
            quality: 0.0,
            ..ImageOptions::default()
        };
        assert_eq!(low.jpeg_quality(), 1);
    }
}
