//! Preview to PDF export
//!
//! [`render_pdf`] runs the whole pipeline on a [`PreviewCapture`]: images are
//! captured, the document is laid out at the capture width, sliced into pages
//! and serialized. An [`Exporter`] decides what happens to the bytes; the
//! [`FileExporter`] saves them as a download.

pub mod download;
pub mod fonts;
pub mod images;
pub mod layout;
pub mod options;
pub mod paginate;
pub mod pdf;

use crate::Result;
use crate::capture::PreviewCapture;
use download::DownloadDir;
use images::ImageSet;
use layout::layout_document;
use options::ExportOptions;
use paginate::paginate;
use pdf::{PageGeometry, write_pdf};
use std::path::PathBuf;
use tracing::{debug, info};

/// Something that turns a captured preview into a saved document
pub trait Exporter: Send + Sync {
    /// Produce the document and return where it was saved
    fn export(&self, capture: &PreviewCapture, options: &ExportOptions) -> Result<PathBuf>;
}

/// A finished PDF held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Render a captured preview to PDF bytes
pub fn render_pdf(capture: &PreviewCapture, options: &ExportOptions) -> Result<RenderedPdf> {
    let geometry = PageGeometry::new(options, capture.viewport.width)?;
    let page_height = geometry.content_height_px();
    debug!(
        viewport = ?capture.viewport,
        scale = geometry.scale,
        page_height,
        "rendering preview"
    );

    let images = ImageSet::load(
        capture.document.images(),
        capture.base_dir.as_deref(),
        &options.capture,
    );
    let palette = capture.theme.palette();
    let layout = layout_document(
        &capture.document,
        &palette,
        &images,
        capture.viewport.width,
        page_height,
    );
    let pages = paginate(&layout, page_height, options.page_break);
    let bytes = write_pdf(&pages, &images, &geometry, options)?;

    debug!(
        blocks = layout.fragments.len(),
        pages = pages.len(),
        images = images.loaded_count(),
        bytes = bytes.len(),
        "rendered pdf"
    );
    Ok(RenderedPdf {
        bytes,
        page_count: pages.len(),
    })
}

/// Renders the capture and saves it into a download directory
#[derive(Debug, Clone, Default)]
pub struct FileExporter {
    target: DownloadDir,
}

impl FileExporter {
    pub fn new(target: DownloadDir) -> Self {
        Self { target }
    }
}

impl Exporter for FileExporter {
    fn export(&self, capture: &PreviewCapture, options: &ExportOptions) -> Result<PathBuf> {
        let rendered = render_pdf(capture, options)?;
        let path = self.target.save(&options.filename, &rendered.bytes)?;
        info!(
            "Exported {} page(s) to {}",
            rendered.page_count,
            path.display()
        );
        Ok(path)
    }
}
