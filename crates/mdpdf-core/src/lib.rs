//! # mdpdf core
//!
//! Markdown preview rendering and PDF export for the mdpdf desktop app.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mdpdf_core::prelude::*;
//! use std::sync::Arc;
//!
//! // What the preview pane shows
//! let preview = RenderedPreview::new("# Hello", Theme::Simple);
//! assert_eq!(preview.html, "<h1 id=\"hello\">Hello</h1>\n");
//!
//! // Export it to the download folder, one job at a time
//! let trigger = ExportTrigger::new(Arc::new(FileExporter::default()), ExportOptions::default());
//! let capture = PreviewCapture::new("# Hello", Theme::Simple, Viewport::DEFAULT);
//! if let Some(job) = trigger.fire(capture) {
//!     let path = job.await?;
//! }
//! ```
//!
//! ## Units
//!
//! - **Layout**: CSS pixels, at the width the preview was captured at
//! - **Pages**: PDF points (1/72 in); the capture width is scaled to the
//!   printable page width

pub mod capture;
pub mod document;
pub mod export;
pub mod markdown;
pub mod theme;
pub mod trigger;

mod error;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // Preview
    pub use crate::markdown::{RenderedPreview, render_html};
    pub use crate::theme::Theme;

    // Capture and export
    pub use crate::capture::{PreviewCapture, Viewport};
    pub use crate::export::download::DownloadDir;
    pub use crate::export::options::ExportOptions;
    pub use crate::export::{Exporter, FileExporter, RenderedPdf, render_pdf};
    pub use crate::trigger::{ExportJob, ExportTrigger};

    // Error handling
    pub use crate::{Error, Result};
}
