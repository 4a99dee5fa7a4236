//! Application state management
//!
//! `AppState` holds the editor text, the preview theme, and the export
//! status the UI renders from. It lives in a Dioxus signal provided by the
//! root component.

mod export;

pub use export::{BUSY_LABEL, ExportStatus, IDLE_LABEL};

use mdpdf_core::capture::{PreviewCapture, Viewport};
use mdpdf_core::export::FileExporter;
use mdpdf_core::export::options::ExportOptions;
use mdpdf_core::markdown::RenderedPreview;
use mdpdf_core::theme::Theme;
use mdpdf_core::trigger::ExportTrigger;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Global application state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Raw Markdown from the editor, stored verbatim
    pub document: String,
    /// Presentation applied to the preview
    pub theme: Theme,
    /// Whether an export is pending (drives the button)
    pub is_exporting: bool,
    /// Outcome of the last export
    pub export_status: Option<ExportStatus>,
    /// Starts exports with the fixed configuration
    pub trigger: ExportTrigger,
}

impl AppState {
    /// Empty editor, simple theme, exports saved to the download folder
    pub fn new() -> Self {
        Self::with_trigger(ExportTrigger::new(
            Arc::new(FileExporter::default()),
            ExportOptions::default(),
        ))
    }

    pub fn with_trigger(trigger: ExportTrigger) -> Self {
        Self {
            document: String::new(),
            theme: Theme::default(),
            is_exporting: false,
            export_status: None,
            trigger,
        }
    }

    /// Replace the document with the editor's current value
    pub fn set_document(&mut self, text: String) {
        self.document = text;
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
    }

    /// What the preview pane shows right now
    pub fn preview(&self) -> RenderedPreview {
        RenderedPreview::new(&self.document, self.theme)
    }

    /// Label of the export button
    pub fn export_label(&self) -> &'static str {
        if self.is_exporting { BUSY_LABEL } else { IDLE_LABEL }
    }

    /// Mark an export as started and capture the preview
    ///
    /// Returns `None` while another export is pending. The capture carries
    /// the default viewport until the preview has been measured.
    pub fn begin_export(&mut self) -> Option<PreviewCapture> {
        if self.is_exporting {
            return None;
        }
        self.is_exporting = true;
        self.export_status = None;
        Some(PreviewCapture::new(
            &self.document,
            self.theme,
            Viewport::DEFAULT,
        ))
    }

    /// Return to idle after an export settled
    pub fn finish_export(&mut self, result: mdpdf_core::Result<PathBuf>) {
        self.is_exporting = false;
        self.export_status = Some(match result {
            Ok(path) => {
                info!("Export successful: {}", path.display());
                ExportStatus::Saved(path)
            }
            Err(e) => {
                error!("Export failed: {}", e);
                ExportStatus::Failed(e.to_string())
            }
        });
    }

    /// Return to idle when an export never started
    pub fn abandon_export(&mut self) {
        self.is_exporting = false;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
