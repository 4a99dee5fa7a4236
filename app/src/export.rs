//! Export button and status line
//!
//! The button captures the preview and hands it to the export trigger. It
//! stays disabled with a busy label until the job settles.

use crate::js_interop::measure_scroll_size;
use crate::preview::PREVIEW_ID;
use crate::state::AppState;
use crate::toolbar::ToolbarButton;
use dioxus::prelude::*;
use mdpdf_core::capture::Viewport;
use tracing::{info, warn};

#[component]
pub fn ExportButton() -> Element {
    let state = use_context::<Signal<AppState>>();
    let (label, busy) = {
        let current = state.read();
        (current.export_label(), current.is_exporting)
    };

    rsx! {
        ToolbarButton {
            title: "Save the preview as a PDF",
            icon: "\u{2B07}",
            label,
            disabled: busy,
            class: "export-button",
            onclick: move |_| start_export(state),
        }
    }
}

/// Outcome of the last export, if any
#[component]
pub fn ExportStatusLine() -> Element {
    let state = use_context::<Signal<AppState>>();
    let Some(status) = state.read().export_status.clone() else {
        return rsx! {};
    };
    let class = if status.is_error() {
        "export-status error"
    } else {
        "export-status"
    };

    let message = status.message();

    rsx! {
        div { class: "{class}", "{message}" }
    }
}

fn start_export(mut state: Signal<AppState>) {
    // Clicks while a job is pending do nothing
    let Some(capture) = state.write().begin_export() else {
        return;
    };

    spawn(async move {
        let viewport = match measure_scroll_size(PREVIEW_ID).await {
            Ok(viewport) => viewport,
            Err(e) => {
                warn!("Could not measure preview, using default size: {:#}", e);
                Viewport::DEFAULT
            }
        };
        info!(
            "Exporting preview at {}x{} px",
            viewport.width, viewport.height
        );

        let job = state.read().trigger.fire(capture.with_viewport(viewport));
        let Some(job) = job else {
            state.write().abandon_export();
            return;
        };

        let result = job.await;
        state.write().finish_export(result);
    });
}
