//! Live preview pane

use crate::state::AppState;
use dioxus::prelude::*;

/// DOM id of the preview element, measured on export
pub const PREVIEW_ID: &str = "preview";

/// Rendered HTML of the current document, styled by the active theme
#[component]
pub fn Preview() -> Element {
    let state = use_context::<Signal<AppState>>();
    let rendered = state.read().preview();
    let class = format!("preview-container {}", rendered.class);
    let html = rendered.html;

    rsx! {
        div {
            id: PREVIEW_ID,
            class: "{class}",
            dangerous_inner_html: "{html}",
        }
    }
}
