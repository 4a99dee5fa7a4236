//! Markdown source editor

use crate::state::AppState;
use dioxus::prelude::*;

/// Hint shown while the editor is empty
const PLACEHOLDER: &str = "Enter your markdown here...";

/// Plain textarea bound to the document; every edit re-renders the preview
#[component]
pub fn Editor() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let document = state.read().document.clone();

    rsx! {
        textarea {
            id: "editor",
            class: "markdown-input",
            placeholder: PLACEHOLDER,
            spellcheck: "false",
            value: "{document}",
            oninput: move |evt| state.write().set_document(evt.value()),
        }
    }
}
