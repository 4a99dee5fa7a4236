//! mdpdf - Markdown editor with live preview and PDF export

mod editor;
mod export;
mod js_interop;
mod preview;
mod state;
mod toolbar;

use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use dioxus::prelude::*;
use state::AppState;

fn main() {
    tracing_subscriber::fmt::init();

    let window = WindowBuilder::new()
        .with_title("MD to PDF Converter")
        .with_inner_size(LogicalSize::new(1280.0, 800.0));

    let config = Config::new().with_window(window);

    dioxus::LaunchBuilder::desktop()
        .with_cfg(config)
        .launch(App);
}

#[component]
fn App() -> Element {
    use_context_provider(|| Signal::new(AppState::new()));

    rsx! {
        style { {include_str!("../assets/style.css")} }

        div { class: "app-container",
            toolbar::NavBar {}

            div { class: "main-content",
                // Left: Markdown source
                div { class: "panel editor-panel",
                    div { class: "panel-header",
                        h2 { class: "panel-title", "Markdown Input" }
                        export::ExportButton {}
                    }
                    editor::Editor {}
                    export::ExportStatusLine {}
                }

                // Right: rendered preview
                div { class: "panel preview-panel",
                    div { class: "panel-header",
                        h2 { class: "panel-title", "Preview" }
                    }
                    preview::Preview {}
                }
            }
        }
    }
}
