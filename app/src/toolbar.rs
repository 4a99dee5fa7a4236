//! Top navigation bar with the theme toggle

use crate::state::AppState;
use dioxus::prelude::*;

/// Brand on the left, theme toggle on the right
#[component]
pub fn NavBar() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let theme = state.read().theme;

    rsx! {
        nav { class: "navbar",
            div { class: "brand",
                span { class: "brand-icon", "\u{1F4C4}" }
                span { class: "brand-title", "MD to PDF Converter" }
            }

            ToolbarButton {
                title: "Switch preview theme",
                icon: theme.toggle_icon(),
                label: theme.toggle_label(),
                onclick: move |_| state.write().toggle_theme(),
            }
        }
    }
}

/// Reusable toolbar button
#[component]
pub fn ToolbarButton(
    title: &'static str,
    label: &'static str,
    onclick: EventHandler<MouseEvent>,
    #[props(default = "")] icon: &'static str,
    #[props(default = false)] disabled: bool,
    #[props(default = "")] class: &'static str,
) -> Element {
    let button_class = if class.is_empty() {
        "toolbar-button".to_string()
    } else {
        format!("toolbar-button {}", class)
    };

    rsx! {
        button {
            class: "{button_class}",
            title: "{title}",
            disabled,
            onclick: move |evt| onclick.call(evt),
            if !icon.is_empty() {
                span { class: "button-icon", "{icon}" }
            }
            "{label}"
        }
    }
}
