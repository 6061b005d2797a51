use dioxus::prelude::*;

use super::toast::ToastKind;
use crate::ui::theme;

/// Inline status line under a form, as opposed to a floating toast.
#[component]
pub fn Notice(kind: ToastKind, text: String) -> Element {
    rsx! {
        div { class: "{theme::notice(kind)}", role: "status", "{text}" }
    }
}
