use dioxus::prelude::*;

use crate::app::Route;
use crate::ui::theme;
use crate::util::version::{version_label, APP_NAME};

#[component]
pub fn Shell(children: Element) -> Element {
    let current_route = use_route::<Route>();
    let nav = use_navigator();

    rsx! {
        div { class: "app-shell",
            header { class: "app-header",
                h1 { class: "app-title", "{APP_NAME}" }
                nav { class: "app-nav",
                    NavButton {
                        active: matches!(current_route, Route::InputForm {}),
                        onclick: move |_| { nav.push(Route::InputForm {}); },
                        label: "Input",
                    }
                    NavButton {
                        active: matches!(current_route, Route::HouseData {}),
                        onclick: move |_| { nav.push(Route::HouseData {}); },
                        label: "House Data",
                    }
                }
            }
            main { class: "app-main",
                {children}
            }
            footer { class: "app-footer", "{version_label()}" }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    rsx! {
        button {
            class: "{theme::nav_button(active)}",
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
