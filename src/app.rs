use std::sync::Arc;

use dioxus::prelude::*;

use crate::{
    domain::LinearRegression,
    infra::store::DatasetBackend,
    ui::{
        components::toast::{Toast, ToastMessage},
        pages::{HouseDataPage, InputPage},
        shell::Shell,
    },
    util::{assets, version::APP_NAME},
    workflow::EstimationWorkflow,
};

pub type AppWorkflow = EstimationWorkflow<LinearRegression, DatasetBackend>;

/// Built once in `main` and handed to the UI as root context.
#[derive(Clone)]
pub struct Services {
    pub workflow: Arc<AppWorkflow>,
}

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    #[route("/input")]
    InputForm {},
    #[route("/house-data")]
    HouseData {},
}

#[component]
pub fn App() -> Element {
    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_context_provider(|| toasts);

    rsx! {
        document::Title { "{APP_NAME}" }
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

#[component]
pub fn InputForm() -> Element {
    rsx! { Shell { InputPage {} } }
}

#[component]
pub fn HouseData() -> Element {
    rsx! { Shell { HouseDataPage {} } }
}
