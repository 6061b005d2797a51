use dioxus::prelude::*;

use crate::{
    app::Services,
    domain::HouseFeatures,
    ui::{
        components::{
            notice::Notice,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
    util::format::estimate_message,
    workflow::WorkflowError,
};

#[derive(Clone, PartialEq)]
struct Outcome {
    kind: ToastKind,
    text: String,
}

#[component]
pub fn InputPage() -> Element {
    let services = use_context::<Services>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    let mut bedrooms = use_signal(|| "0".to_string());
    let mut bathrooms = use_signal(|| "0".to_string());
    let mut garages = use_signal(|| "0".to_string());
    let mut land_area = use_signal(|| "0.00".to_string());
    let mut building_area = use_signal(|| "0.00".to_string());

    let mut outcome = use_signal(|| None::<Outcome>);
    let mut busy = use_signal(|| false);

    let on_predict = move |_| {
        if busy() {
            return;
        }
        let input = HouseFeatures::new(
            parse_count(&bedrooms()),
            parse_count(&bathrooms()),
            parse_count(&garages()),
            parse_area(&land_area()),
            parse_area(&building_area()),
        );
        let workflow = services.workflow.clone();
        busy.set(true);
        outcome.set(None);

        spawn(async move {
            let result = match workflow.submit(&input).await {
                Ok(record) => Outcome {
                    kind: ToastKind::Success,
                    text: estimate_message(record.estimated_price),
                },
                Err(WorkflowError::Invalid(err)) => Outcome {
                    kind: ToastKind::Warning,
                    text: err.to_string(),
                },
                Err(err @ WorkflowError::NonFinitePrediction(_)) => {
                    let text = err.to_string();
                    push_toast(toasts, ToastKind::Error, text.clone());
                    Outcome {
                        kind: ToastKind::Error,
                        text,
                    }
                }
                Err(err) => {
                    let text = format!("Failed to save the estimate: {err}");
                    push_toast(toasts, ToastKind::Error, text.clone());
                    Outcome {
                        kind: ToastKind::Error,
                        text,
                    }
                }
            };
            outcome.set(Some(result));
            busy.set(false);
        });
    };

    rsx! {
        section {
            class: "{theme::PANEL}",
            h2 { class: "{theme::PANEL_TITLE}", "House Features" }
            div { class: "field-grid",
                NumberField { label: "Bedrooms", value: bedrooms(), step: "1", oninput: move |v| bedrooms.set(v) }
                NumberField { label: "Bathrooms", value: bathrooms(), step: "1", oninput: move |v| bathrooms.set(v) }
                NumberField { label: "Garages", value: garages(), step: "1", oninput: move |v| garages.set(v) }
                NumberField { label: "Land Area", value: land_area(), step: "0.01", oninput: move |v| land_area.set(v) }
                NumberField { label: "Building Area", value: building_area(), step: "0.01", oninput: move |v| building_area.set(v) }
            }
            div { class: "actions",
                button {
                    class: "{theme::BTN_PRIMARY}",
                    disabled: busy(),
                    onclick: on_predict,
                    if busy() { "Predicting..." } else { "Predict" }
                }
            }
            if let Some(current) = outcome() {
                Notice { kind: current.kind, text: current.text }
            }
        }
    }
}

#[component]
fn NumberField(
    label: &'static str,
    value: String,
    step: &'static str,
    oninput: EventHandler<String>,
) -> Element {
    rsx! {
        div {
            label { class: "{theme::FIELD_LABEL}", "{label}" }
            input {
                class: "{theme::FIELD_INPUT}",
                r#type: "number",
                min: "0",
                step: "{step}",
                value: "{value}",
                oninput: move |evt| oninput.call(evt.value()),
            }
        }
    }
}

/// Count fields behave like an integer spinner with a minimum of zero:
/// blank or unreadable text is zero, fractions are truncated.
fn parse_count(raw: &str) -> u32 {
    parse_non_negative(raw)
        .map(|value| value.trunc().min(f64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

/// Area fields accept decimals; blank, unreadable or negative text is zero.
fn parse_area(raw: &str) -> f64 {
    parse_non_negative(raw).unwrap_or(0.0)
}

fn parse_non_negative(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.max(0.0))
}
