use dioxus::prelude::*;
use time::OffsetDateTime;

use crate::{
    app::Services,
    domain::{DatasetSnapshot, HouseRecord},
    ui::{
        components::{house_table::HouseTable, kpi_card::KpiCard, notice::Notice, toast::ToastKind},
        theme,
    },
    util::format::{format_price, timestamp_label},
};

const NO_DATA_MESSAGE: &str = "There hasn't been any data available yet.";

#[derive(Clone, PartialEq)]
struct Loaded {
    snapshot: DatasetSnapshot,
    fetched_at: String,
}

#[component]
pub fn HouseDataPage() -> Element {
    let services = use_context::<Services>();

    // Re-read on every visit and on refresh; nothing is cached between views.
    let mut dataset = use_resource(move || {
        let workflow = services.workflow.clone();
        async move {
            match workflow.fetch_snapshot().await {
                Ok(snapshot) => Ok(Loaded {
                    snapshot,
                    fetched_at: timestamp_label(OffsetDateTime::now_utc()),
                }),
                Err(err) => {
                    log::error!(
                        "event=dataset_view status=error worksheet={:?} error={err}",
                        workflow.worksheet()
                    );
                    Err(err.to_string())
                }
            }
        }
    });

    let body = match dataset.cloned() {
        None => rsx! { p { class: "{theme::MUTED}", "Loading house data..." } },
        Some(Err(message)) => rsx! {
            Notice { kind: ToastKind::Error, text: format!("Failed to load house data: {message}") }
        },
        Some(Ok(Loaded { snapshot: DatasetSnapshot::Uninitialized, .. })) => rsx! {
            Notice { kind: ToastKind::Warning, text: NO_DATA_MESSAGE.to_string() }
        },
        Some(Ok(Loaded { snapshot: DatasetSnapshot::Records(records), fetched_at })) => {
            let summary = summarize(&records);
            rsx! {
                div { class: "kpi-row",
                    KpiCard {
                        title: "Records".to_string(),
                        value: summary.count.to_string(),
                        description: Some(format!("Fetched {fetched_at}")),
                    }
                    KpiCard {
                        title: "Average Estimate".to_string(),
                        value: summary.average.map(format_price).unwrap_or_else(|| "-".to_string()),
                        description: None,
                    }
                    KpiCard {
                        title: "Latest Estimate".to_string(),
                        value: summary.latest.map(format_price).unwrap_or_else(|| "-".to_string()),
                        description: None,
                    }
                }
                HouseTable { records }
            }
        }
    };

    rsx! {
        section {
            class: "{theme::PANEL}",
            h2 { class: "{theme::PANEL_TITLE}", "House Data" }
            {body}
            div { class: "actions",
                button {
                    class: "{theme::BTN_SECONDARY}",
                    onclick: move |_| dataset.restart(),
                    "Refresh"
                }
            }
        }
    }
}

struct Summary {
    count: usize,
    average: Option<f64>,
    latest: Option<f64>,
}

fn summarize(records: &[HouseRecord]) -> Summary {
    let count = records.len();
    let average = (count > 0).then(|| {
        records.iter().map(|r| r.estimated_price).sum::<f64>() / count as f64
    });
    Summary {
        count,
        average,
        latest: records.last().map(|r| r.estimated_price),
    }
}
