use dioxus::prelude::*;

use crate::domain::HouseRecord;
use crate::ui::theme;
use crate::util::format::{format_area, format_price};

#[component]
pub fn HouseTable(records: Vec<HouseRecord>) -> Element {
    let is_empty = records.is_empty();
    let rows = records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| (idx + 1, record))
        .collect::<Vec<_>>();

    rsx! {
        div {
            class: "{theme::TABLE_CONTAINER}",
            table {
                class: "{theme::TABLE}",
                thead {
                    tr {
                        th { class: "numeric", "#" }
                        th { class: "numeric", "Bedrooms (kt)" }
                        th { class: "numeric", "Bathrooms (km)" }
                        th { class: "numeric", "Garages (grs)" }
                        th { class: "numeric", "Land Area (lt)" }
                        th { class: "numeric", "Building Area (lb)" }
                        th { class: "numeric", "Estimated Price" }
                    }
                }
                tbody {
                    for (position, record) in rows {
                        tr {
                            key: "{position}",
                            td { class: "numeric", "{position}" }
                            td { class: "numeric", "{record.bedrooms}" }
                            td { class: "numeric", "{record.bathrooms}" }
                            td { class: "numeric", "{record.garages}" }
                            td { class: "numeric", "{format_area(record.land_area)}" }
                            td { class: "numeric", "{format_area(record.building_area)}" }
                            td { class: "numeric", "{format_price(record.estimated_price)}" }
                        }
                    }
                    if is_empty {
                        tr {
                            td {
                                class: "empty-row",
                                colspan: "7",
                                "No complete rows in the worksheet yet."
                            }
                        }
                    }
                }
            }
        }
    }
}
