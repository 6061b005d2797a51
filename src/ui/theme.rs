//! Class names shared across pages. The rules live in `assets/main.css`.

use crate::ui::components::toast::ToastKind;

pub const PANEL: &str = "panel";
pub const PANEL_TITLE: &str = "panel-title";
pub const FIELD_LABEL: &str = "field-label";
pub const FIELD_INPUT: &str = "field-input";
pub const BTN_PRIMARY: &str = "btn-primary";
pub const BTN_SECONDARY: &str = "btn-secondary";
pub const TABLE_CONTAINER: &str = "table-container";
pub const TABLE: &str = "data-table";
pub const MUTED: &str = "muted";

pub fn nav_button(active: bool) -> &'static str {
    if active {
        "nav-button active"
    } else {
        "nav-button"
    }
}

pub fn notice(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "notice success",
        ToastKind::Warning => "notice warning",
        ToastKind::Error => "notice error",
    }
}

pub fn toast(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Success => "toast toast-success",
        ToastKind::Warning => "toast toast-warning",
        ToastKind::Error => "toast toast-error",
    }
}
