pub mod house_table;
pub mod kpi_card;
pub mod notice;
pub mod toast;
