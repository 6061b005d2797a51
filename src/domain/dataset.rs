//! Conversion between worksheet tables and typed house records.
//!
//! Stores hand back loosely typed cells. Everything is converted here so the
//! rest of the app only ever sees complete `HouseRecord`s.

use std::collections::HashMap;

use serde_json::Value;

use super::house::{HouseRecord, COLUMNS};

/// A worksheet as stored: one header row plus data rows of JSON cells.
/// Rows may be shorter than the header; absent trailing cells count as missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Builds a table from a grid whose first row is the header.
    pub fn from_grid(mut grid: Vec<Vec<Value>>) -> Self {
        if grid.is_empty() {
            return Self::default();
        }
        let header = grid
            .remove(0)
            .into_iter()
            .map(|cell| match cell {
                Value::String(name) => name.trim().to_string(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect();
        Self { header, rows: grid }
    }

    pub fn into_grid(self) -> Vec<Vec<Value>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.header.into_iter().map(Value::String).collect());
        grid.extend(self.rows);
        grid
    }

    /// Keeps only the first `count` columns, like reading a fixed column range.
    pub fn truncate_columns(mut self, count: usize) -> Self {
        self.header.truncate(count);
        for row in &mut self.rows {
            row.truncate(count);
        }
        self
    }
}

/// What a fresh read of the worksheet found.
#[derive(Clone, Debug, PartialEq)]
pub enum DatasetSnapshot {
    /// The worksheet does not carry the expected columns yet.
    Uninitialized,
    Records(Vec<HouseRecord>),
}

impl DatasetSnapshot {
    pub fn from_table(table: &Table) -> Self {
        let index: HashMap<&str, usize> = table
            .header
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect();

        let mut positions = [0usize; COLUMNS.len()];
        for (slot, column) in positions.iter_mut().zip(COLUMNS) {
            match index.get(column) {
                Some(idx) => *slot = *idx,
                None => return DatasetSnapshot::Uninitialized,
            }
        }

        let total = table.rows.len();
        let records: Vec<HouseRecord> = table
            .rows
            .iter()
            .filter_map(|row| record_from_row(row, &positions))
            .collect();
        if records.len() < total {
            log::debug!(
                "event=dataset_read dropped_rows={} kept_rows={}",
                total - records.len(),
                records.len()
            );
        }
        DatasetSnapshot::Records(records)
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self, DatasetSnapshot::Records(_))
    }

    pub fn into_records(self) -> Vec<HouseRecord> {
        match self {
            DatasetSnapshot::Uninitialized => Vec::new(),
            DatasetSnapshot::Records(records) => records,
        }
    }
}

/// Appends `new` after every existing row. Existing rows are left untouched.
pub fn merge_records(existing: Vec<HouseRecord>, new: HouseRecord) -> Vec<HouseRecord> {
    let mut merged = existing;
    merged.push(new);
    merged
}

/// Renders records in canonical column order for a full overwrite.
pub fn records_to_table(records: &[HouseRecord]) -> Table {
    Table {
        header: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: records.iter().map(record_to_row).collect(),
    }
}

fn record_to_row(record: &HouseRecord) -> Vec<Value> {
    vec![
        Value::from(record.bedrooms),
        Value::from(record.bathrooms),
        Value::from(record.garages),
        Value::from(record.land_area),
        Value::from(record.building_area),
        Value::from(record.estimated_price),
    ]
}

fn record_from_row(row: &[Value], positions: &[usize; COLUMNS.len()]) -> Option<HouseRecord> {
    let cell = |slot: usize| row.get(positions[slot]);
    Some(HouseRecord {
        bedrooms: count_cell(cell(0)?)?,
        bathrooms: count_cell(cell(1)?)?,
        garages: count_cell(cell(2)?)?,
        land_area: area_cell(cell(3)?)?,
        building_area: area_cell(cell(4)?)?,
        estimated_price: number_cell(cell(5)?)?,
    })
}

fn number_cell(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.replace(',', "").parse::<f64>().ok()
            }
        }
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn area_cell(value: &Value) -> Option<f64> {
    number_cell(value).filter(|v| *v >= 0.0)
}

fn count_cell(value: &Value) -> Option<u32> {
    let number = number_cell(value)?;
    if number < 0.0 || number.fract() != 0.0 || number > f64::from(u32::MAX) {
        return None;
    }
    Some(number as u32)
}
