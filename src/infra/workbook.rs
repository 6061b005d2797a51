//! Local JSON workbook: named worksheets stored as grids in one file.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::store::{DatasetStore, StoreError};
use crate::domain::Table;

const WORKBOOK_DIR: &str = "house-price-predictor";
const WORKBOOK_FILENAME: &str = "house_data.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkbookDocument {
    #[serde(default)]
    worksheets: BTreeMap<String, Vec<Vec<Value>>>,
}

#[derive(Clone, Debug)]
pub struct WorkbookFile {
    path: PathBuf,
}

impl WorkbookFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<local data dir>/house-price-predictor/house_data.json`.
    pub fn default_location() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(WORKBOOK_DIR);
        Self::new(base.join(WORKBOOK_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<WorkbookDocument, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(WorkbookDocument::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!(
                    "event=workbook_read status=missing path={}",
                    self.path.display()
                );
                Ok(WorkbookDocument::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, document: &WorkbookDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(document)?;
        // Staged beside the target; the rename replaces the workbook in one step.
        let staging = self.staging_path();
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| WORKBOOK_FILENAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DatasetStore for WorkbookFile {
    async fn read(&self, worksheet: &str, columns: &[&str]) -> Result<Table, StoreError> {
        let mut document = self.load()?;
        let grid = document.worksheets.remove(worksheet).unwrap_or_default();
        Ok(Table::from_grid(grid).truncate_columns(columns.len()))
    }

    async fn update(&self, worksheet: &str, table: Table) -> Result<(), StoreError> {
        let mut document = self.load()?;
        let grid = table.into_grid();
        let rows = grid.len();
        document.worksheets.insert(worksheet.to_string(), grid);
        self.save(&document)?;
        log::debug!(
            "event=workbook_update worksheet={worksheet:?} rows={rows} path={}",
            self.path.display()
        );
        Ok(())
    }
}
