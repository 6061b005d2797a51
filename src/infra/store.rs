//! Dataset store seam: a named-worksheet table that is read whole and
//! overwritten whole.

use std::io;

use thiserror::Error;

use super::{sheets::SheetsClient, workbook::WorkbookFile};
use crate::domain::Table;
use crate::util::config::StoreConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
    #[error("workbook io error: {0}")]
    Io(#[from] io::Error),
    #[error("workbook decode error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store not configured: {0}")]
    NotConfigured(&'static str),
}

/// Tabular storage addressed by worksheet name.
///
/// `read` returns the leading `columns.len()` columns of the worksheet, fresh
/// on every call. `update` replaces the whole worksheet with `table`.
#[allow(async_fn_in_trait)]
pub trait DatasetStore {
    async fn read(&self, worksheet: &str, columns: &[&str]) -> Result<Table, StoreError>;
    async fn update(&self, worksheet: &str, table: Table) -> Result<(), StoreError>;
}

/// The store selected by configuration at startup.
pub enum DatasetBackend {
    Sheets(SheetsClient),
    Workbook(WorkbookFile),
}

impl DatasetBackend {
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        match config {
            StoreConfig::Workbook { path } => {
                let file = match path {
                    Some(path) => WorkbookFile::new(path.clone()),
                    None => WorkbookFile::default_location(),
                };
                Ok(DatasetBackend::Workbook(file))
            }
            StoreConfig::Sheets {
                spreadsheet_id,
                access_token,
                api_key,
                base_url,
            } => {
                let client = match base_url.as_deref() {
                    Some(base) => SheetsClient::with_base_url(base, spreadsheet_id)?,
                    None => SheetsClient::new(spreadsheet_id)?,
                };
                let client = match (access_token, api_key) {
                    (Some(token), _) => client.with_access_token(token),
                    (None, Some(key)) => client.with_api_key(key),
                    (None, None) => client,
                };
                Ok(DatasetBackend::Sheets(client))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DatasetBackend::Sheets(client) => format!("sheets:{}", client.spreadsheet_id()),
            DatasetBackend::Workbook(file) => format!("workbook:{}", file.path().display()),
        }
    }
}

impl DatasetStore for DatasetBackend {
    async fn read(&self, worksheet: &str, columns: &[&str]) -> Result<Table, StoreError> {
        match self {
            DatasetBackend::Sheets(client) => client.read(worksheet, columns).await,
            DatasetBackend::Workbook(file) => file.read(worksheet, columns).await,
        }
    }

    async fn update(&self, worksheet: &str, table: Table) -> Result<(), StoreError> {
        match self {
            DatasetBackend::Sheets(client) => client.update(worksheet, table).await,
            DatasetBackend::Workbook(file) => file.update(worksheet, table).await,
        }
    }
}
