//! In-process store used by tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use super::store::{DatasetStore, StoreError};
use crate::domain::Table;

#[derive(Default)]
pub struct MemoryStore {
    worksheets: Mutex<HashMap<String, Table>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_table(worksheet: &str, table: Table) -> Self {
        let store = Self::default();
        store.put(worksheet, table);
        store
    }

    pub fn put(&self, worksheet: &str, table: Table) {
        self.worksheets
            .lock()
            .unwrap()
            .insert(worksheet.to_string(), table);
    }

    pub fn table(&self, worksheet: &str) -> Option<Table> {
        self.worksheets.lock().unwrap().get(worksheet).cloned()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

impl DatasetStore for MemoryStore {
    async fn read(&self, worksheet: &str, columns: &[&str]) -> Result<Table, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .table(worksheet)
            .unwrap_or_default()
            .truncate_columns(columns.len()))
    }

    async fn update(&self, worksheet: &str, table: Table) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Api("503: backend unavailable".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.put(worksheet, table);
        Ok(())
    }
}
