//! Estimation & persistence: validate → predict → read → merge → overwrite.
//!
//! Persistence is read-then-overwrite without a version check. Two submissions
//! that read the same snapshot race, and the later write drops the earlier
//! row.

use thiserror::Error;
use uuid::Uuid;

use crate::{
    domain::{
        merge_records, records_to_table, validate, DatasetSnapshot, FeatureVector, HouseFeatures,
        HouseRecord, PricePredictor, ValidationError, COLUMNS,
    },
    infra::store::{DatasetStore, StoreError},
};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("the model produced an unusable estimate ({0}); nothing was saved")]
    NonFinitePrediction(f64),
    #[error("dataset store failed: {0}")]
    Store(#[from] StoreError),
}

/// Model and store are injected once at startup and shared by every request.
pub struct EstimationWorkflow<M, S> {
    model: M,
    store: S,
    worksheet: String,
}

impl<M, S> EstimationWorkflow<M, S>
where
    M: PricePredictor,
    S: DatasetStore,
{
    pub fn new(model: M, store: S, worksheet: impl Into<String>) -> Self {
        Self {
            model,
            store,
            worksheet: worksheet.into(),
        }
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.model.predict(features)
    }

    /// Validates and prices the input without touching the store.
    pub fn estimate(&self, input: &HouseFeatures) -> Result<HouseRecord, ValidationError> {
        let features = validate(input)?;
        let price = self.predict(&features);
        Ok(HouseRecord::new(&features, price))
    }

    /// Fresh read of the worksheet, keeping "no schema yet" distinct from
    /// "no rows".
    pub async fn fetch_snapshot(&self) -> Result<DatasetSnapshot, StoreError> {
        let table = self.store.read(&self.worksheet, &COLUMNS).await?;
        Ok(DatasetSnapshot::from_table(&table))
    }

    /// Complete records currently stored; empty when the worksheet has no schema.
    pub async fn load_dataset(&self) -> Result<Vec<HouseRecord>, StoreError> {
        let snapshot = self.fetch_snapshot().await?;
        if !snapshot.is_initialized() {
            log::info!(
                "event=dataset_read status=uninitialized worksheet={:?}",
                self.worksheet
            );
        }
        Ok(snapshot.into_records())
    }

    /// Overwrites the worksheet with `existing` followed by `new`.
    /// Returns the number of data rows written.
    pub async fn persist(
        &self,
        existing: Vec<HouseRecord>,
        new: HouseRecord,
    ) -> Result<usize, StoreError> {
        let merged = merge_records(existing, new);
        let rows = merged.len();
        self.store
            .update(&self.worksheet, records_to_table(&merged))
            .await?;
        Ok(rows)
    }

    /// One full form submission. Invalid input never reaches the store.
    pub async fn submit(&self, input: &HouseFeatures) -> Result<HouseRecord, WorkflowError> {
        let request_id = Uuid::new_v4();
        let record = match self.estimate(input) {
            Ok(record) => record,
            Err(err) => {
                log::info!("event=submit status=rejected request_id={request_id} reason={err:?}");
                return Err(err.into());
            }
        };
        // A non-finite price would be stored as an empty cell and the row dropped on read.
        if !record.estimated_price.is_finite() {
            log::error!(
                "event=predict status=non_finite request_id={request_id} price={}",
                record.estimated_price
            );
            return Err(WorkflowError::NonFinitePrediction(record.estimated_price));
        }
        log::info!(
            "event=predict status=ok request_id={request_id} features={:?} price={}",
            [
                record.bedrooms as f64,
                record.bathrooms as f64,
                record.garages as f64,
                record.land_area,
                record.building_area
            ],
            record.estimated_price
        );

        let result = async {
            let existing = self.load_dataset().await?;
            self.persist(existing, record.clone()).await
        }
        .await;

        match result {
            Ok(rows) => {
                log::info!("event=submit status=ok request_id={request_id} rows={rows}");
                Ok(record)
            }
            Err(err) => {
                log::error!("event=submit status=error request_id={request_id} error={err}");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::{
        domain::{LinearRegression, Table},
        infra::memory::MemoryStore,
    };

    const SHEET: &str = "House Data";

    /// Returns a fixed price and remembers every row it was asked about.
    struct FixedPrice {
        price: f64,
        seen: RefCell<Vec<[f64; 5]>>,
    }

    impl FixedPrice {
        fn new(price: f64) -> Self {
            Self {
                price,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl PricePredictor for FixedPrice {
        fn predict(&self, features: &FeatureVector) -> f64 {
            self.seen.borrow_mut().push(features.as_row());
            self.price
        }
    }

    fn record(kt: u32, price: f64) -> HouseRecord {
        HouseRecord {
            bedrooms: kt,
            bathrooms: 1,
            garages: 1,
            land_area: 100.0,
            building_area: 70.0,
            estimated_price: price,
        }
    }

    fn seeded(records: &[HouseRecord]) -> MemoryStore {
        MemoryStore::with_table(SHEET, records_to_table(records))
    }

    #[tokio::test]
    async fn successful_submission_appends_one_record() {
        let workflow = EstimationWorkflow::new(
            FixedPrice::new(350_000_000.0),
            seeded(&[record(1, 10.0), record(2, 20.0)]),
            SHEET,
        );

        let saved = workflow
            .submit(&HouseFeatures::new(3, 2, 1, 120.0, 85.0))
            .await
            .unwrap();

        let expected = HouseRecord {
            bedrooms: 3,
            bathrooms: 2,
            garages: 1,
            land_area: 120.0,
            building_area: 85.0,
            estimated_price: 350_000_000.0,
        };
        assert_eq!(saved, expected);
        assert_eq!(
            crate::util::format::estimate_message(saved.estimated_price),
            "Estimated House Price: 350,000,000.00"
        );
        assert_eq!(
            workflow.model.seen.borrow().as_slice(),
            &[[3.0, 2.0, 1.0, 120.0, 85.0]]
        );

        let stored = workflow.load_dataset().await.unwrap();
        assert_eq!(stored, vec![record(1, 10.0), record(2, 20.0), expected]);
    }

    #[tokio::test]
    async fn empty_input_never_touches_the_store() {
        let workflow = EstimationWorkflow::new(FixedPrice::new(1.0), MemoryStore::default(), SHEET);
        let err = workflow.submit(&HouseFeatures::default()).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Invalid(ValidationError::EmptyInput)
        ));
        assert_eq!(workflow.store().reads(), 0);
        assert_eq!(workflow.store().writes(), 0);
        assert!(workflow.model.seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn incomplete_input_never_touches_the_store() {
        let workflow = EstimationWorkflow::new(FixedPrice::new(1.0), MemoryStore::default(), SHEET);
        let err = workflow
            .submit(&HouseFeatures::new(2, 1, 0, 100.0, 0.0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Invalid(ValidationError::IncompleteInput)
        ));
        assert_eq!(workflow.store().writes(), 0);
        assert!(workflow.model.seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn first_submission_initializes_the_worksheet() {
        let workflow = EstimationWorkflow::new(FixedPrice::new(5.0), MemoryStore::default(), SHEET);
        assert_eq!(
            workflow.fetch_snapshot().await.unwrap(),
            DatasetSnapshot::Uninitialized
        );

        workflow
            .submit(&HouseFeatures::new(0, 0, 0, 30.0, 20.0))
            .await
            .unwrap();

        let table = workflow.store().table(SHEET).unwrap();
        assert_eq!(table.header, COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>());
        assert_eq!(table.rows.len(), 1);
    }

    #[tokio::test]
    async fn persist_adds_exactly_one_row_after_existing() {
        let existing = vec![record(1, 10.0), record(2, 20.0), record(3, 30.0)];
        let workflow = EstimationWorkflow::new(FixedPrice::new(0.0), seeded(&existing), SHEET);

        let rows = workflow
            .persist(existing.clone(), record(9, 90.0))
            .await
            .unwrap();
        assert_eq!(rows, existing.len() + 1);

        let stored = workflow.load_dataset().await.unwrap();
        assert_eq!(&stored[..existing.len()], &existing[..]);
        assert_eq!(stored.last(), Some(&record(9, 90.0)));
    }

    #[tokio::test]
    async fn load_dataset_drops_incomplete_rows() {
        let table = Table {
            header: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: vec![
                vec![json!(3), json!(2), json!(1), json!(120), json!(85), json!(9.5)],
                vec![json!(3), json!(2), json!(null), json!(120), json!(85), json!(9.5)],
                vec![json!(1), json!(1), json!(1), json!(50)],
            ],
        };
        let workflow = EstimationWorkflow::new(
            FixedPrice::new(0.0),
            MemoryStore::with_table(SHEET, table),
            SHEET,
        );

        let records = workflow.load_dataset().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].garages, 1);
    }

    #[tokio::test]
    async fn missing_schema_loads_as_empty() {
        let table = Table {
            header: vec!["name".into(), "price".into()],
            rows: vec![vec![json!("villa"), json!(1)]],
        };
        let workflow = EstimationWorkflow::new(
            FixedPrice::new(0.0),
            MemoryStore::with_table(SHEET, table),
            SHEET,
        );
        assert!(workflow.load_dataset().await.unwrap().is_empty());
        assert!(!workflow.fetch_snapshot().await.unwrap().is_initialized());
    }

    #[tokio::test]
    async fn concurrent_submissions_lose_one_row() {
        let initial = vec![record(1, 10.0), record(2, 20.0)];
        let store = seeded(&initial);
        let workflow = EstimationWorkflow::new(FixedPrice::new(100.0), store, SHEET);

        // Both requests read the same snapshot before either writes.
        let snapshot_a = workflow.load_dataset().await.unwrap();
        let snapshot_b = workflow.load_dataset().await.unwrap();
        let new_a = workflow.estimate(&HouseFeatures::new(4, 2, 1, 150.0, 110.0)).unwrap();
        let new_b = workflow.estimate(&HouseFeatures::new(5, 3, 2, 200.0, 160.0)).unwrap();

        workflow.persist(snapshot_a, new_a.clone()).await.unwrap();
        workflow.persist(snapshot_b, new_b.clone()).await.unwrap();

        let stored = workflow.load_dataset().await.unwrap();
        assert_eq!(stored.len(), initial.len() + 1);
        assert!(stored.contains(&new_b));
        assert!(!stored.contains(&new_a));
    }

    #[tokio::test]
    async fn write_failure_surfaces_as_store_error() {
        let store = MemoryStore::default();
        store.fail_writes();
        let workflow = EstimationWorkflow::new(FixedPrice::new(1.0), store, SHEET);

        let err = workflow
            .submit(&HouseFeatures::new(1, 1, 1, 10.0, 10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Store(StoreError::Api(_))));
        assert_eq!(workflow.store().reads(), 1);
    }

    #[tokio::test]
    async fn overflowing_prediction_is_rejected_without_writing() {
        let model = LinearRegression::new([0.0, 0.0, 0.0, 1.0e300, 0.0], 0.0);
        let workflow = EstimationWorkflow::new(model, seeded(&[record(1, 10.0)]), SHEET);

        let err = workflow
            .submit(&HouseFeatures::new(1, 1, 1, 1.0e10, 50.0))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::NonFinitePrediction(price) if price.is_infinite()));
        assert_eq!(workflow.store().reads(), 0);
        assert_eq!(workflow.store().writes(), 0);
        assert_eq!(workflow.load_dataset().await.unwrap(), vec![record(1, 10.0)]);
    }

    #[tokio::test]
    async fn linear_model_output_is_stored_verbatim() {
        let model = LinearRegression::new([0.0, 0.0, 0.0, -1.0, 0.0], 0.0);
        let workflow = EstimationWorkflow::new(model, MemoryStore::default(), SHEET);
        let saved = workflow
            .submit(&HouseFeatures::new(1, 1, 0, 80.0, 60.0))
            .await
            .unwrap();
        assert_eq!(saved.estimated_price, -80.0);
        assert_eq!(workflow.load_dataset().await.unwrap(), vec![saved]);
    }
}
