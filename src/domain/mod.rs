//! Domain logic for house price estimation lives here.

pub mod dataset;
pub mod house;
pub mod predictor;
pub mod validation;

pub use dataset::{merge_records, records_to_table, DatasetSnapshot, Table};
pub use house::{FeatureVector, HouseFeatures, HouseRecord, COLUMNS};
pub use predictor::{LinearRegression, PricePredictor};
pub use validation::{validate, ValidationError};
