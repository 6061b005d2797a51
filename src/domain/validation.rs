use thiserror::Error;

use super::house::{FeatureVector, HouseFeatures};

/// Input problems that are reported back to the user instead of predicting.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide input values before predicting.")]
    EmptyInput,
    #[error("Both 'Land Area' and 'Building Area' must be greater than 0.")]
    IncompleteInput,
}

/// Checks form input before it may reach the model.
///
/// Zero counts are accepted. Both areas must be non-zero, and a fully blank
/// form is reported as empty before the area check.
pub fn validate(input: &HouseFeatures) -> Result<FeatureVector, ValidationError> {
    if input.is_blank() {
        return Err(ValidationError::EmptyInput);
    }
    if input.land_area == 0.0 || input.building_area == 0.0 {
        return Err(ValidationError::IncompleteInput);
    }
    Ok(FeatureVector::from_validated(*input))
}
