/// Number of model inputs, in the order the regression was trained on.
pub const FEATURE_COUNT: usize = 5;

/// Worksheet column names, in display order.
pub const COLUMNS: [&str; 6] = ["kt", "km", "grs", "lt", "lb", "estimated_price"];

/// Raw values from the input form. Unset fields stay at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HouseFeatures {
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub garages: u32,
    pub land_area: f64,
    pub building_area: f64,
}

impl HouseFeatures {
    pub fn new(
        bedrooms: u32,
        bathrooms: u32,
        garages: u32,
        land_area: f64,
        building_area: f64,
    ) -> Self {
        Self {
            bedrooms,
            bathrooms,
            garages,
            land_area,
            building_area,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.bedrooms == 0
            && self.bathrooms == 0
            && self.garages == 0
            && self.land_area == 0.0
            && self.building_area == 0.0
    }
}

/// Features that passed validation, kept in model order:
/// `[bedrooms, bathrooms, garages, land_area, building_area]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector(HouseFeatures);

impl FeatureVector {
    /// Only `validation::validate` builds these.
    pub(crate) fn from_validated(features: HouseFeatures) -> Self {
        Self(features)
    }

    pub fn features(&self) -> &HouseFeatures {
        &self.0
    }

    pub fn as_row(&self) -> [f64; FEATURE_COUNT] {
        let f = &self.0;
        [
            f64::from(f.bedrooms),
            f64::from(f.bathrooms),
            f64::from(f.garages),
            f.land_area,
            f.building_area,
        ]
    }
}

/// One persisted observation: the five inputs plus the model's estimate.
/// Stored under `COLUMNS` in field order.
#[derive(Clone, Debug, PartialEq)]
pub struct HouseRecord {
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub garages: u32,
    pub land_area: f64,
    pub building_area: f64,
    pub estimated_price: f64,
}

impl HouseRecord {
    pub fn new(features: &FeatureVector, estimated_price: f64) -> Self {
        let f = features.features();
        Self {
            bedrooms: f.bedrooms,
            bathrooms: f.bathrooms,
            garages: f.garages,
            land_area: f.land_area,
            building_area: f.building_area,
            estimated_price,
        }
    }
}
