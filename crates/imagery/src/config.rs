use foundation::YearRange;
use serde::{Deserialize, Serialize};
use streaming::{DEFAULT_ASSET_ID, DEFAULT_BANDS, DEFAULT_ENDPOINT, ImageryRequestTemplate};

pub const NAIP_FIRST_YEAR: i32 = 2009;
pub const NAIP_LAST_YEAR: i32 = 2023;

/// What to do when a year that is already pinned is pinned again.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePins {
    #[default]
    Reject,
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageryConfig {
    pub start_year: i32,
    pub end_year: i32,
    pub endpoint_url: String,
    pub asset_id: String,
    pub bands: Vec<String>,
    pub active_source_id: String,
    pub active_layer_id: String,
    pub duplicate_pins: DuplicatePins,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            start_year: NAIP_FIRST_YEAR,
            end_year: NAIP_LAST_YEAR,
            endpoint_url: DEFAULT_ENDPOINT.to_string(),
            asset_id: DEFAULT_ASSET_ID.to_string(),
            bands: DEFAULT_BANDS.iter().map(|b| b.to_string()).collect(),
            active_source_id: "naip-timeseries".to_string(),
            active_layer_id: "NAIP Time Series".to_string(),
            duplicate_pins: DuplicatePins::Reject,
        }
    }
}

impl ImageryConfig {
    pub fn range(&self) -> YearRange {
        YearRange::new(self.start_year, self.end_year)
    }

    pub fn template(&self) -> ImageryRequestTemplate {
        ImageryRequestTemplate::new(self.asset_id.clone(), self.bands.clone())
    }
}
