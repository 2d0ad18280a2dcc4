use foundation::Year;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ASSET_ID: &str = "USDA/NAIP/DOQQ";

/// Near-infrared, red, green: the false-colour composite.
pub const DEFAULT_BANDS: [&str; 3] = ["N", "R", "G"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisParams {
    pub bands: Vec<String>,
}

/// Outbound descriptor asking the tile service for one year of imagery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageryRequest {
    pub asset_id: String,
    pub start_date: String,
    pub end_date: String,
    pub vis_params: VisParams,
}

/// The fixed parts of every request; only the dates vary per year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageryRequestTemplate {
    pub asset_id: String,
    pub bands: Vec<String>,
}

impl ImageryRequestTemplate {
    pub fn new(asset_id: impl Into<String>, bands: Vec<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            bands,
        }
    }

    pub fn request_for(&self, year: Year) -> ImageryRequest {
        ImageryRequest {
            asset_id: self.asset_id.clone(),
            start_date: year.start_date(),
            end_date: year.end_date(),
            vis_params: VisParams {
                bands: self.bands.clone(),
            },
        }
    }
}

impl Default for ImageryRequestTemplate {
    fn default() -> Self {
        Self::new(
            DEFAULT_ASSET_ID,
            DEFAULT_BANDS.iter().map(|b| b.to_string()).collect(),
        )
    }
}
