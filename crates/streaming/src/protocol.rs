//! Wire types for the imagery tile service.
//!
//! The service takes an [`ImageryRequest`](crate::ImageryRequest) as a JSON
//! `POST` body and answers with a single tile template URL that the map engine
//! expands per `{z}/{x}/{y}`.

use serde::{Deserialize, Serialize};

use crate::error::ImageryError;

pub const DEFAULT_ENDPOINT: &str = "https://giswqs-ee-tile-request.hf.space/tile";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageryResponse {
    pub tile_url: String,
}

impl ImageryResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, ImageryError> {
        let resp: ImageryResponse =
            serde_json::from_slice(body).map_err(|e| ImageryError::Parse(e.to_string()))?;
        if resp.tile_url.trim().is_empty() {
            return Err(ImageryError::Parse("empty tile_url".to_string()));
        }
        Ok(resp)
    }
}
