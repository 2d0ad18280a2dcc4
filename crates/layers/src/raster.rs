use serde::Serialize;

use crate::layer::{LayerKind, LayerSpec, SourceSpec};
use crate::symbology::{Layout, Paint, RasterPaint};

pub const DEFAULT_TILE_SIZE: u32 = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterSource {
    pub tiles: Vec<String>,
    #[serde(rename = "tileSize")]
    pub tile_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

impl RasterSource {
    pub fn new(tiles: Vec<String>) -> Self {
        Self {
            tiles,
            tile_size: DEFAULT_TILE_SIZE,
            attribution: None,
        }
    }

    /// Single-template source, the usual XYZ or WMS case.
    pub fn from_template(template: impl Into<String>) -> Self {
        Self::new(vec![template.into()])
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = Some(attribution.into());
        self
    }
}

impl From<RasterSource> for SourceSpec {
    fn from(source: RasterSource) -> Self {
        SourceSpec::Raster(source)
    }
}

impl LayerSpec {
    pub fn raster(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: LayerKind::Raster,
            source: source.into(),
            source_layer: None,
            minzoom: None,
            paint: Paint::Raster(RasterPaint::default()),
            layout: Layout::default(),
        }
    }
}
