use serde::Serialize;
use serde_json::Value;

use crate::layer::{LayerKind, LayerSpec, SourceSpec};
use crate::symbology::{FillPaint, Layout, Paint};

/// Vector tiles addressed by a single archive URL (e.g. `pmtiles://...`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorSource {
    pub url: String,
}

impl VectorSource {
    pub fn pmtiles(https_url: &str) -> Self {
        Self {
            url: format!("pmtiles://{https_url}"),
        }
    }
}

/// Inline GeoJSON data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoJsonSource {
    pub data: Value,
}

impl From<VectorSource> for SourceSpec {
    fn from(source: VectorSource) -> Self {
        SourceSpec::Vector(source)
    }
}

impl From<GeoJsonSource> for SourceSpec {
    fn from(source: GeoJsonSource) -> Self {
        SourceSpec::GeoJson(source)
    }
}

impl LayerSpec {
    pub fn fill(id: impl Into<String>, source: impl Into<String>, paint: FillPaint) -> Self {
        Self {
            id: id.into(),
            kind: LayerKind::Fill,
            source: source.into(),
            source_layer: None,
            minzoom: None,
            paint: Paint::Fill(paint),
            layout: Layout::default(),
        }
    }
}
