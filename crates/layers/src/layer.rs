use serde::Serialize;

use crate::raster::RasterSource;
use crate::symbology::{Layout, Paint, Visibility};
use crate::vector::{GeoJsonSource, VectorSource};

/// Where a layer's data comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceSpec {
    Raster(RasterSource),
    Vector(VectorSource),
    GeoJson(GeoJsonSource),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Raster,
    Fill,
}

/// How a source is drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub source: String,
    #[serde(rename = "source-layer", skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    pub paint: Paint,
    pub layout: Layout,
}

impl LayerSpec {
    pub fn with_minzoom(mut self, minzoom: f64) -> Self {
        self.minzoom = Some(minzoom);
        self
    }

    pub fn with_source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.layout.visibility = visibility;
        self
    }

    pub fn hidden(self) -> Self {
        self.with_visibility(Visibility::Hidden)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    DuplicateSource(String),
    DuplicateLayer(String),
    UnknownSource(String),
    UnknownLayer(String),
    NotRaster(String),
    SourceInUse { source: String, layer: String },
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::DuplicateSource(id) => write!(f, "source already exists: {id}"),
            MapError::DuplicateLayer(id) => write!(f, "layer already exists: {id}"),
            MapError::UnknownSource(id) => write!(f, "no such source: {id}"),
            MapError::UnknownLayer(id) => write!(f, "no such layer: {id}"),
            MapError::NotRaster(id) => write!(f, "source is not a raster source: {id}"),
            MapError::SourceInUse { source, layer } => {
                write!(f, "source {source} is still used by layer {layer}")
            }
        }
    }
}

impl std::error::Error for MapError {}

/// The mutable source/layer state of a rendering engine.
///
/// Every call takes effect synchronously.
pub trait MapEngine {
    fn source(&self, id: &str) -> Option<&SourceSpec>;

    /// Replaces (never appends to) a raster source's tile templates.
    fn set_tiles(&mut self, source_id: &str, tiles: Vec<String>) -> Result<(), MapError>;

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<(), MapError>;

    fn remove_source(&mut self, id: &str) -> Result<SourceSpec, MapError>;

    /// Adds a layer on top, or immediately below `before_id` when given.
    fn add_layer(&mut self, layer: LayerSpec, before_id: Option<&str>) -> Result<(), MapError>;

    fn layer(&self, id: &str) -> Option<&LayerSpec>;

    fn remove_layer(&mut self, id: &str) -> Result<LayerSpec, MapError>;

    /// Layer ids in draw order, bottom first.
    fn layer_ids(&self) -> Vec<String>;

    fn set_visibility(&mut self, id: &str, visibility: Visibility) -> Result<(), MapError>;

    fn visibility(&self, id: &str) -> Option<Visibility> {
        self.layer(id).map(|l| l.layout.visibility)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layer(id).is_some()
    }
}
