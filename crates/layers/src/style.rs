use std::collections::BTreeMap;

use serde_json::{Value, json};
use tracing::debug;

use crate::layer::{LayerSpec, MapEngine, MapError, SourceSpec};
use crate::symbology::Visibility;

/// In-memory map state: keyed sources plus layers in draw order.
///
/// Serializes to a MapLibre style document that a client layers on top of
/// its base style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStyle {
    base_style: Option<String>,
    sources: BTreeMap<String, SourceSpec>,
    layers: Vec<LayerSpec>,
}

impl MapStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_style(base_style: impl Into<String>) -> Self {
        Self {
            base_style: Some(base_style.into()),
            ..Self::default()
        }
    }

    pub fn base_style(&self) -> Option<&str> {
        self.base_style.as_deref()
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    fn position(&self, layer_id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == layer_id)
    }

    pub fn to_style_json(&self) -> Value {
        json!({
            "version": 8,
            "metadata": { "base_style": self.base_style },
            "sources": self.sources,
            "layers": self.layers,
        })
    }
}

impl MapEngine for MapStyle {
    fn source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources.get(id)
    }

    fn set_tiles(&mut self, source_id: &str, tiles: Vec<String>) -> Result<(), MapError> {
        match self.sources.get_mut(source_id) {
            Some(SourceSpec::Raster(raster)) => {
                raster.tiles = tiles;
                Ok(())
            }
            Some(_) => Err(MapError::NotRaster(source_id.to_string())),
            None => Err(MapError::UnknownSource(source_id.to_string())),
        }
    }

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<(), MapError> {
        if self.sources.contains_key(id) {
            return Err(MapError::DuplicateSource(id.to_string()));
        }
        debug!(source = id, "adding source");
        self.sources.insert(id.to_string(), source);
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<SourceSpec, MapError> {
        if let Some(layer) = self.layers.iter().find(|l| l.source == id) {
            return Err(MapError::SourceInUse {
                source: id.to_string(),
                layer: layer.id.clone(),
            });
        }
        self.sources
            .remove(id)
            .ok_or_else(|| MapError::UnknownSource(id.to_string()))
    }

    fn add_layer(&mut self, layer: LayerSpec, before_id: Option<&str>) -> Result<(), MapError> {
        if self.position(&layer.id).is_some() {
            return Err(MapError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(MapError::UnknownSource(layer.source));
        }
        let index = match before_id {
            Some(before) => self
                .position(before)
                .ok_or_else(|| MapError::UnknownLayer(before.to_string()))?,
            None => self.layers.len(),
        };
        debug!(layer = %layer.id, index, "adding layer");
        self.layers.insert(index, layer);
        Ok(())
    }

    fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn remove_layer(&mut self, id: &str) -> Result<LayerSpec, MapError> {
        let index = self
            .position(id)
            .ok_or_else(|| MapError::UnknownLayer(id.to_string()))?;
        Ok(self.layers.remove(index))
    }

    fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    fn set_visibility(&mut self, id: &str, visibility: Visibility) -> Result<(), MapError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| MapError::UnknownLayer(id.to_string()))?;
        layer.layout.visibility = visibility;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MapStyle;
    use crate::layer::{LayerSpec, MapEngine, MapError, SourceSpec};
    use crate::raster::RasterSource;
    use crate::symbology::Visibility;
    use crate::vector::VectorSource;
    use pretty_assertions::assert_eq;

    fn two_layer_map() -> MapStyle {
        let mut map = MapStyle::with_base_style("https://basemaps.example/style.json");
        map.add_source("a", RasterSource::from_template("a/{z}/{x}/{y}").into())
            .unwrap();
        map.add_source("b", RasterSource::from_template("b/{z}/{x}/{y}").into())
            .unwrap();
        map.add_layer(LayerSpec::raster("A", "a"), None).unwrap();
        map.add_layer(LayerSpec::raster("B", "b"), None).unwrap();
        map
    }

    #[test]
    fn before_id_inserts_immediately_below() {
        let mut map = two_layer_map();
        map.add_source("c", RasterSource::new(vec![]).into()).unwrap();
        map.add_layer(LayerSpec::raster("C", "c"), Some("B")).unwrap();
        assert_eq!(map.layer_ids(), vec!["A", "C", "B"]);

        let err = map
            .add_layer(LayerSpec::raster("D", "c"), Some("missing"))
            .unwrap_err();
        assert_eq!(err, MapError::UnknownLayer("missing".into()));
    }

    #[test]
    fn set_tiles_replaces_the_list() {
        let mut map = two_layer_map();
        map.set_tiles("a", vec!["x".into()]).unwrap();
        map.set_tiles("a", vec!["y".into()]).unwrap();
        let Some(SourceSpec::Raster(raster)) = map.source("a") else {
            panic!("expected raster source");
        };
        assert_eq!(raster.tiles, vec!["y".to_string()]);
    }

    #[test]
    fn set_tiles_rejects_non_raster_and_unknown_sources() {
        let mut map = two_layer_map();
        map.add_source("v", VectorSource::pmtiles("https://x/y.pmtiles").into())
            .unwrap();
        assert_eq!(
            map.set_tiles("v", vec![]),
            Err(MapError::NotRaster("v".into()))
        );
        assert_eq!(
            map.set_tiles("nope", vec![]),
            Err(MapError::UnknownSource("nope".into()))
        );
    }

    #[test]
    fn duplicates_and_dangling_sources_are_rejected() {
        let mut map = two_layer_map();
        assert_eq!(
            map.add_source("a", RasterSource::new(vec![]).into()),
            Err(MapError::DuplicateSource("a".into()))
        );
        assert_eq!(
            map.add_layer(LayerSpec::raster("A", "b"), None),
            Err(MapError::DuplicateLayer("A".into()))
        );
        assert_eq!(
            map.add_layer(LayerSpec::raster("Z", "zz"), None),
            Err(MapError::UnknownSource("zz".into()))
        );
        assert!(matches!(
            map.remove_source("a"),
            Err(MapError::SourceInUse { .. })
        ));

        map.remove_layer("A").unwrap();
        assert!(map.remove_source("a").is_ok());
    }

    #[test]
    fn visibility_round_trips_through_the_engine() {
        let mut map = two_layer_map();
        assert_eq!(map.visibility("A"), Some(Visibility::Visible));
        map.set_visibility("A", Visibility::Hidden).unwrap();
        assert_eq!(map.visibility("A"), Some(Visibility::Hidden));
        assert_eq!(map.visibility("nope"), None);
    }

    #[test]
    fn style_json_lists_layers_in_draw_order() {
        let map = two_layer_map();
        let style = map.to_style_json();
        assert_eq!(style["version"], 8);
        assert_eq!(
            style["metadata"]["base_style"],
            "https://basemaps.example/style.json"
        );
        assert_eq!(style["layers"][0]["id"], "A");
        assert_eq!(style["layers"][1]["id"], "B");
        assert_eq!(style["sources"]["b"]["type"], "raster");
    }
}
