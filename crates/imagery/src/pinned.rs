use std::sync::atomic::{AtomicU64, Ordering};

use foundation::Year;
use layers::{LayerSpec, MapEngine, MapError, RasterSource};
use serde::Serialize;
use streaming::TileUrlResolver;
use tracing::{info, warn};

use crate::SharedMap;
use crate::active::NAIP_ATTRIBUTION;
use crate::config::DuplicatePins;
use crate::error::LayerError;

/// A year frozen onto the map as its own source and layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinnedLayer {
    pub year: Year,
    pub source_id: String,
    pub layer_id: String,
}

pub fn pinned_source_id(year: Year) -> String {
    format!("NAIP-source-{year}")
}

pub fn pinned_layer_id(year: Year) -> String {
    format!("NAIP Layer {year}")
}

/// Creates independent raster layers for single years.
///
/// A pinned layer never changes after creation; scrubbing the active layer
/// does not touch it.
pub struct PersistentLayerFactory<M> {
    resolver: TileUrlResolver,
    map: SharedMap<M>,
    default_before: Option<String>,
    policy: DuplicatePins,
    pins: AtomicU64,
}

impl<M: MapEngine> PersistentLayerFactory<M> {
    pub fn new(resolver: TileUrlResolver, map: SharedMap<M>, policy: DuplicatePins) -> Self {
        Self {
            resolver,
            map,
            default_before: None,
            policy,
            pins: AtomicU64::new(0),
        }
    }

    /// Layer that new pins are placed beneath when the caller names none.
    pub fn with_default_before(mut self, layer_id: impl Into<String>) -> Self {
        self.default_before = Some(layer_id.into());
        self
    }

    pub fn policy(&self) -> DuplicatePins {
        self.policy
    }

    pub async fn pin(
        &self,
        year: Year,
        before_id: Option<&str>,
    ) -> Result<PinnedLayer, LayerError> {
        self.resolver.check_year(year)?;
        self.check_duplicate(&*self.map.lock(), year)?;

        let url = self.resolver.resolve(year).await?;

        let mut map = self.map.lock();
        // Another pin of the same year may have landed during resolution.
        self.check_duplicate(&*map, year)?;

        let before = match before_id {
            Some(id) => Some(id),
            None => self
                .default_before
                .as_deref()
                .filter(|id| map.has_layer(id)),
        };
        if let Some(id) = before {
            if !map.has_layer(id) {
                return Err(MapError::UnknownLayer(id.to_string()).into());
            }
        }

        let pin = self.next_ids(&*map, year);
        map.add_source(
            &pin.source_id,
            RasterSource::new(vec![url])
                .with_attribution(NAIP_ATTRIBUTION)
                .into(),
        )?;
        if let Err(err) = map.add_layer(LayerSpec::raster(&pin.layer_id, &pin.source_id), before) {
            if let Err(rollback) = map.remove_source(&pin.source_id) {
                warn!(
                    source = %pin.source_id,
                    error = %rollback,
                    "failed to roll back pinned source"
                );
            }
            return Err(err.into());
        }

        info!(%year, layer = %pin.layer_id, before = ?before, "pinned imagery layer");
        Ok(pin)
    }

    fn check_duplicate(&self, map: &M, year: Year) -> Result<(), LayerError> {
        let layer_id = pinned_layer_id(year);
        if self.policy == DuplicatePins::Reject && map.has_layer(&layer_id) {
            return Err(LayerError::AlreadyPinned { year, layer_id });
        }
        Ok(())
    }

    fn next_ids(&self, map: &M, year: Year) -> PinnedLayer {
        let source_id = pinned_source_id(year);
        let layer_id = pinned_layer_id(year);
        if map.source(&source_id).is_none() && !map.has_layer(&layer_id) {
            return PinnedLayer {
                year,
                source_id,
                layer_id,
            };
        }
        loop {
            let n = self.pins.fetch_add(1, Ordering::Relaxed) + 1;
            let source_id = format!("{source_id}-{n}");
            let layer_id = format!("{layer_id} ({n})");
            if map.source(&source_id).is_none() && !map.has_layer(&layer_id) {
                return PinnedLayer {
                    year,
                    source_id,
                    layer_id,
                };
            }
        }
    }
}
