use foundation::Year;
use layers::{LayerSpec, MapEngine, MapError, RasterSource};
use runtime::LatestRequest;
use serde::Serialize;
use streaming::TileUrlResolver;
use tracing::{debug, info};

use crate::SharedMap;
use crate::error::LayerError;

pub const NAIP_ATTRIBUTION: &str = "&copy; USDA NAIP";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SwapOutcome {
    /// The active source now shows this year.
    Applied { year: Year, url: String },
    /// A newer selection was made while this one resolved; nothing changed.
    Stale { year: Year },
}

/// Points the single scrub-driven raster source at the selected year.
///
/// Selections are ordered by when they were requested. A resolution that
/// completes after a newer selection was made is discarded, so a slow year can
/// never overwrite a faster, later one.
pub struct ActiveLayerSwapper<M> {
    resolver: TileUrlResolver,
    map: SharedMap<M>,
    source_id: String,
    layer_id: String,
    latest: LatestRequest,
}

impl<M: MapEngine> ActiveLayerSwapper<M> {
    pub fn new(
        resolver: TileUrlResolver,
        map: SharedMap<M>,
        source_id: impl Into<String>,
        layer_id: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            map,
            source_id: source_id.into(),
            layer_id: layer_id.into(),
            latest: LatestRequest::new(),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Registers the active source (no tiles yet) and its layer if missing.
    pub fn ensure_active_layer(&self, before_id: Option<&str>) -> Result<(), MapError> {
        let mut map = self.map.lock();
        if map.source(&self.source_id).is_none() {
            map.add_source(
                &self.source_id,
                RasterSource::new(Vec::new())
                    .with_attribution(NAIP_ATTRIBUTION)
                    .into(),
            )?;
        }
        if !map.has_layer(&self.layer_id) {
            map.add_layer(LayerSpec::raster(&self.layer_id, &self.source_id), before_id)?;
        }
        Ok(())
    }

    pub async fn set_active_year(&self, year: Year) -> Result<SwapOutcome, LayerError> {
        let ticket = self.latest.issue();
        let resolved = self.resolver.resolve(year).await;

        // Checked under the map lock so no newer selection can land between
        // the check and the write.
        let mut map = self.map.lock();
        if !self.latest.is_current(ticket) {
            debug!(%year, "dropping stale imagery selection");
            return Ok(SwapOutcome::Stale { year });
        }

        let url = resolved?;
        map.set_tiles(&self.source_id, vec![url.clone()])?;
        info!(%year, source = %self.source_id, "active imagery year changed");
        Ok(SwapOutcome::Applied { year, url })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use foundation::Year;
    use layers::{MapEngine, MapStyle, SourceSpec};
    use pretty_assertions::assert_eq;
    use streaming::ImageryError;

    use super::{ActiveLayerSwapper, SwapOutcome};
    use crate::SharedMap;
    use crate::error::LayerError;
    use crate::testing::{ScriptedEndpoint, playa_map, resolver, url_for};

    fn active_tiles(map: &SharedMap<MapStyle>) -> Vec<String> {
        match map.lock().source("naip-timeseries") {
            Some(SourceSpec::Raster(r)) => r.tiles.clone(),
            other => panic!("unexpected source: {other:?}"),
        }
    }

    fn swapper(
        endpoint: Arc<ScriptedEndpoint>,
    ) -> (ActiveLayerSwapper<MapStyle>, SharedMap<MapStyle>) {
        let map = playa_map();
        let s = ActiveLayerSwapper::new(
            resolver(endpoint),
            map.clone(),
            "naip-timeseries",
            "NAIP Time Series",
        );
        s.ensure_active_layer(Some("3DEP Hillshade")).unwrap();
        (s, map)
    }

    #[tokio::test]
    async fn scrub_replaces_the_tile_list() {
        let endpoint = ScriptedEndpoint::new();
        let (s, map) = swapper(endpoint.clone());
        assert!(active_tiles(&map).is_empty());

        s.set_active_year(Year(2009)).await.unwrap();
        assert_eq!(active_tiles(&map), vec![url_for(2009)]);

        s.set_active_year(Year(2010)).await.unwrap();
        assert_eq!(active_tiles(&map), vec![url_for(2010)]);
    }

    #[tokio::test]
    async fn repeated_year_is_idempotent_without_traffic() {
        let endpoint = ScriptedEndpoint::new();
        let (s, map) = swapper(endpoint.clone());

        let a = s.set_active_year(Year(2016)).await.unwrap();
        let b = s.set_active_year(Year(2016)).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(active_tiles(&map), vec![url_for(2016)]);
        assert_eq!(endpoint.calls_for(2016), 1);
    }

    #[tokio::test]
    async fn late_completion_never_overwrites_newer_selection() {
        let endpoint = ScriptedEndpoint::new();
        let release_2012 = endpoint.gate(2012);
        let (s, map) = swapper(endpoint.clone());

        let shared = &s;
        let (first, second) = tokio::join!(shared.set_active_year(Year(2012)), async move {
            let out = shared.set_active_year(Year(2020)).await;
            release_2012.send(()).unwrap();
            out
        });

        assert_eq!(first.unwrap(), SwapOutcome::Stale { year: Year(2012) });
        assert_eq!(
            second.unwrap(),
            SwapOutcome::Applied {
                year: Year(2020),
                url: url_for(2020)
            }
        );
        assert_eq!(active_tiles(&map), vec![url_for(2020)]);
    }

    #[tokio::test]
    async fn failure_leaves_previous_tiles() {
        let endpoint = ScriptedEndpoint::new();
        endpoint.fail_next(2013, ImageryError::Network("offline".into()));
        let (s, map) = swapper(endpoint.clone());

        s.set_active_year(Year(2009)).await.unwrap();
        let err = s.set_active_year(Year(2013)).await.unwrap_err();
        assert_eq!(err, LayerError::Resolve(ImageryError::Network("offline".into())));
        assert_eq!(active_tiles(&map), vec![url_for(2009)]);
    }

    #[test]
    fn active_layer_sits_below_the_requested_layer() {
        let (s, map) = swapper(ScriptedEndpoint::new());
        let ids = map.lock().layer_ids();
        let active = ids.iter().position(|id| id == s.layer_id()).unwrap();
        let hillshade = ids.iter().position(|id| id == "3DEP Hillshade").unwrap();
        assert_eq!(active + 1, hillshade);

        // A second install is a no-op.
        s.ensure_active_layer(Some("3DEP Hillshade")).unwrap();
        assert_eq!(map.lock().layer_ids(), ids);
    }
}
