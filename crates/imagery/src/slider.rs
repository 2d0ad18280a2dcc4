use std::sync::Arc;

use foundation::{Year, YearRange};
use layers::{MapEngine, MapError};
use runtime::Notifier;
use serde::Serialize;
use streaming::{
    ImageryEndpoint, PrefetchReport, TileUrlCache, TileUrlResolver, spawn_prefetch,
};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::SharedMap;
use crate::active::{ActiveLayerSwapper, SwapOutcome};
use crate::config::ImageryConfig;
use crate::error::LayerError;
use crate::pinned::{PersistentLayerFactory, PinnedLayer};

/// What a slider hook did. Hooks report failures here instead of returning
/// an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SliderOutcome {
    Applied { year: Year, url: String },
    Stale { year: Year },
    Pinned { layer: PinnedLayer },
    Failed { year: Year, alert: String },
}

impl SliderOutcome {
    pub fn alert(&self) -> Option<&str> {
        match self {
            SliderOutcome::Failed { alert, .. } => Some(alert),
            _ => None,
        }
    }
}

impl From<SwapOutcome> for SliderOutcome {
    fn from(outcome: SwapOutcome) -> Self {
        match outcome {
            SwapOutcome::Applied { year, url } => SliderOutcome::Applied { year, url },
            SwapOutcome::Stale { year } => SliderOutcome::Stale { year },
        }
    }
}

/// Glue between the year slider widget and the map.
///
/// Slider positions are indices into the configured year range. Moving the
/// slider swaps the active layer; the widget's "add layer" button pins the
/// selected year.
pub struct TimeSliderController<M> {
    range: YearRange,
    resolver: TileUrlResolver,
    swapper: ActiveLayerSwapper<M>,
    factory: PersistentLayerFactory<M>,
    notifier: Arc<dyn Notifier>,
}

impl<M: MapEngine> TimeSliderController<M> {
    pub fn new(
        config: &ImageryConfig,
        endpoint: Arc<dyn ImageryEndpoint>,
        map: SharedMap<M>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let resolver = TileUrlResolver::new(
            config.range(),
            config.template(),
            TileUrlCache::new(),
            endpoint,
        );
        Self::with_resolver(config, resolver, map, notifier)
    }

    pub fn with_resolver(
        config: &ImageryConfig,
        resolver: TileUrlResolver,
        map: SharedMap<M>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let swapper = ActiveLayerSwapper::new(
            resolver.clone(),
            map.clone(),
            &config.active_source_id,
            &config.active_layer_id,
        );
        let factory = PersistentLayerFactory::new(resolver.clone(), map, config.duplicate_pins)
            .with_default_before(&config.active_layer_id);
        Self {
            range: resolver.range(),
            resolver,
            swapper,
            factory,
            notifier,
        }
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn labels(&self) -> Vec<String> {
        self.range.labels()
    }

    pub fn resolver(&self) -> &TileUrlResolver {
        &self.resolver
    }

    pub fn active_layer_id(&self) -> &str {
        self.swapper.layer_id()
    }

    /// Adds the active layer to the map. Call once before the first scrub.
    pub fn install(&self, before_id: Option<&str>) -> Result<(), MapError> {
        self.swapper.ensure_active_layer(before_id)
    }

    /// Warms the tile URL cache for every year in the background.
    pub fn start_prefetch(&self) -> JoinHandle<PrefetchReport> {
        spawn_prefetch(self.resolver.clone())
    }

    pub async fn on_change(&self, index: usize) -> SliderOutcome {
        let year = self.year_for(index);
        let result = match self.resolver.check_year(year) {
            Ok(()) => self.swapper.set_active_year(year).await,
            Err(err) => Err(err.into()),
        };
        match result {
            Ok(outcome) => outcome.into(),
            Err(err) => self.fail(year, format!("Failed to load NAIP imagery for {year}: {err}")),
        }
    }

    pub async fn on_add_layer(
        &self,
        index: usize,
        label: Option<&str>,
        before_id: Option<&str>,
    ) -> SliderOutcome {
        let year = self.year_for(index);
        if let Some(label) = label {
            if label != year.to_string() {
                warn!(%year, label, "slider label does not match selected year");
            }
        }
        let result: Result<PinnedLayer, LayerError> = match self.resolver.check_year(year) {
            Ok(()) => self.factory.pin(year, before_id).await,
            Err(err) => Err(err.into()),
        };
        match result {
            Ok(layer) => SliderOutcome::Pinned { layer },
            Err(err) => self.fail(year, format!("Failed to add NAIP layer for {year}: {err}")),
        }
    }

    fn year_for(&self, index: usize) -> Year {
        let offset = i32::try_from(index).unwrap_or(i32::MAX);
        Year(self.range.start.get().saturating_add(offset))
    }

    fn fail(&self, year: Year, alert: String) -> SliderOutcome {
        warn!(%year, "{alert}");
        self.notifier.alert(alert.clone());
        SliderOutcome::Failed { year, alert }
    }
}

impl<M> std::fmt::Debug for TimeSliderController<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeSliderController")
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use foundation::Year;
    use layers::{MapEngine, MapStyle, SourceSpec};
    use pretty_assertions::assert_eq;
    use runtime::EventBus;
    use streaming::ImageryError;

    use super::{SliderOutcome, TimeSliderController};
    use crate::SharedMap;
    use crate::config::ImageryConfig;
    use crate::testing::{ScriptedEndpoint, playa_map, url_for};

    fn controller(
        endpoint: Arc<ScriptedEndpoint>,
    ) -> (TimeSliderController<MapStyle>, SharedMap<MapStyle>, EventBus) {
        let map = playa_map();
        let events = EventBus::new();
        let ctl = TimeSliderController::new(
            &ImageryConfig::default(),
            endpoint,
            map.clone(),
            Arc::new(events.clone()),
        );
        ctl.install(Some("3DEP Hillshade")).unwrap();
        (ctl, map, events)
    }

    fn tiles(map: &SharedMap<MapStyle>, source: &str) -> Vec<String> {
        match map.lock().source(source) {
            Some(SourceSpec::Raster(r)) => r.tiles.clone(),
            other => panic!("unexpected source {source}: {other:?}"),
        }
    }

    #[test]
    fn labels_cover_the_naip_years() {
        let (ctl, _, _) = controller(ScriptedEndpoint::new());
        let labels = ctl.labels();
        assert_eq!(labels.len(), 15);
        assert_eq!(labels.first().map(String::as_str), Some("2009"));
        assert_eq!(labels.last().map(String::as_str), Some("2023"));
    }

    #[tokio::test]
    async fn scrub_then_pin_end_to_end() {
        let (ctl, map, events) = controller(ScriptedEndpoint::new());

        let outcome = ctl.on_change(0).await;
        assert_eq!(
            outcome,
            SliderOutcome::Applied {
                year: Year(2009),
                url: url_for(2009)
            }
        );
        assert_eq!(tiles(&map, "naip-timeseries"), vec![url_for(2009)]);

        let outcome = ctl.on_add_layer(5, Some("2014"), Some("3DEP Hillshade")).await;
        let SliderOutcome::Pinned { layer } = outcome else {
            panic!("expected a pin, got {outcome:?}");
        };
        assert_eq!(layer.source_id, "NAIP-source-2014");
        assert_eq!(layer.layer_id, "NAIP Layer 2014");

        let ids = map.lock().layer_ids();
        let pinned = ids.iter().position(|id| id == "NAIP Layer 2014").unwrap();
        assert_eq!(ids[pinned + 1], "3DEP Hillshade");
        assert_eq!(tiles(&map, "NAIP-source-2014"), vec![url_for(2014)]);
        assert_eq!(tiles(&map, "naip-timeseries"), vec![url_for(2009)]);
        assert!(events.alerts().is_empty());
    }

    #[tokio::test]
    async fn scrubbing_after_a_pin_leaves_the_pin_alone() {
        let (ctl, map, _) = controller(ScriptedEndpoint::new());
        ctl.on_add_layer(3, None, None).await;
        ctl.on_change(10).await;

        assert_eq!(tiles(&map, "NAIP-source-2012"), vec![url_for(2012)]);
        assert_eq!(tiles(&map, "naip-timeseries"), vec![url_for(2019)]);
    }

    #[tokio::test]
    async fn failed_scrub_alerts_and_keeps_tiles() {
        let endpoint = ScriptedEndpoint::new();
        endpoint.fail_next(2010, ImageryError::Network("connection reset".into()));
        let (ctl, map, events) = controller(endpoint);

        ctl.on_change(0).await;
        let outcome = ctl.on_change(1).await;
        assert_eq!(
            outcome.alert(),
            Some("Failed to load NAIP imagery for 2010: imagery request failed: connection reset")
        );
        assert_eq!(tiles(&map, "naip-timeseries"), vec![url_for(2009)]);

        let alerts = events.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, outcome.alert().unwrap());
    }

    #[tokio::test]
    async fn failure_for_a_superseded_scrub_is_dropped_quietly() {
        let endpoint = ScriptedEndpoint::new();
        endpoint.fail_next(2012, ImageryError::Network("timeout".into()));
        let release_2012 = endpoint.gate(2012);
        let (ctl, map, events) = controller(endpoint);

        let shared = &ctl;
        let (early, late) = tokio::join!(shared.on_change(3), async move {
            let out = shared.on_change(11).await;
            release_2012.send(()).unwrap();
            out
        });

        assert_eq!(early, SliderOutcome::Stale { year: Year(2012) });
        assert_eq!(
            late,
            SliderOutcome::Applied {
                year: Year(2020),
                url: url_for(2020)
            }
        );
        assert!(events.alerts().is_empty());
        assert_eq!(tiles(&map, "naip-timeseries"), vec![url_for(2020)]);
    }

    #[tokio::test]
    async fn out_of_range_index_alerts_without_network() {
        let endpoint = ScriptedEndpoint::new();
        let (ctl, _, events) = controller(endpoint.clone());

        let outcome = ctl.on_change(15).await;
        assert!(matches!(outcome, SliderOutcome::Failed { year: Year(2024), .. }));
        let outcome = ctl.on_add_layer(40, None, None).await;
        assert!(matches!(outcome, SliderOutcome::Failed { year: Year(2049), .. }));

        assert_eq!(endpoint.calls(), 0);
        assert_eq!(events.alerts().len(), 2);
        assert!(events.alerts()[1].message.starts_with("Failed to add NAIP layer for 2049"));
    }

    #[tokio::test]
    async fn prefetch_only_warms_the_cache() {
        let endpoint = ScriptedEndpoint::new();
        endpoint.fail_next(2016, ImageryError::Network("timeout".into()));
        let (ctl, map, events) = controller(endpoint.clone());
        let before = map.lock().to_style_json();

        let report = ctl.start_prefetch().await.unwrap();
        assert_eq!(report.resolved.len(), 14);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(map.lock().to_style_json(), before);
        assert!(events.alerts().is_empty());

        ctl.on_change(2).await;
        assert_eq!(endpoint.calls_for(2011), 1);
    }

    #[test]
    fn outcomes_serialize_with_a_status_tag() {
        let json = serde_json::to_value(SliderOutcome::Stale { year: Year(2011) }).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "stale", "year": 2011 }));
    }
}
