use std::sync::Arc;

use foundation::YearRange;
use layers::MapStyle;
use parking_lot::Mutex;
use streaming::{ImageryRequestTemplate, TileUrlCache, TileUrlResolver};

use crate::SharedMap;

pub use streaming::testing::{ScriptedEndpoint, url_for};

pub fn resolver(endpoint: Arc<ScriptedEndpoint>) -> TileUrlResolver {
    TileUrlResolver::new(
        YearRange::new(2009, 2023),
        ImageryRequestTemplate::default(),
        TileUrlCache::new(),
        endpoint,
    )
}

/// The playa style: the hillshade layer exists to pin beneath.
pub fn playa_map() -> SharedMap<MapStyle> {
    let style = layers::playa::build_style(layers::playa::BASE_MAP_STYLE).unwrap();
    Arc::new(Mutex::new(style))
}
