use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use http::Method;
use imagery::{DuplicatePins, ImageryConfig, TimeSliderController};
use layers::{playa, MapEngine, StreetViewProvider};
use parking_lot::Mutex;
use runtime::EventBus;
use streaming::HttpImageryEndpoint;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod routes;

use routes::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Playa wetlands map with a NAIP time slider")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "PLAYA_ADDR", default_value = "127.0.0.1:9200")]
    addr: SocketAddr,

    /// Base map style URL the overlay layers are drawn on.
    #[arg(long, env = "PLAYA_BASE_STYLE", default_value = playa::BASE_MAP_STYLE)]
    base_style: String,

    /// Tile request service that turns a NAIP year into a tile URL template.
    #[arg(long, env = "NAIP_ENDPOINT", default_value = streaming::DEFAULT_ENDPOINT)]
    naip_endpoint: String,

    #[arg(long, env = "NAIP_START_YEAR", default_value_t = imagery::NAIP_FIRST_YEAR)]
    start_year: i32,

    #[arg(long, env = "NAIP_END_YEAR", default_value_t = imagery::NAIP_LAST_YEAR)]
    end_year: i32,

    /// Pin the same year more than once under suffixed layer ids.
    #[arg(long)]
    allow_duplicate_pins: bool,

    /// Skip warming the tile URL cache at startup.
    #[arg(long)]
    no_prefetch: bool,

    #[arg(long, env = "GOOGLE_MAPS_API_KEY", default_value = "", hide_env_values = true)]
    google_maps_api_key: String,

    #[arg(long, env = "MAPILLARY_ACCESS_TOKEN", default_value = "", hide_env_values = true)]
    mapillary_access_token: String,
}

impl Args {
    fn imagery_config(&self) -> ImageryConfig {
        ImageryConfig {
            start_year: self.start_year,
            end_year: self.end_year,
            endpoint_url: self.naip_endpoint.clone(),
            duplicate_pins: if self.allow_duplicate_pins {
                DuplicatePins::Allow
            } else {
                DuplicatePins::Reject
            },
            ..ImageryConfig::default()
        }
    }
}

fn configured(value: &str) -> &'static str {
    if value.is_empty() {
        "Not configured"
    } else {
        "Configured"
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    info!(
        "Google Maps API key: {}",
        configured(&args.google_maps_api_key)
    );
    info!(
        "Mapillary access token: {}",
        configured(&args.mapillary_access_token)
    );

    let config = args.imagery_config();
    if config.range().is_empty() {
        error!(
            "empty NAIP year range {}-{}",
            config.start_year, config.end_year
        );
        std::process::exit(2);
    }

    let style = match playa::build_style(&args.base_style) {
        Ok(style) => style,
        Err(err) => {
            error!("failed to build map style: {err}");
            std::process::exit(1);
        }
    };
    // The active layer sits beneath the hillshade so relief stays readable.
    let before = style
        .has_layer(playa::HILLSHADE_3DEP)
        .then_some(playa::HILLSHADE_3DEP);
    let map = Arc::new(Mutex::new(style));

    let events = EventBus::new();
    let endpoint = Arc::new(HttpImageryEndpoint::new(config.endpoint_url.clone()));
    let controller = TimeSliderController::new(
        &config,
        endpoint,
        map.clone(),
        Arc::new(events.clone()),
    );
    if let Err(err) = controller.install(before) {
        error!("failed to add the NAIP time series layer: {err}");
        std::process::exit(1);
    }
    if !args.no_prefetch {
        controller.start_prefetch();
    }

    let state = AppState {
        map,
        controller: Arc::new(controller),
        events,
        colorbar: Arc::new(Mutex::new(playa::water_occurrence_colorbar())),
        street_view: StreetViewProvider::select(
            &args.google_maps_api_key,
            &args.mapillary_access_token,
        ),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(args.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {err}", args.addr);
            std::process::exit(1);
        }
    };
    info!("playa server listening on http://{}", args.addr);
    if let Err(err) = axum::serve(listener, app).await {
        error!("server error: {err}");
    }
}
