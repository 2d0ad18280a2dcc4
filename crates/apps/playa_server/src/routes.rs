use std::sync::Arc;

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use imagery::{SharedMap, TimeSliderController};
use layers::{
    playa, ColorbarBinding, MapEngine, MapStyle, RenderedFeatures, StreetViewProvider, Visibility,
};
use parking_lot::Mutex;
use runtime::EventBus;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub map: SharedMap<MapStyle>,
    pub controller: Arc<TimeSliderController<MapStyle>>,
    pub events: EventBus,
    pub colorbar: Arc<Mutex<ColorbarBinding>>,
    pub street_view: StreetViewProvider,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/style.json", get(get_style))
        .route("/controls.json", get(get_controls))
        .route("/naip/years", get(get_years))
        .route("/naip/cache", get(get_cache))
        .route("/naip/active/:index", post(set_active))
        .route("/naip/pin/:index", post(pin_year))
        .route("/layers/:id/visibility", post(set_visibility))
        .route("/pick/click", post(pick_click))
        .route("/pick/hover", post(pick_hover))
        .route("/alerts", get(get_alerts))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PinBody {
    label: Option<String>,
    before_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VisibilityBody {
    visible: Option<bool>,
}

/// Parses an optional JSON body; an empty body yields the default.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        warn!("malformed request body: {err}");
        (StatusCode::BAD_REQUEST, format!("invalid JSON body: {err}")).into_response()
    })
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_style(State(state): State<AppState>) -> Response {
    Json(state.map.lock().to_style_json()).into_response()
}

async fn get_controls(State(state): State<AppState>) -> Response {
    let (colorbar, basemap) = {
        let map = state.map.lock();
        let mut binding = state.colorbar.lock();
        binding.sync(&*map);
        let basemap = map
            .base_style()
            .unwrap_or(playa::BASE_MAP_STYLE)
            .to_string();
        (binding.clone(), basemap)
    };
    Json(json!({
        "legends": playa::legends(),
        "colorbar": colorbar,
        "bounds": playa::boundary_bounds().to_array(),
        "terrain": playa::terrain_control(),
        "layerControl": playa::layer_control(&basemap),
        "usgsLidar": playa::usgs_lidar_control(),
        "search": playa::search_control(),
        "streetView": playa::street_view_control(state.street_view),
        "slider": {
            "labels": state.controller.labels(),
            "activeLayer": state.controller.active_layer_id(),
        },
    }))
    .into_response()
}

async fn get_years(State(state): State<AppState>) -> Response {
    let range = state.controller.range();
    Json(json!({
        "start": range.start,
        "end": range.end,
        "labels": range.labels(),
    }))
    .into_response()
}

async fn get_cache(State(state): State<AppState>) -> Response {
    Json(state.controller.resolver().cache().snapshot()).into_response()
}

async fn set_active(State(state): State<AppState>, AxumPath(index): AxumPath<usize>) -> Response {
    Json(state.controller.on_change(index).await).into_response()
}

async fn pin_year(
    State(state): State<AppState>,
    AxumPath(index): AxumPath<usize>,
    body: Bytes,
) -> Response {
    let body: PinBody = match parse_body(&body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };
    let outcome = state
        .controller
        .on_add_layer(index, body.label.as_deref(), body.before_id.as_deref())
        .await;
    Json(outcome).into_response()
}

async fn set_visibility(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    body: Bytes,
) -> Response {
    let body: VisibilityBody = match parse_body(&body) {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    let mut map = state.map.lock();
    let Some(current) = map.visibility(&id) else {
        return (StatusCode::NOT_FOUND, format!("no such layer: {id}")).into_response();
    };
    let visible = body.visible.unwrap_or(!current.is_visible());
    let visibility = if visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };
    if let Err(err) = map.set_visibility(&id, visibility) {
        return (StatusCode::NOT_FOUND, err.to_string()).into_response();
    }
    let colorbar_visible = state.colorbar.lock().sync(&*map);

    Json(json!({
        "layer": id,
        "visibility": visibility,
        "colorbarVisible": colorbar_visible,
    }))
    .into_response()
}

async fn pick_click(body: Bytes) -> Response {
    let hits: RenderedFeatures = match parse_body(&body) {
        Ok(hits) => hits,
        Err(resp) => return resp,
    };
    Json(json!({ "html": playa::click_popup(&hits) })).into_response()
}

async fn pick_hover(body: Bytes) -> Response {
    let hits: RenderedFeatures = match parse_body(&body) {
        Ok(hits) => hits,
        Err(resp) => return resp,
    };
    Json(json!({ "cursor": playa::hover_cursor(&hits) })).into_response()
}

/// Hands pending alerts to the client; each alert is returned once.
async fn get_alerts(State(state): State<AppState>) -> Response {
    Json(state.events.take_alerts()).into_response()
}

async fn get_metrics(State(state): State<AppState>) -> Response {
    Json(state.controller.resolver().metrics().snapshot()).into_response()
}
