//! Configuration for the viewer's widgets.
//!
//! The widgets themselves live in the browser; these are the options they are
//! constructed with, serialized with the keys the widgets expect.

use serde::Serialize;

use crate::layer::MapEngine;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Square,
    Circle,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub label: String,
    pub color: String,
    pub shape: Shape,
}

impl LegendItem {
    pub fn square(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            shape: Shape::Square,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub items: Vec<LegendItem>,
    pub collapsible: bool,
    pub collapsed: bool,
    pub width: u32,
    pub minzoom: Option<f64>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Colorbar {
    pub label: String,
    pub vmin: f64,
    pub vmax: f64,
    pub color_stops: Vec<ColorStop>,
    pub orientation: Orientation,
    pub bar_length: u32,
    pub bar_thickness: u32,
    pub ticks: Vec<Tick>,
    pub background_color: String,
    pub font_color: String,
    pub font_size: u32,
    pub padding: u32,
    pub border_radius: u32,
    pub position: Position,
    pub visible: bool,
}

/// Keeps a colorbar's visibility in step with the layer it describes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorbarBinding {
    pub layer_id: String,
    pub colorbar: Colorbar,
}

impl ColorbarBinding {
    pub fn new(layer_id: impl Into<String>, colorbar: Colorbar) -> Self {
        Self {
            layer_id: layer_id.into(),
            colorbar,
        }
    }

    /// Shows the colorbar iff the bound layer is visible.
    ///
    /// A missing layer leaves the colorbar as it was. Returns the new state.
    pub fn sync(&mut self, map: &impl MapEngine) -> bool {
        if let Some(visibility) = map.visibility(&self.layer_id) {
            self.colorbar.visible = visibility.is_visible();
        }
        self.colorbar.visible
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreetViewProvider {
    Google,
    Mapillary,
}

impl StreetViewProvider {
    /// Google unless only a Mapillary token is configured.
    pub fn select(google_api_key: &str, mapillary_token: &str) -> Self {
        if google_api_key.is_empty() && !mapillary_token.is_empty() {
            StreetViewProvider::Mapillary
        } else {
            StreetViewProvider::Google
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetViewMarker {
    pub color: &'static str,
    pub show_direction: bool,
    pub direction_color: &'static str,
}

/// Street-level imagery panel. API keys are not part of it; the client
/// supplies its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetViewControl {
    pub title: String,
    pub collapsed: bool,
    pub panel_width: u32,
    pub panel_height: u32,
    pub default_provider: StreetViewProvider,
    pub show_marker: bool,
    pub click_to_view: bool,
    /// Metres around the clicked point to look for imagery.
    pub max_search_radius: u32,
    pub marker_options: StreetViewMarker,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainControl {
    pub exaggeration: f64,
    pub hillshade: bool,
    pub position: Position,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointColorScheme {
    Elevation,
    Intensity,
    Classification,
    Rgb,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopcLoadingMode {
    Full,
    Dynamic,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointCloudOptions {
    pub point_size: u32,
    pub color_scheme: PointColorScheme,
    pub copc_loading_mode: CopcLoadingMode,
}

/// Search and load of USGS 3DEP LiDAR point clouds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsgsLidarControl {
    pub title: String,
    pub collapsed: bool,
    pub max_results: u32,
    pub show_footprints: bool,
    pub auto_zoom_to_results: bool,
    pub lidar_control_options: PointCloudOptions,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerControl {
    pub collapsed: bool,
    pub panel_width: u32,
    pub panel_min_width: u32,
    pub panel_max_width: u32,
    pub basemap_style_url: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchControl {
    pub placeholder: String,
    pub fly_to_zoom: f64,
    pub show_marker: bool,
    pub marker_color: String,
    pub collapsed: bool,
    pub position: Position,
}
