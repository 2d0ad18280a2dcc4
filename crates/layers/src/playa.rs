//! The playa wetlands map: data layers, picking rules and widget setup.

use foundation::LngLatBounds;
use serde_json::{Value, json};

use crate::controls::{
    ColorStop, Colorbar, ColorbarBinding, CopcLoadingMode, LayerControl, Legend, LegendItem,
    Orientation, PointCloudOptions, PointColorScheme, Position, SearchControl, StreetViewControl,
    StreetViewMarker, StreetViewProvider, TerrainControl, Tick, UsgsLidarControl,
};
use crate::layer::{LayerSpec, MapEngine, MapError};
use crate::query::{Cursor, FeatureProperties, PickPolicy, RenderedFeatures, fixed, text};
use crate::raster::RasterSource;
use crate::style::MapStyle;
use crate::symbology::{ColorExpr, FillPaint};
use crate::vector::{GeoJsonSource, VectorSource};

pub const BASE_MAP_STYLE: &str = "https://basemaps.cartocdn.com/gl/positron-gl-style/style.json";

/// Detail layers only draw from this zoom on.
pub const DETAIL_MINZOOM: f64 = 8.0;

pub const GOOGLE_SATELLITE: &str = "Google Satellite";
pub const NAIP_FALSE_COLOR: &str = "NAIP False Color";
pub const HILLSHADE_3DEP: &str = "3DEP Hillshade";
pub const JRC_WATER_OCCURRENCE: &str = "JRC Water Occurrence";
pub const PLAYA_BOUNDARY: &str = "Playa Boundary";
pub const WBDHU8_BOUNDARY: &str = "WBDHU8 Boundary";
pub const DEPRESSIONS_10M: &str = "Depressions 10m";
pub const NWI_WETLANDS: &str = "NWI Wetlands";

const NAIP_FALSE_COLOR_WMS: &str = "https://imagery.nationalmap.gov/arcgis/services/USGSNAIPImagery/ImageServer/WMSServer?service=WMS&request=GetMap&layers=USGSNAIPImagery:FalseColorComposite&styles=&format=image/png&transparent=true&version=1.3.0&crs=EPSG:3857&width=256&height=256&bbox={bbox-epsg-3857}";
const HILLSHADE_3DEP_WMS: &str = "https://elevation.nationalmap.gov/arcgis/services/3DEPElevation/ImageServer/WMSServer?service=WMS&request=GetMap&layers=3DEPElevation:Hillshade Multidirectional&styles=&format=image/png&transparent=true&version=1.3.0&crs=EPSG:3857&width=256&height=256&bbox={bbox-epsg-3857}";

/// Outline of the Playa Lakes Joint Venture region.
const PLJV_RING: [[f64; 2]; 16] = [
    [-106.38806, 43.287453],
    [-105.816892, 36.943581],
    [-103.97158, 31.271802],
    [-101.511165, 30.214278],
    [-99.006814, 29.833794],
    [-97.864478, 30.555461],
    [-97.029695, 32.503102],
    [-96.634271, 35.20327],
    [-96.414591, 37.224041],
    [-96.107039, 40.072029],
    [-96.107039, 41.634177],
    [-96.722143, 42.966724],
    [-98.479582, 43.606499],
    [-101.115741, 44.271017],
    [-104.059452, 44.018743],
    [-106.38806, 43.287453],
];

const NWI_CLASSES: [(&str, &str, &str); 7] = [
    ("Freshwater Forested/Shrub Wetland", "Freshwater Forested/Shrub", "rgb(0, 136, 55)"),
    ("Freshwater Emergent Wetland", "Freshwater Emergent", "rgb(127, 195, 28)"),
    ("Freshwater Pond", "Freshwater Pond", "rgb(104, 140, 192)"),
    ("Estuarine and Marine Wetland", "Estuarine & Marine Wetland", "rgb(102, 194, 165)"),
    ("Riverine", "Riverine", "rgb(1, 144, 191)"),
    ("Lake", "Lake", "rgb(19, 0, 124)"),
    ("Estuarine and Marine Deepwater", "Estuarine & Marine Deep", "rgb(0, 124, 136)"),
];
const NWI_OTHER: &str = "rgb(178, 134, 86)";
const DEPRESSION_COLOR: &str = "#ff7043";

pub fn boundary() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "Polygon", "coordinates": [PLJV_RING] }
        }]
    })
}

/// Extent the map fits to on load.
pub fn boundary_bounds() -> LngLatBounds {
    LngLatBounds::from_ring(&PLJV_RING)
}

pub fn nwi_colors() -> ColorExpr {
    ColorExpr::Match {
        property: "WETLAND_TYPE".to_string(),
        cases: NWI_CLASSES
            .iter()
            .map(|(value, _, color)| (value.to_string(), color.to_string()))
            .collect(),
        fallback: NWI_OTHER.to_string(),
    }
}

/// Registers every data layer, bottom to top.
pub fn build_style(base_style: &str) -> Result<MapStyle, MapError> {
    let mut map = MapStyle::with_base_style(base_style);

    map.add_source(
        "google-satellite",
        RasterSource::from_template("https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}")
            .with_attribution("&copy; Google")
            .into(),
    )?;
    map.add_layer(
        LayerSpec::raster(GOOGLE_SATELLITE, "google-satellite").with_minzoom(DETAIL_MINZOOM),
        None,
    )?;

    map.add_source(
        "naip-false-color",
        RasterSource::from_template(NAIP_FALSE_COLOR_WMS)
            .with_attribution("&copy; USGS NAIP")
            .into(),
    )?;
    map.add_layer(
        LayerSpec::raster(NAIP_FALSE_COLOR, "naip-false-color").hidden(),
        None,
    )?;

    map.add_source(
        "3dep-hillshade",
        RasterSource::from_template(HILLSHADE_3DEP_WMS)
            .with_attribution("&copy; USGS 3DEP")
            .into(),
    )?;
    map.add_layer(
        LayerSpec::raster(HILLSHADE_3DEP, "3dep-hillshade").with_minzoom(11.0),
        None,
    )?;

    map.add_source(
        "gsw-occurrence",
        RasterSource::from_template(
            "https://storage.googleapis.com/global-surface-water/tiles2021/occurrence/{z}/{x}/{y}.png",
        )
        .with_attribution("&copy; EC JRC/Google")
        .into(),
    )?;
    map.add_layer(
        LayerSpec::raster(JRC_WATER_OCCURRENCE, "gsw-occurrence").hidden(),
        None,
    )?;

    map.add_source("pljv-boundaries", GeoJsonSource { data: boundary() }.into())?;
    map.add_layer(
        LayerSpec::fill(
            PLAYA_BOUNDARY,
            "pljv-boundaries",
            FillPaint::outline_only("#000000"),
        )
        .hidden(),
        None,
    )?;

    map.add_source(
        "wbdhu8",
        VectorSource::pmtiles("https://data.source.coop/giswqs/playa/WBDHU8.pmtiles").into(),
    )?;
    map.add_layer(
        LayerSpec::fill(WBDHU8_BOUNDARY, "wbdhu8", FillPaint::outline_only("#3388ff"))
            .with_source_layer("wbdhu8_5070__wbdhu8__wbd_national_gpkg__wbdhu8"),
        None,
    )?;

    map.add_source(
        "depressions-10m",
        VectorSource::pmtiles("https://data.source.coop/giswqs/playa/depressions_10m.pmtiles")
            .into(),
    )?;
    map.add_layer(
        LayerSpec::fill(
            DEPRESSIONS_10M,
            "depressions-10m",
            FillPaint::new(ColorExpr::literal(DEPRESSION_COLOR)).with_opacity(0.5),
        )
        .with_source_layer("merged_layer")
        .with_minzoom(DETAIL_MINZOOM),
        None,
    )?;

    map.add_source(
        "nwi",
        VectorSource::pmtiles("https://data.source.coop/giswqs/playa/nwi.pmtiles").into(),
    )?;
    map.add_layer(
        LayerSpec::fill(
            NWI_WETLANDS,
            "nwi",
            FillPaint::new(nwi_colors()).with_opacity(0.5),
        )
        .with_source_layer("playa_nwi__conus_wetlands__conus_wet_poly")
        .with_minzoom(DETAIL_MINZOOM),
        None,
    )?;

    Ok(map)
}

/// Depressions and NWI answer clicks first; watersheds only as a fallback.
pub fn pick_policy() -> PickPolicy {
    PickPolicy {
        primary: vec![DEPRESSIONS_10M.to_string(), NWI_WETLANDS.to_string()],
        fallback: vec![WBDHU8_BOUNDARY.to_string()],
    }
}

pub fn popup_html(layer_id: &str, props: &FeatureProperties) -> String {
    match layer_id {
        DEPRESSIONS_10M => [
            "<strong>Depression</strong>".to_string(),
            format!("Area: {}", fixed(props, "area", 1, "m²")),
            format!("Volume: {}", fixed(props, "volume", 1, "m³")),
            format!("Avg Depth: {}", fixed(props, "avg-depth", 2, "m")),
            format!("Max Depth: {}", fixed(props, "max-depth", 2, "m")),
            format!("Perimeter: {}", fixed(props, "perimeter", 1, "m")),
        ]
        .join("<br/>"),
        NWI_WETLANDS => [
            "<strong>NWI Wetland</strong>".to_string(),
            format!("Type: {}", text(props, "WETLAND_TYPE")),
            format!("Attribute: {}", text(props, "ATTRIBUTE")),
            format!("Acres: {}", fixed(props, "ACRES", 2, "")),
        ]
        .join("<br/>"),
        WBDHU8_BOUNDARY => [
            format!("<strong>{}</strong>", text(props, "name")),
            format!("HUC8: {}", text(props, "huc8")),
            format!("States: {}", text(props, "states")),
            format!("Area: {}", fixed(props, "areasqkm", 1, "km²")),
        ]
        .join("<br/>"),
        _ => String::new(),
    }
}

pub fn click_popup(hits: &RenderedFeatures) -> Option<String> {
    pick_policy().popup_html(hits, popup_html)
}

pub fn hover_cursor(hits: &RenderedFeatures) -> Cursor {
    pick_policy().cursor(hits)
}

pub fn legends() -> Vec<Legend> {
    let mut nwi_items: Vec<LegendItem> = NWI_CLASSES
        .iter()
        .map(|(_, label, color)| LegendItem::square(*label, *color))
        .collect();
    nwi_items.push(LegendItem::square("Other", NWI_OTHER));

    vec![
        Legend {
            title: "NWI Wetland Types".to_string(),
            items: nwi_items,
            collapsible: true,
            collapsed: false,
            width: 220,
            minzoom: Some(DETAIL_MINZOOM),
            position: Position::BottomLeft,
        },
        Legend {
            title: "Surface Depressions".to_string(),
            items: vec![LegendItem::square("Depression (10-m)", DEPRESSION_COLOR)],
            collapsible: true,
            collapsed: false,
            width: 220,
            minzoom: Some(DETAIL_MINZOOM),
            position: Position::BottomLeft,
        },
    ]
}

/// Colorbar for the JRC layer, hidden until that layer is shown.
pub fn water_occurrence_colorbar() -> ColorbarBinding {
    let stops = [
        (0.0, "#ffffff"),
        (0.25, "#e0a0e0"),
        (0.5, "#c040c0"),
        (0.75, "#8000bf"),
        (1.0, "#0000ff"),
    ];
    ColorbarBinding::new(
        JRC_WATER_OCCURRENCE,
        Colorbar {
            label: "Water Occurrence (1984 – 2021)".to_string(),
            vmin: 0.0,
            vmax: 100.0,
            color_stops: stops
                .iter()
                .map(|(position, color)| ColorStop {
                    position: *position,
                    color: color.to_string(),
                })
                .collect(),
            orientation: Orientation::Horizontal,
            bar_length: 250,
            bar_thickness: 18,
            ticks: vec![
                Tick {
                    value: 0.0,
                    label: "> 0 %\nsometimes water".to_string(),
                },
                Tick {
                    value: 100.0,
                    label: "100 %\nalways water".to_string(),
                },
            ],
            background_color: "#555555".to_string(),
            font_color: "#ffffff".to_string(),
            font_size: 12,
            padding: 12,
            border_radius: 4,
            position: Position::BottomRight,
            visible: false,
        },
    )
}

pub fn terrain_control() -> TerrainControl {
    TerrainControl {
        exaggeration: 1.0,
        hillshade: true,
        position: Position::TopRight,
    }
}

pub fn layer_control(basemap_style_url: &str) -> LayerControl {
    LayerControl {
        collapsed: true,
        panel_width: 350,
        panel_min_width: 240,
        panel_max_width: 450,
        basemap_style_url: basemap_style_url.to_string(),
        position: Position::TopRight,
    }
}

pub fn usgs_lidar_control() -> UsgsLidarControl {
    UsgsLidarControl {
        title: "USGS 3DEP LiDAR".to_string(),
        collapsed: true,
        max_results: 2500,
        show_footprints: true,
        auto_zoom_to_results: true,
        lidar_control_options: PointCloudOptions {
            point_size: 2,
            color_scheme: PointColorScheme::Elevation,
            copc_loading_mode: CopcLoadingMode::Dynamic,
        },
        position: Position::TopRight,
    }
}

pub fn search_control() -> SearchControl {
    SearchControl {
        placeholder: "Search for a place...".to_string(),
        fly_to_zoom: 14.0,
        show_marker: true,
        marker_color: "#e74c3c".to_string(),
        collapsed: true,
        position: Position::TopLeft,
    }
}

pub fn street_view_control(provider: StreetViewProvider) -> StreetViewControl {
    StreetViewControl {
        title: "Street View".to_string(),
        collapsed: true,
        panel_width: 450,
        panel_height: 350,
        default_provider: provider,
        show_marker: true,
        click_to_view: true,
        max_search_radius: 200,
        marker_options: StreetViewMarker {
            color: "#ff5722",
            show_direction: false,
            direction_color: "#1976d2",
        },
        position: Position::TopLeft,
    }
}
