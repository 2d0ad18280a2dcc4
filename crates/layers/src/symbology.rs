//! Paint and layout properties, serialized with MapLibre style keys.

use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    #[serde(rename = "visible")]
    Visible,
    #[serde(rename = "none")]
    Hidden,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Layout {
    pub visibility: Visibility,
}

/// A colour literal or a `match` on one feature property.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorExpr {
    Literal(String),
    Match {
        property: String,
        cases: Vec<(String, String)>,
        fallback: String,
    },
}

impl ColorExpr {
    pub fn literal(color: impl Into<String>) -> Self {
        ColorExpr::Literal(color.into())
    }

    /// Resolves the colour for a property value, as the engine would.
    pub fn color_for(&self, value: Option<&str>) -> &str {
        match self {
            ColorExpr::Literal(c) => c,
            ColorExpr::Match {
                cases, fallback, ..
            } => value
                .and_then(|v| cases.iter().find(|(k, _)| k == v))
                .map(|(_, c)| c.as_str())
                .unwrap_or(fallback),
        }
    }
}

impl Serialize for ColorExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColorExpr::Literal(c) => serializer.serialize_str(c),
            ColorExpr::Match {
                property,
                cases,
                fallback,
            } => {
                // ["match", ["get", property], k1, c1, ..., fallback]
                let mut seq = serializer.serialize_seq(Some(3 + cases.len() * 2))?;
                seq.serialize_element("match")?;
                seq.serialize_element(&["get", property.as_str()])?;
                for (k, c) in cases {
                    seq.serialize_element(k)?;
                    seq.serialize_element(c)?;
                }
                seq.serialize_element(fallback)?;
                seq.end()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterPaint {
    #[serde(rename = "raster-opacity")]
    pub opacity: f64,
}

impl Default for RasterPaint {
    fn default() -> Self {
        Self { opacity: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillPaint {
    #[serde(rename = "fill-color")]
    pub color: ColorExpr,
    #[serde(rename = "fill-outline-color", skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
    #[serde(rename = "fill-opacity", skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl FillPaint {
    pub fn new(color: ColorExpr) -> Self {
        Self {
            color,
            outline: None,
            opacity: None,
        }
    }

    /// Transparent fill with a coloured outline, for boundaries.
    pub fn outline_only(outline: impl Into<String>) -> Self {
        Self {
            color: ColorExpr::literal("transparent"),
            outline: Some(outline.into()),
            opacity: None,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Paint {
    Raster(RasterPaint),
    Fill(FillPaint),
}
