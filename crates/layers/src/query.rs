//! Click and hover resolution over features hit at a screen point.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type FeatureProperties = Map<String, Value>;

pub const POPUP_SEPARATOR: &str = r#"<hr style="margin:6px 0"/>"#;

/// Features under the pointer, grouped by the layer that rendered them.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderedFeatures {
    by_layer: BTreeMap<String, Vec<FeatureProperties>>,
}

impl RenderedFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layer_id: impl Into<String>, properties: FeatureProperties) {
        self.by_layer
            .entry(layer_id.into())
            .or_default()
            .push(properties);
    }

    /// Topmost feature of a layer.
    pub fn first(&self, layer_id: &str) -> Option<&FeatureProperties> {
        self.by_layer.get(layer_id)?.first()
    }

    pub fn has_hit(&self, layer_id: &str) -> bool {
        self.first(layer_id).is_some()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Cursor {
    #[serde(rename = "pointer")]
    Pointer,
    #[serde(rename = "")]
    Default,
}

/// Which layers answer clicks, and in what order.
///
/// Every primary layer with a hit contributes a popup section. Fallback layers
/// are consulted only when no primary layer was hit, and the first one with a
/// hit wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickPolicy {
    pub primary: Vec<String>,
    pub fallback: Vec<String>,
}

impl PickPolicy {
    pub fn pickable(&self) -> impl Iterator<Item = &str> {
        self.primary
            .iter()
            .chain(self.fallback.iter())
            .map(String::as_str)
    }

    pub fn popup_sections<F>(&self, hits: &RenderedFeatures, format: F) -> Vec<String>
    where
        F: Fn(&str, &FeatureProperties) -> String,
    {
        let mut sections: Vec<String> = self
            .primary
            .iter()
            .filter_map(|id| hits.first(id).map(|props| format(id.as_str(), props)))
            .collect();

        if sections.is_empty() {
            if let Some((id, props)) = self
                .fallback
                .iter()
                .find_map(|id| hits.first(id).map(|props| (id.as_str(), props)))
            {
                sections.push(format(id, props));
            }
        }
        sections
    }

    pub fn popup_html<F>(&self, hits: &RenderedFeatures, format: F) -> Option<String>
    where
        F: Fn(&str, &FeatureProperties) -> String,
    {
        let sections = self.popup_sections(hits, format);
        if sections.is_empty() {
            return None;
        }
        Some(sections.join(POPUP_SEPARATOR))
    }

    pub fn cursor(&self, hits: &RenderedFeatures) -> Cursor {
        if self.pickable().any(|id| hits.has_hit(id)) {
            Cursor::Pointer
        } else {
            Cursor::Default
        }
    }
}

/// Numeric property to a fixed number of decimals with a unit suffix.
///
/// Missing, zero, empty and non-numeric values render as `N/A`.
pub fn fixed(props: &FeatureProperties, key: &str, decimals: usize, unit: &str) -> String {
    let Some(v) = number(props, key) else {
        return "N/A".to_string();
    };
    if unit.is_empty() {
        format!("{v:.decimals$}")
    } else {
        format!("{v:.decimals$} {unit}")
    }
}

/// Text property, HTML-escaped; missing or empty values render as `N/A`.
pub fn text(props: &FeatureProperties, key: &str) -> String {
    match props.get(key) {
        Some(Value::String(s)) if !s.is_empty() => escape_html(s),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => "N/A".to_string(),
    }
}

fn number(props: &FeatureProperties, key: &str) -> Option<f64> {
    let v = match props.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (v != 0.0 && v.is_finite()).then_some(v)
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
