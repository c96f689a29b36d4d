//! Overpass API wire types and the hydrant query.
//!
//! Responses are decoded into these transport types first and mapped into
//! [`crate::hydrant::Hydrant`] entities by the loader in one pass.

use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

pub const MAP_AREA_NAME: &str = "Fredersdorf-Vogelsdorf";
pub const WIKIPEDIA_AREA_NAME: &str = "Fredersdorf-Vogelsdorf";

pub const NODE_ELEMENT_TYPE: &str = "node";

/// Overpass QL selecting every fire hydrant node inside the municipality.
///
/// The area is matched by name and cross-checked against its German
/// Wikipedia tag so that equally named areas elsewhere are not picked up.
pub fn hydrant_query() -> String {
    format!(
        r#"[out:json];
area[name="{MAP_AREA_NAME}"]["wikipedia"="de:{WIKIPEDIA_AREA_NAME}"];
node["emergency"="fire_hydrant"](area);
out;
"#
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// A point feature with guaranteed coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: BTreeMap<String, String>,
}

impl OverpassElement {
    pub fn is_node(&self) -> bool {
        self.element_type == NODE_ELEMENT_TYPE
    }

    /// Converts a node element; `None` for other element kinds or when the
    /// coordinates are missing or not finite.
    pub fn into_node(self) -> Option<OverpassNode> {
        if !self.is_node() {
            return None;
        }
        let (lat, lon) = (self.lat?, self.lon?);
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        Some(OverpassNode {
            id: self.id,
            lat,
            lon,
            tags: self.tags,
        })
    }
}
