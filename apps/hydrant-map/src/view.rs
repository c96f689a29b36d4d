//! Map and dialog view models derived from the controller state.

use serde::Serialize;
use std::sync::Arc;

use crate::highlight::{self, BoundingBox, HighlightSet};
use crate::hydrant::Hydrant;

pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 52.520262523297994,
    lon: 13.75383048808331,
};
pub const DEFAULT_ZOOM: u8 = 15;

pub const TILE_URL: &str = "https://tile.openstreetmap.de/{z}/{x}/{y}.png";
pub const TILE_MIN_ZOOM: u8 = 12;
pub const TILE_MAX_ZOOM: u8 = 20;
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

const TOOLTIP_CLASS: &str = "hydrant-tooltip";
const TOOLTIP_CLASS_HIGHLIGHTED: &str = "hydrant-tooltip--highlighted";
const TOOLTIP_CLASS_DEFAULT: &str = "hydrant-tooltip--default";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileLayer {
    pub url: &'static str,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub attribution: &'static str,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url: TILE_URL,
            min_zoom: TILE_MIN_ZOOM,
            max_zoom: TILE_MAX_ZOOM,
            attribution: TILE_ATTRIBUTION,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub highlighted: bool,
    pub class_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub tile_layer: TileLayer,
    pub markers: Vec<Marker>,
    /// Viewport to fit; absent when nothing is highlighted.
    pub fit_bounds: Option<BoundingBox>,
}

pub fn map_view(hydrants: &[Arc<Hydrant>], highlighted: &[Arc<Hydrant>]) -> MapView {
    let highlight_set = HighlightSet::from_hydrants(highlighted);
    MapView {
        center: DEFAULT_CENTER,
        zoom: DEFAULT_ZOOM,
        tile_layer: TileLayer::default(),
        markers: hydrants
            .iter()
            .map(|hydrant| marker(hydrant, &highlight_set))
            .collect(),
        fit_bounds: highlight::bounding_box(highlighted),
    }
}

fn marker(hydrant: &Hydrant, highlight_set: &HighlightSet) -> Marker {
    let highlighted = highlight_set.contains(hydrant.id());
    let state_class = if highlighted {
        TOOLTIP_CLASS_HIGHLIGHTED
    } else {
        TOOLTIP_CLASS_DEFAULT
    };
    Marker {
        id: hydrant.id(),
        latitude: hydrant.latitude(),
        longitude: hydrant.longitude(),
        label: hydrant.reference().to_string(),
        highlighted,
        class_name: format!("{TOOLTIP_CLASS} {state_class}"),
    }
}

/// Everything the hydrant detail dialog shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydrantDetails {
    pub id: i64,
    pub title: String,
    pub reference: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: String,
    pub description: String,
    pub diameter: String,
    pub coupling_type: String,
    pub couplings: String,
    pub operator: String,
    pub water_source: String,
    pub survey_date: String,
}

impl From<&Hydrant> for HydrantDetails {
    fn from(hydrant: &Hydrant) -> Self {
        Self {
            id: hydrant.id(),
            title: hydrant.title(),
            reference: hydrant.reference().to_string(),
            latitude: hydrant.latitude(),
            longitude: hydrant.longitude(),
            kind: hydrant.kind(),
            position: hydrant.position(),
            description: hydrant.description(),
            diameter: hydrant.diameter(),
            coupling_type: hydrant.coupling_type(),
            couplings: hydrant.couplings(),
            operator: hydrant.operator(),
            water_source: hydrant.water_source(),
            survey_date: hydrant.survey_date(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encloses, hydrants, node};

    #[test]
    fn markers_carry_label_and_highlight_class() {
        let all = hydrants(&["A1", "A2", "B1"]);
        let highlighted = vec![all[0].clone(), all[1].clone()];

        let view = map_view(&all, &highlighted);
        assert_eq!(view.markers.len(), 3);
        assert_eq!(view.markers[0].label, "A1");
        assert!(view.markers[0].highlighted);
        assert_eq!(
            view.markers[0].class_name,
            "hydrant-tooltip hydrant-tooltip--highlighted"
        );
        assert!(!view.markers[2].highlighted);
        assert_eq!(
            view.markers[2].class_name,
            "hydrant-tooltip hydrant-tooltip--default"
        );

        let bounds = view.fit_bounds.expect("bounds");
        assert!(encloses(&bounds, &all[0]));
        assert!(encloses(&bounds, &all[1]));
        assert!(!encloses(&bounds, &all[2]));
    }

    #[test]
    fn nothing_highlighted_leaves_viewport_alone() {
        let all = hydrants(&["A1"]);
        let view = map_view(&all, &[]);
        assert!(view.fit_bounds.is_none());
        assert_eq!(view.center, DEFAULT_CENTER);
        assert_eq!(view.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn details_serialize_every_decoded_field() {
        let hydrant = Hydrant::from_node(node(
            5,
            52.5,
            13.7,
            &[
                ("ref", "C5"),
                ("fire_hydrant:type", "pillar"),
                ("fire_hydrant:diameter", "100"),
                ("water_source", "main"),
                ("survey:date", "2024-05-17"),
            ],
        ));
        let details = HydrantDetails::from(&hydrant);
        assert_eq!(details.title, "Überflurhydrant");

        let json = serde_json::to_value(&details).expect("json");
        assert_eq!(json["type"], "Überflurhydrant");
        assert_eq!(json["diameter"], "100 mm");
        assert_eq!(json["water_source"], "Trinkwassernetz");
        assert_eq!(json["survey_date"], "17.05.2024");
        assert_eq!(json["operator"], "-");
    }
}
