//! Filter and highlight derivations.
//!
//! Everything here is a pure function of the entity set, the filter string
//! and the committed highlight; the controller owns the state and calls in.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::hydrant::Hydrant;

pub const LABEL_RESET: &str = "Hervorhebung zurücksetzen";
pub const LABEL_HIGHLIGHT: &str = "In Karte hervorheben";
pub const LABEL_NO_MATCHES: &str = "Keine Treffer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightPhase {
    Empty,
    Typing,
    Committing,
    Highlighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    fn around(hydrant: &Hydrant) -> Self {
        Self {
            south: hydrant.latitude(),
            west: hydrant.longitude(),
            north: hydrant.latitude(),
            east: hydrant.longitude(),
        }
    }

    fn extend(mut self, hydrant: &Hydrant) -> Self {
        self.south = self.south.min(hydrant.latitude());
        self.north = self.north.max(hydrant.latitude());
        self.west = self.west.min(hydrant.longitude());
        self.east = self.east.max(hydrant.longitude());
        self
    }
}

/// Id-keyed membership for the highlighted subset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet {
    ids: HashSet<i64>,
}

impl HighlightSet {
    pub fn from_hydrants(hydrants: &[Arc<Hydrant>]) -> Self {
        Self {
            ids: hydrants.iter().map(|hydrant| hydrant.id()).collect(),
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }
}

/// Hydrants whose reference starts with the uppercased `filter`.
///
/// Only the filter is folded, so lowercase references never match. An
/// empty filter selects nothing: no filter means no highlighting.
pub fn compute_matches(entities: &[Arc<Hydrant>], filter: &str) -> Vec<Arc<Hydrant>> {
    if filter.is_empty() {
        return Vec::new();
    }
    let needle = filter.to_uppercase();
    entities
        .iter()
        .filter(|hydrant| matches_filter(hydrant, &needle))
        .cloned()
        .collect()
}

fn matches_filter(hydrant: &Hydrant, needle_upper: &str) -> bool {
    hydrant.reference().starts_with(needle_upper)
}

pub fn is_commit_enabled(
    filter: &str,
    matches: &[Arc<Hydrant>],
    highlighted: &[Arc<Hydrant>],
) -> bool {
    // a cleared filter may still commit, to reset an earlier highlight
    (!filter.is_empty() && !matches.is_empty()) || (filter.is_empty() && !highlighted.is_empty())
}

pub fn commit_label(filter: &str, matches: &[Arc<Hydrant>], highlighted: &[Arc<Hydrant>]) -> String {
    if filter.is_empty() && !highlighted.is_empty() {
        return LABEL_RESET.to_string();
    }
    if !matches.is_empty() {
        return format!("{} Treffer in Karte hervorheben", matches.len());
    }
    if filter.is_empty() {
        return LABEL_HIGHLIGHT.to_string();
    }
    LABEL_NO_MATCHES.to_string()
}

/// Smallest box enclosing every highlighted hydrant, `None` when empty.
///
/// West/east track the longitude extremes.
pub fn bounding_box(highlighted: &[Arc<Hydrant>]) -> Option<BoundingBox> {
    let (first, rest) = highlighted.split_first()?;
    Some(
        rest.iter()
            .fold(BoundingBox::around(first), |bounds, hydrant| bounds.extend(hydrant)),
    )
}

/// `highlighted_filter` is the filter string in effect at the last commit
/// (or load), `None` if nothing was ever committed.
pub fn phase(
    filter: &str,
    highlighted_filter: Option<&str>,
    highlighted: &[Arc<Hydrant>],
    committing: bool,
) -> HighlightPhase {
    if committing {
        return HighlightPhase::Committing;
    }
    if filter.is_empty() {
        return HighlightPhase::Empty;
    }
    if highlighted_filter == Some(filter) && !highlighted.is_empty() {
        return HighlightPhase::Highlighted;
    }
    HighlightPhase::Typing
}
