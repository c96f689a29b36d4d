use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::sync::Arc;

use crate::controller::{HydrantMapController, ViewerSnapshot};
use crate::error::AppResult;
use crate::highlight::HighlightPhase;
use crate::state::AppState;

/// Everything the page chrome needs: spinner, navbar, filter input and the
/// commit button.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ViewerResponse {
    pub loading: bool,
    pub map_visible: bool,
    pub load_error: Option<String>,
    pub hydrant_count: usize,
    pub filter: String,
    pub filter_focused: bool,
    pub phase: HighlightPhase,
    pub match_count: usize,
    pub highlighted_count: usize,
    pub commit_enabled: bool,
    pub commit_label: String,
    pub navigation_open: bool,
}

impl From<&ViewerSnapshot> for ViewerResponse {
    fn from(snapshot: &ViewerSnapshot) -> Self {
        Self {
            loading: snapshot.is_loading(),
            map_visible: snapshot.map_visible(),
            load_error: snapshot.load_error.clone(),
            hydrant_count: snapshot.hydrants.len(),
            filter: snapshot.filter.clone(),
            filter_focused: snapshot.filter_focused,
            phase: snapshot.phase(),
            match_count: snapshot.matches.len(),
            highlighted_count: snapshot.highlighted.len(),
            commit_enabled: snapshot.commit_enabled(),
            commit_label: snapshot.commit_label(),
            navigation_open: snapshot.navigation_open,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub(crate) struct FilterRequest {
    #[serde(default)]
    filter: String,
}

pub(crate) async fn get_viewer(
    State(controller): State<Arc<HydrantMapController>>,
) -> Json<ViewerResponse> {
    Json(ViewerResponse::from(controller.snapshot().as_ref()))
}

pub(crate) async fn update_filter(
    State(controller): State<Arc<HydrantMapController>>,
    Json(payload): Json<FilterRequest>,
) -> Json<ViewerResponse> {
    let snapshot = controller.set_filter(payload.filter);
    Json(ViewerResponse::from(snapshot.as_ref()))
}

pub(crate) async fn commit_highlight(
    State(controller): State<Arc<HydrantMapController>>,
) -> AppResult<Json<ViewerResponse>> {
    let snapshot = controller.commit().await?;
    Ok(Json(ViewerResponse::from(snapshot.as_ref())))
}

pub(crate) async fn toggle_navigation(
    State(controller): State<Arc<HydrantMapController>>,
) -> Json<ViewerResponse> {
    let snapshot = controller.toggle_navigation();
    Json(ViewerResponse::from(snapshot.as_ref()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/viewer", get(get_viewer))
        .route("/highlight/filter", put(update_filter))
        .route("/highlight/commit", post(commit_highlight))
        .route("/navigation/toggle", post(toggle_navigation))
}
