use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

use crate::controller::{HydrantMapController, ViewerSnapshot};
use crate::state::AppState;

/// Liveness plus a hint about the hydrant data. The process is healthy even
/// when Overpass is not, so this always answers 200.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub data: DataStatus,
    pub hydrants: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    Loading,
    Ready,
    LoadFailed,
}

impl DataStatus {
    fn of(snapshot: &ViewerSnapshot) -> Self {
        if snapshot.load_in_flight {
            Self::Loading
        } else if snapshot.load_error.is_some() {
            Self::LoadFailed
        } else {
            Self::Ready
        }
    }
}

pub(crate) async fn healthz(
    State(controller): State<Arc<HydrantMapController>>,
) -> Json<HealthResponse> {
    let snapshot = controller.snapshot();
    Json(HealthResponse {
        status: "ok".to_string(),
        data: DataStatus::of(&snapshot),
        hydrants: snapshot.hydrants.len(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}
