use crate::controller::HydrantMapController;
use crate::services::hydrants::OverpassLoader;
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<HydrantMapController>,
    pub loader: Arc<OverpassLoader>,
}

impl FromRef<AppState> for Arc<HydrantMapController> {
    fn from_ref(state: &AppState) -> Arc<HydrantMapController> {
        state.controller.clone()
    }
}
