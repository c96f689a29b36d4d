use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::controller::HydrantMapController;
use crate::error::{AppError, AppResult};
use crate::routes::viewer::ViewerResponse;
use crate::state::AppState;
use crate::view::{self, HydrantDetails, MapView};

pub(crate) async fn get_map(
    State(controller): State<Arc<HydrantMapController>>,
) -> Json<MapView> {
    let snapshot = controller.snapshot();
    Json(view::map_view(&snapshot.hydrants, &snapshot.highlighted))
}

pub(crate) async fn get_hydrant(
    State(controller): State<Arc<HydrantMapController>>,
    Path(id): Path<i64>,
) -> AppResult<Json<HydrantDetails>> {
    let hydrant = controller
        .snapshot()
        .find(id)
        .ok_or_else(|| AppError::not_found(format!("hydrant {id} not found")))?;
    Ok(Json(HydrantDetails::from(hydrant.as_ref())))
}

pub(crate) async fn reload_hydrants(State(state): State<AppState>) -> Json<ViewerResponse> {
    tracing::info!(url = %state.loader.url(), "reloading hydrants");
    let snapshot = state.controller.reload(&state.loader).await;
    Json(ViewerResponse::from(snapshot.as_ref()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/map", get(get_map))
        .route("/hydrants/reload", post(reload_hydrants))
        .route("/hydrants/{id}", get(get_hydrant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrant::Hydrant;
    use crate::services::hydrants::OverpassLoader;
    use crate::test_support::{node, spawn_overpass_stub, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn read_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn map_lists_markers_with_highlight_classes() {
        let state = test_state();
        state.controller.set_filter("A");
        state.controller.apply_load(Ok(vec![
            Hydrant::from_node(node(1, 52.510, 13.740, &[("ref", "A1")])),
            Hydrant::from_node(node(2, 52.400, 13.900, &[("ref", "B1")])),
        ]));

        let resp = crate::routes::router(state)
            .oneshot(get("/api/map"))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);

        let map = read_json(resp).await;
        assert_eq!(map["zoom"], 15);
        assert_eq!(map["markers"][0]["label"], "A1");
        assert_eq!(
            map["markers"][0]["class_name"],
            "hydrant-tooltip hydrant-tooltip--highlighted"
        );
        assert_eq!(map["markers"][1]["highlighted"], false);
        assert_eq!(map["fit_bounds"]["west"], 13.740);
    }

    #[tokio::test]
    async fn details_return_decoded_fields_or_404() {
        let state = test_state();
        state.controller.apply_load(Ok(vec![Hydrant::from_node(node(
            7,
            52.5,
            13.7,
            &[("ref", "A7"), ("fire_hydrant:diameter", "DN80")],
        ))]));

        let resp = crate::routes::router(state.clone())
            .oneshot(get("/api/hydrants/7"))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        let details = read_json(resp).await;
        assert_eq!(details["title"], "Hydrant");
        assert_eq!(details["reference"], "A7");
        assert_eq!(details["diameter"], "DN80");

        let resp = crate::routes::router(state)
            .oneshot(get("/api/hydrants/8"))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reload_reports_load_errors_in_viewer_state() {
        let stub = spawn_overpass_stub(StatusCode::BAD_GATEWAY, "down").await;
        let mut state = test_state();
        state.loader = Arc::new(OverpassLoader::new(reqwest::Client::new(), stub.url.clone()));

        let resp = crate::routes::router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/hydrants/reload")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);

        let viewer = read_json(resp).await;
        assert_eq!(viewer["load_error"], "HTTP Fehler 502");
        assert_eq!(viewer["loading"], false);
        assert_eq!(viewer["map_visible"], false);
    }
}
