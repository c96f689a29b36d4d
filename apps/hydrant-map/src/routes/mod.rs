pub mod health;
pub mod hydrants;
pub mod viewer;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest(
            "/api",
            Router::new()
                .merge(viewer::router())
                .merge(hydrants::router()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthz_reports_ok() {
        let resp = router(crate::test_support::test_state())
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body");
        let health: health::HealthResponse = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(health.status, "ok");
        assert_eq!(health.data, health::DataStatus::Loading);
    }

    #[tokio::test]
    async fn unknown_api_route_is_not_found() {
        let resp = router(crate::test_support::test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/unknown")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
