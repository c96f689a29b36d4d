use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::HydrantMapConfig;
use crate::controller::HydrantMapController;
use crate::highlight::BoundingBox;
use crate::hydrant::Hydrant;
use crate::overpass::OverpassNode;
use crate::services::hydrants::OverpassLoader;
use crate::services::settings::SettingsStore;
use crate::state::AppState;

pub fn test_config() -> HydrantMapConfig {
    HydrantMapConfig {
        // discard port; nothing listens there
        overpass_url: "http://127.0.0.1:9/api/interpreter".to_string(),
        settings_path: PathBuf::from("fwfv_hydrants_user_settings.json"),
        static_root: None,
        commit_delay_ms: 0,
        request_timeout_seconds: 5,
    }
}

pub fn test_state() -> AppState {
    let config = test_config();
    let settings = Arc::new(SettingsStore::in_memory());
    let controller = Arc::new(HydrantMapController::new(
        settings,
        config.commit_delay(),
    ));
    let loader = Arc::new(OverpassLoader::new(
        reqwest::Client::new(),
        config.overpass_url.clone(),
    ));
    AppState {
        controller,
        loader,
    }
}

pub fn node(id: i64, lat: f64, lon: f64, tags: &[(&str, &str)]) -> OverpassNode {
    OverpassNode {
        id,
        lat,
        lon,
        tags: tags
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub fn hydrant_at(id: i64, reference: &str, lat: f64, lon: f64) -> Arc<Hydrant> {
    Arc::new(Hydrant::from_node(node(id, lat, lon, &[("ref", reference)])))
}

/// Hydrants with the given references, ids starting at 1, spread along a
/// diagonal so every one has distinct coordinates.
pub fn hydrants(references: &[&str]) -> Vec<Arc<Hydrant>> {
    references
        .iter()
        .enumerate()
        .map(|(idx, reference)| {
            let offset = idx as f64 * 0.01;
            hydrant_at(idx as i64 + 1, reference, 52.5 + offset, 13.7 + offset)
        })
        .collect()
}

pub fn encloses(bounds: &BoundingBox, hydrant: &Hydrant) -> bool {
    (bounds.south..=bounds.north).contains(&hydrant.latitude())
        && (bounds.west..=bounds.east).contains(&hydrant.longitude())
}

/// A local stand-in for the Overpass interpreter endpoint.
pub struct OverpassStub {
    pub url: String,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl OverpassStub {
    pub fn last_body(&self) -> Option<String> {
        self.bodies.lock().expect("stub bodies").last().cloned()
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    response: String,
    bodies: Arc<Mutex<Vec<String>>>,
}

async fn stub_interpreter(State(state): State<StubState>, body: String) -> (StatusCode, String) {
    state.bodies.lock().expect("stub bodies").push(body);
    (state.status, state.response.clone())
}

pub async fn spawn_overpass_stub(status: StatusCode, response: impl Into<String>) -> OverpassStub {
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/interpreter", post(stub_interpreter))
        .with_state(StubState {
            status,
            response: response.into(),
            bodies: bodies.clone(),
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind overpass stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    OverpassStub {
        url: format!("http://{addr}/api/interpreter"),
        bodies,
    }
}
