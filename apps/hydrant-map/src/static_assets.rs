//! Serves the map front-end build, or a placeholder page when none is set.
//!
//! The build puts content-hashed bundles (`main-3KD2PQ7A.js`,
//! `styles.9f2c1e4b7a.css`) next to `index.html` and copies the Leaflet
//! marker images unhashed into `assets/`. Map tiles come straight from the
//! tile server and never pass through here.

use anyhow::Result;
use axum::extract::Request;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::middleware::{from_fn, Next};
use axum::response::{Html, Response};
use axum::Router;
use std::path::PathBuf;
use tower_http::services::ServeDir;

const PLACEHOLDER_INDEX: &str = r#"<!doctype html>
<html lang="de">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Hydrantenkarte</title>
  </head>
  <body style="font-family: system-ui; padding: 24px">
    <h1>Hydrantenkarte</h1>
    <p>Kein Frontend konfiguriert. Starte mit <code>--static-root</code>, um die Karte auszuliefern.</p>
    <p>Die API steht unter <code>/api/viewer</code> und <code>/api/map</code> bereit.</p>
  </body>
</html>
"#;

const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";
const CACHE_MARKER_IMAGES: &str = "public, max-age=604800";
const CACHE_SHORT: &str = "public, max-age=3600";
const CACHE_NONE: &str = "no-store";

const MIN_HASH_LEN: usize = 8;

fn cache_policy(path: &str, content_type: &str) -> &'static str {
    if content_type.starts_with("text/html") {
        CACHE_NONE
    } else if is_hashed_bundle(path) {
        CACHE_IMMUTABLE
    } else if path.starts_with("/assets/") {
        CACHE_MARKER_IMAGES
    } else {
        CACHE_SHORT
    }
}

/// `name-HASH.js` or `name.HASH.css` with an alphanumeric hash that
/// contains at least one digit.
fn is_hashed_bundle(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    let Some(stem) = file
        .strip_suffix(".js")
        .or_else(|| file.strip_suffix(".css"))
    else {
        return false;
    };
    let Some((_, hash)) = stem.rsplit_once(['-', '.']) else {
        return false;
    };
    hash.len() >= MIN_HASH_LEN
        && hash.bytes().all(|b| b.is_ascii_alphanumeric())
        && hash.bytes().any(|b| b.is_ascii_digit())
}

async fn set_cache_control(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let mut response = next.run(req).await;
    if !response.status().is_success() || response.headers().contains_key(CACHE_CONTROL) {
        return response;
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let policy = cache_policy(&path, content_type);
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(policy));
    response
}

async fn placeholder_index() -> Html<&'static str> {
    Html(PLACEHOLDER_INDEX)
}

pub fn service(static_root: Option<PathBuf>) -> Result<Router> {
    let Some(root) = static_root else {
        return Ok(Router::new().fallback(placeholder_index));
    };
    if !root.is_dir() {
        anyhow::bail!("static root {} is not a directory", root.display());
    }
    // single-page map without client routes: unknown paths stay 404
    let files = ServeDir::new(root).append_index_html_on_directories(true);
    Ok(Router::new()
        .fallback_service(files)
        .layer(from_fn(set_cache_control)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn get(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[test]
    fn hashed_bundles_are_recognised() {
        assert!(is_hashed_bundle("/main-3KD2PQ7A.js"));
        assert!(is_hashed_bundle("/styles.9f2c1e4b7a6d3e2f.css"));
        assert!(!is_hashed_bundle("/assets/leaflet/marker-icon.png"));
        assert!(!is_hashed_bundle("/leaflet-src.js"));
        assert!(!is_hashed_bundle("/main-ABCDEFGH.js"));
        assert!(!is_hashed_bundle("/main.js"));
    }

    #[test]
    fn cache_policy_by_asset_kind() {
        assert_eq!(cache_policy("/", "text/html"), CACHE_NONE);
        assert_eq!(cache_policy("/main-3KD2PQ7A.js", "text/javascript"), CACHE_IMMUTABLE);
        assert_eq!(
            cache_policy("/assets/leaflet/marker-icon-2x.png", "image/png"),
            CACHE_MARKER_IMAGES
        );
        assert_eq!(cache_policy("/favicon.ico", "image/x-icon"), CACHE_SHORT);
    }

    #[test]
    fn static_root_must_be_a_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(service(Some(dir.path().join("missing"))).is_err());

        let file = dir.path().join("index.html");
        std::fs::write(&file, "<html></html>").expect("file");
        assert!(service(Some(file)).is_err());
    }

    #[tokio::test]
    async fn placeholder_served_without_static_root() {
        let resp = service(None)
            .expect("service")
            .oneshot(get("/anything"))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body");
        assert!(String::from_utf8_lossy(&bytes).contains("Hydrantenkarte"));
    }

    #[tokio::test]
    async fn build_output_gets_per_kind_cache_headers() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<html>karte</html>").expect("index");
        std::fs::write(dir.path().join("main-3KD2PQ7A.js"), "console.log(1)").expect("bundle");
        std::fs::create_dir_all(dir.path().join("assets/leaflet")).expect("assets dir");
        std::fs::write(dir.path().join("assets/leaflet/marker-icon.png"), [0x89, b'P']).expect("icon");
        let app = service(Some(dir.path().to_path_buf())).expect("service");

        let resp = app.clone().oneshot(get("/")).await.expect("index");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CACHE_CONTROL], CACHE_NONE);

        let resp = app.clone().oneshot(get("/main-3KD2PQ7A.js")).await.expect("bundle");
        assert_eq!(resp.headers()[CACHE_CONTROL], CACHE_IMMUTABLE);

        let resp = app
            .clone()
            .oneshot(get("/assets/leaflet/marker-icon.png"))
            .await
            .expect("icon");
        assert_eq!(resp.headers()[CACHE_CONTROL], CACHE_MARKER_IMAGES);

        let resp = app.oneshot(get("/hydrant/42")).await.expect("missing");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().get(CACHE_CONTROL).is_none());
    }
}
