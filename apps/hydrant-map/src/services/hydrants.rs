use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::error::LoadError;
use crate::hydrant::Hydrant;
use crate::overpass::{self, OverpassResponse};

/// Loads the hydrants of the configured municipality from Overpass.
///
/// One request per call; no retry, paging or caching.
#[derive(Debug, Clone)]
pub struct OverpassLoader {
    http: Client,
    url: String,
}

impl OverpassLoader {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn load(&self) -> Result<Vec<Hydrant>, LoadError> {
        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain;charset=UTF-8")
            .body(overpass::hydrant_query())
            .send()
            .await
            .map_err(LoadError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, url = %self.url, "overpass returned non-success");
            return Err(LoadError::Transport {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(LoadError::Unreachable)?;
        let payload: OverpassResponse = serde_json::from_slice(&body)?;
        hydrants_from_response(payload)
    }
}

/// Decodes every node element; other element kinds are skipped.
pub fn hydrants_from_response(payload: OverpassResponse) -> Result<Vec<Hydrant>, LoadError> {
    if payload.elements.is_empty() {
        return Err(LoadError::EmptyResult);
    }
    tracing::debug!(elements = payload.elements.len(), "loaded overpass elements");

    let mut hydrants = Vec::with_capacity(payload.elements.len());
    for element in payload.elements {
        if !element.is_node() {
            continue;
        }
        let id = element.id;
        match element.into_node() {
            Some(node) => hydrants.push(Hydrant::from_node(node)),
            None => tracing::warn!(node_id = id, "skipping hydrant node without coordinates"),
        }
    }
    Ok(hydrants)
}
