use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::{info, warn};
use url::Url;

use crate::error::ColgadosError;
use crate::types::plex::{PlexInputs, PlexRequest, PlexResponse};

pub struct PlexApi;

impl PlexApi {
    /// Execute a PLEX data source and parse its tabular response.
    ///
    /// A single attempt; any transport error, non-success status or
    /// unparseable body is returned to the caller.
    pub async fn execute_datasource(
        client: &reqwest::Client,
        endpoint: &Url,
        token: &str,
        inputs: PlexInputs,
    ) -> Result<PlexResponse, ColgadosError> {
        let mut req = client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json;charset=utf-8")
            .header(ACCEPT, "application/json");
        match authorization_value(token) {
            Some(value) => req = req.header(AUTHORIZATION, value),
            None => warn!("AUT_PLEX is not set; calling PLEX without credentials"),
        }

        let resp = req
            .json(&PlexRequest { inputs })
            .send()
            .await?
            .error_for_status()?;
        let body = resp.bytes().await?;
        info!(
            endpoint = %endpoint,
            part_key = inputs.part_key,
            bytes = body.len(),
            "PLEX data source executed"
        );
        PlexResponse::from_slice(&body)
    }
}

/// `AUT_PLEX` may hold a full header value (`Bearer ...`, `Basic ...`) or a
/// bare token.
fn authorization_value(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if token.contains(' ') {
        Some(token.to_string())
    } else {
        Some(format!("Bearer {token}"))
    }
}
