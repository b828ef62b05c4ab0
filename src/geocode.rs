//! Free-text place lookup for centering the destination map.
//!
//! Talks the Nominatim wire format; `lat`/`lon` arrive as strings. The
//! first hit wins. Callers treat any failure as "no map".

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::PlanError;
use crate::model::GeoPoint;

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
}

/// Resolve a place name to coordinates. `Ok(None)` means the service had
/// no answer for this place.
pub async fn lookup(
    http: &Client,
    base_url: &str,
    place: &str,
) -> Result<Option<GeoPoint>, PlanError> {
    let url = format!("{}/search", base_url.trim_end_matches('/'));
    let response = http
        .get(&url)
        .query(&[("format", "json"), ("q", place)])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PlanError::Transport {
            status: Some(status.as_u16()),
            message: format!("geocoding lookup failed for {place:?}"),
        });
    }

    let body = response.text().await?;
    let point = first_point(&body);
    debug!(%place, found = point.is_some(), "geocode lookup");
    Ok(point)
}

/// Parse a Nominatim result array and take the first usable hit.
fn first_point(body: &str) -> Option<GeoPoint> {
    let hits: Vec<GeocodeHit> = serde_json::from_str(body).ok()?;
    let hit = hits.into_iter().next()?;
    let lat = hit.lat.parse().ok()?;
    let lon = hit.lon.parse().ok()?;
    Some(GeoPoint { lat, lon })
}
