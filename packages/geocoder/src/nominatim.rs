//! Nominatim / `OpenStreetMap` reverse geocoder client.
//!
//! The public instance allows **1 request per second**; the client spaces
//! requests by `rate_limit_ms` from the service configuration.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use std::time::Duration;

use async_trait::async_trait;
use incidence_map_incidence_models::Coords;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::service_registry::GeocodingService;
use crate::{GeocodeError, ReverseGeocoder};

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    /// Builds a client for `service`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn from_service(service: &GeocodingService) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(service.user_agent.clone())
            .timeout(Duration::from_millis(service.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: service.base_url.clone(),
            min_interval: Duration::from_millis(service.rate_limit_ms),
            last_request: Mutex::new(None),
        })
    }

    /// Sleeps until `min_interval` has passed since the previous request.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, coords: Coords) -> Result<String, GeocodeError> {
        self.throttle().await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lng.to_string()),
                ("format", "jsonv2".to_string()),
                ("zoom", "18".to_string()),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        let address = parse_response(&body)?;
        log::debug!(
            "Resolved ({}, {}) to {address:?}",
            coords.lat,
            coords.lng
        );
        Ok(address)
    }
}

/// Parses a Nominatim reverse JSON response.
fn parse_response(body: &serde_json::Value) -> Result<String, GeocodeError> {
    let object = body.as_object().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an object".to_string(),
    })?;

    if let Some(error) = object.get("error") {
        log::debug!("Nominatim returned error: {error}");
        return Err(GeocodeError::NotFound);
    }

    object
        .get("display_name")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .ok_or(GeocodeError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reverse_result() {
        let body = serde_json::json!({
            "place_id": 1,
            "lat": "40.4168",
            "lon": "-3.7038",
            "display_name": "Puerta del Sol, Centro, Madrid, España"
        });
        assert_eq!(
            parse_response(&body).unwrap(),
            "Puerta del Sol, Centro, Madrid, España"
        );
    }

    #[test]
    fn error_body_is_not_found() {
        let body = serde_json::json!({ "error": "Unable to geocode" });
        assert!(matches!(parse_response(&body), Err(GeocodeError::NotFound)));

        let body = serde_json::json!({ "display_name": "  " });
        assert!(matches!(parse_response(&body), Err(GeocodeError::NotFound)));
    }

    #[test]
    fn non_object_is_parse_error() {
        let body = serde_json::json!([]);
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn builds_from_embedded_service() {
        let geocoder =
            NominatimGeocoder::from_service(&crate::service_registry::nominatim()).unwrap();
        assert_eq!(geocoder.min_interval, Duration::from_millis(1000));
    }
}
