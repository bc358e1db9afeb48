use crate::models::Coordinate;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to a geocoding provider
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Resolves free-text addresses to coordinates
///
/// `Ok(None)` means the provider found nothing; errors are transport or
/// protocol failures.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Nominatim (OpenStreetMap) search API client
pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    client: Client,
}

impl NominatimGeocoder {
    pub fn new(
        base_url: String,
        user_agent: String,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            user_agent,
            client,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        tracing::debug!(query = %query, "Geocoding location");

        let response = self
            .client
            .get(&url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Geocoding request failed: {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let Some(place) = places.first() else {
            return Ok(None);
        };

        let latitude: f64 = place
            .lat
            .parse()
            .map_err(|e| GeocodeError::InvalidResponse(format!("Invalid latitude: {}", e)))?;
        let longitude: f64 = place
            .lon
            .parse()
            .map_err(|e| GeocodeError::InvalidResponse(format!("Invalid longitude: {}", e)))?;

        let coordinate = Coordinate::new(latitude, longitude);
        if !coordinate.is_valid() {
            return Err(GeocodeError::InvalidResponse(format!(
                "Coordinate out of range: {}, {}",
                latitude, longitude
            )));
        }

        Ok(Some(coordinate))
    }
}
