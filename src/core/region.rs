use crate::core::distance::geodesic_distance_km;
use crate::models::{non_empty, Coordinate, Locality, Region, SearchConfig};
use crate::services::geocoding::Geocoder;
use std::sync::Arc;

/// Error indicator attached to a region whose center could not be resolved
pub const UNRESOLVED_CENTER: &str = "Could not geocode location";

/// Resolves work locations and derives the search region around them
///
/// Holds no mutable state; every call is a pure function of its inputs
/// plus the geocoding lookups it issues.
#[derive(Clone)]
pub struct RegionCalculator {
    geocoder: Arc<dyn Geocoder>,
    config: SearchConfig,
    country: String,
    localities: Vec<Locality>,
}

impl RegionCalculator {
    pub fn new(geocoder: Arc<dyn Geocoder>, config: SearchConfig, country: impl Into<String>) -> Self {
        Self {
            geocoder,
            config,
            country: country.into(),
            localities: Vec::new(),
        }
    }

    /// Attach a gazetteer used to list nearby localities
    pub fn with_localities(mut self, localities: Vec<Locality>) -> Self {
        self.localities = localities;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Resolve a postal code and city to coordinates
    ///
    /// Tries "zip, city, state, country" first, then "city, country".
    /// Not-found and provider errors both yield `None`.
    pub async fn resolve_coordinates(
        &self,
        zip_code: &str,
        city: &str,
        state: Option<&str>,
    ) -> Option<Coordinate> {
        let Some(city) = non_empty(Some(city)) else {
            return None;
        };

        let mut parts: Vec<&str> = Vec::with_capacity(4);
        parts.extend(non_empty(Some(zip_code)));
        parts.push(city);
        parts.extend(non_empty(state));
        parts.push(&self.country);
        let full_query = parts.join(", ");

        match self.geocoder.geocode(&full_query).await {
            Ok(Some(coordinate)) => {
                tracing::debug!(query = %full_query, ?coordinate, "Found coordinates");
                return Some(coordinate);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(query = %full_query, error = %e, "Geocoding failed");
                return None;
            }
        }

        let fallback_query = format!("{}, {}", city, self.country);
        if fallback_query == full_query {
            tracing::warn!(city = %city, "Could not find coordinates");
            return None;
        }

        match self.geocoder.geocode(&fallback_query).await {
            Ok(Some(coordinate)) => {
                tracing::debug!(query = %fallback_query, ?coordinate, "Found coordinates (fallback)");
                Some(coordinate)
            }
            Ok(None) => {
                tracing::warn!(city = %city, "Could not find coordinates");
                None
            }
            Err(e) => {
                tracing::warn!(query = %fallback_query, error = %e, "Geocoding failed");
                None
            }
        }
    }

    /// Compute the search region around a work location
    ///
    /// Radii fall back to the configured defaults. An unresolvable center is
    /// reported on the region, not raised.
    pub async fn compute_search_region(
        &self,
        zip_code: &str,
        city: &str,
        state: Option<&str>,
        min_radius_km: Option<f64>,
        max_radius_km: Option<f64>,
    ) -> Region {
        let min_radius_km = min_radius_km.unwrap_or(self.config.min_radius_km);
        let max_radius_km = max_radius_km.unwrap_or(self.config.max_radius_km);

        let center = self.resolve_coordinates(zip_code, city, state).await;

        let (nearby_localities, error) = match center {
            Some(center) => (self.nearby_localities(center, max_radius_km), None),
            None => {
                tracing::warn!(zip = %zip_code, city = %city, "Search region has no resolved center");
                (Vec::new(), Some(UNRESOLVED_CENTER.to_string()))
            }
        };

        Region {
            center_zip: zip_code.to_string(),
            center_city: city.to_string(),
            center,
            min_radius_km,
            max_radius_km,
            nearby_localities,
            error,
        }
    }

    /// Gazetteer entries within `radius_km` of the center, nearest first
    fn nearby_localities(&self, center: Coordinate, radius_km: f64) -> Vec<String> {
        let mut nearby: Vec<(f64, &str)> = self
            .localities
            .iter()
            .map(|locality| (geodesic_distance_km(center, locality.coordinate()), locality.name.as_str()))
            .filter(|(distance, _)| *distance <= radius_km)
            .collect();

        nearby.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        tracing::debug!(count = nearby.len(), radius_km, "Found nearby localities");

        nearby.into_iter().map(|(_, name)| name.to_string()).collect()
    }
}
