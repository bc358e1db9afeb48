use crate::models::domain::{Candidate, Requester, StructuredResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to compute a search region
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_radii"))]
pub struct RegionRequest {
    #[serde(alias = "zip_code", rename = "zipCode")]
    pub zip_code: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "min_radius_km", rename = "minRadiusKm")]
    pub min_radius_km: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default, alias = "max_radius_km", rename = "maxRadiusKm")]
    pub max_radius_km: Option<f64>,
}

fn validate_radii(request: &RegionRequest) -> Result<(), validator::ValidationError> {
    if let (Some(min), Some(max)) = (request.min_radius_km, request.max_radius_km) {
        if min > max {
            return Err(validator::ValidationError::new("min_radius_exceeds_max_radius"));
        }
    }
    Ok(())
}

/// Request to screen a batch of scraped listings for one requester
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FilterListingsRequest {
    #[validate(custom(function = "validate_requester"))]
    pub requester: Requester,
    #[serde(default)]
    pub listings: Vec<Candidate>,
}

/// Request to rank extracted landlord responses for one requester
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankResponsesRequest {
    #[validate(custom(function = "validate_requester"))]
    pub requester: Requester,
    #[serde(default)]
    pub responses: Vec<StructuredResponse>,
    /// Store the ranking when a database is configured
    #[serde(default)]
    pub persist: bool,
}

fn validate_requester(requester: &Requester) -> Result<(), validator::ValidationError> {
    if requester.name.trim().is_empty() {
        return Err(validator::ValidationError::new("missing_name"));
    }
    if requester.city.trim().is_empty() {
        return Err(validator::ValidationError::new("missing_city"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_region_request_aliases() {
        let request: RegionRequest = serde_json::from_value(json!({
            "zip_code": "10115",
            "city": "Berlin",
            "maxRadiusKm": 40.0
        }))
        .unwrap();

        assert_eq!(request.zip_code, "10115");
        assert_eq!(request.max_radius_km, Some(40.0));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_region_request_rejects_inverted_radii() {
        let request: RegionRequest = serde_json::from_value(json!({
            "zipCode": "10115",
            "city": "Berlin",
            "minRadiusKm": 50.0,
            "maxRadiusKm": 10.0
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_rank_request_requires_name() {
        let request: RankResponsesRequest = serde_json::from_value(json!({
            "requester": {
                "name": " ",
                "startDate": "15.03.2026",
                "location": "Werk",
                "zipCode": "13585",
                "city": "Berlin"
            },
            "responses": []
        }))
        .unwrap();

        assert!(!request.persist);
        assert!(request.validate().is_err());
    }
}
