// Integration tests for Housefinder

use actix_web::{test, web, App};
use async_trait::async_trait;
use housefinder::core::{ListingFilter, RankingEngine, RegionCalculator, Summarizer};
use housefinder::models::{Candidate, Coordinate, Locality, Requester, SearchConfig};
use housefinder::routes::{self, AppState};
use housefinder::services::{GeocodeError, Geocoder};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves any query that contains a known city as one of its segments
struct CityGeocoder {
    cities: HashMap<&'static str, Coordinate>,
}

impl CityGeocoder {
    fn germany() -> Self {
        let cities = [
            ("Berlin", Coordinate::new(52.5200, 13.4050)),
            ("Potsdam", Coordinate::new(52.3906, 13.0645)),
            ("Hamburg", Coordinate::new(53.5511, 9.9937)),
        ];
        Self { cities: cities.into_iter().collect() }
    }

    fn empty() -> Self {
        Self { cities: HashMap::new() }
    }
}

#[async_trait]
impl Geocoder for CityGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(query
            .split(", ")
            .find_map(|segment| self.cities.get(segment).copied()))
    }
}

fn create_filter(geocoder: CityGeocoder) -> ListingFilter {
    let calculator = RegionCalculator::new(Arc::new(geocoder), SearchConfig::default(), "Germany")
        .with_localities(vec![
            Locality { name: "Potsdam".to_string(), latitude: 52.3906, longitude: 13.0645 },
            Locality { name: "Hamburg".to_string(), latitude: 53.5511, longitude: 9.9937 },
        ]);
    ListingFilter::new(calculator)
}

fn create_requester(budget: Option<u32>) -> Requester {
    Requester {
        name: "Max Mustermann".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
        location: "Werk Mitte".to_string(),
        zip_code: "10115".to_string(),
        city: "Berlin".to_string(),
        state: None,
        urgent: false,
        budget_max: budget,
        party_size: 1,
    }
}

fn create_listings() -> Vec<Candidate> {
    vec![
        Candidate::new("Zimmer Mitte", "a", "https://a/1", "Berlin").with_price(500.0).with_phone("030 1111"),
        Candidate::new("Wohnung Potsdam", "a", "https://a/2", "Potsdam").with_price(1000.0).with_email("vermieter@example.de"),
        Candidate::new("Loft Kreuzberg", "b", "https://b/1", "Berlin").with_price(1500.0).with_phone("030 2222"),
        Candidate::new("Hafenblick", "b", "https://b/2", "Hamburg").with_price(600.0).with_phone("040 3333"),
        Candidate::new("Ohne Kontakt", "c", "https://c/1", "Berlin").with_price(400.0),
        Candidate::new("Zimmer Mitte", "c", "https://c/2", "Berlin").with_price(510.0).with_phone("0301111"),
    ]
}

#[tokio::test]
async fn test_integration_end_to_end_screening() {
    let filter = create_filter(CityGeocoder::germany());
    let report = filter.screen(&create_requester(Some(1000)), create_listings()).await;

    assert_eq!(report.total_candidates, 6);
    assert!(report.region.is_resolved());
    assert_eq!(report.region.nearby_localities, vec!["Potsdam".to_string()]);

    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].url, "https://c/2");

    let valid: Vec<_> = report.valid.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(valid, vec!["https://a/1", "https://a/2"]);

    let notes: Vec<_> = report
        .rejected
        .iter()
        .map(|c| c.validation_note.clone().unwrap_or_default())
        .collect();
    assert_eq!(notes[0], "Over budget: 1500 > 1000");
    assert!(notes[1].starts_with("Too far: "));
    assert_eq!(notes[2], "No contact information");

    let potsdam_distance = report.valid[1].distance_km.unwrap();
    assert!(potsdam_distance > 20.0 && potsdam_distance < 35.0);
}

#[tokio::test]
async fn test_budget_boundary_is_inclusive() {
    let filter = create_filter(CityGeocoder::germany());
    let region = filter
        .region_calculator()
        .compute_search_region("10115", "Berlin", None, None, None)
        .await;

    let listings = [500.0, 1000.0, 1500.0]
        .iter()
        .enumerate()
        .map(|(i, price)| {
            Candidate::new(&format!("Angebot {}", i), "a", &format!("u{}", i), "Berlin")
                .with_price(*price)
                .with_phone("030 1234")
        })
        .collect();

    let result = filter.filter_listings(listings, &create_requester(Some(1000)), &region).await;

    assert_eq!(result.valid.len(), 2);
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].price_per_month, Some(1500.0));
}

#[tokio::test]
async fn test_unresolved_region_skips_distance_rule() {
    let filter = create_filter(CityGeocoder::empty());
    let report = filter.screen(&create_requester(None), create_listings()).await;

    assert!(!report.region.is_resolved());
    assert_eq!(report.region.error.as_deref(), Some("Could not geocode location"));

    // Hamburg passes because distance cannot be checked; the default budget admits 1500
    let valid: Vec<_> = report.valid.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(valid, vec!["https://a/1", "https://a/2", "https://b/1", "https://b/2"]);
    assert!(report.valid.iter().all(|c| c.distance_km.is_none()));
}

fn create_app_state() -> AppState {
    AppState {
        listing_filter: create_filter(CityGeocoder::germany()),
        ranking: RankingEngine::default(),
        summarizer: Summarizer::default(),
        store: None,
    }
}

fn requester_json() -> Value {
    json!({
        "name": "Max Mustermann",
        "startDate": "15.03.2026",
        "location": "Werk Mitte",
        "zipCode": "10115",
        "city": "Berlin",
        "urgent": "Ja",
        "budgetMax": 1000
    })
}

#[actix_web::test]
async fn test_rank_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/responses/rank")
        .set_json(json!({
            "requester": requester_json(),
            "responses": [
                { "available": "nein", "address": "Weg 1" },
                { "available": "ja", "address": "Hauptstr. 1", "distanceKm": "5 km", "pricePerMonth": "700", "internet": "ja", "parking": "nein" }
            ]
        }))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["availableCount"], 1);
    assert_eq!(body["results"][0]["address"], "Hauptstr. 1");
    assert_eq!(body["results"][0]["rank"], 1);
    // 100 + 30 + 20 + 5 internet + 5 urgency
    assert_eq!(body["results"][0]["score"], 160.0);
    assert_eq!(body["results"][0]["warnings"], "No parking");
    assert_eq!(body["results"][1]["warnings"], "Not available");
    assert!(body["rankingId"].is_null());
    assert!(body["summary"].as_str().unwrap().contains("1 available option(s) found"));
}

#[actix_web::test]
async fn test_filter_endpoint_reports_unsuitable() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/listings/filter")
        .set_json(json!({
            "requester": requester_json(),
            "listings": [
                { "title": "WG-Zimmer nur für Studenten", "platform": "a", "url": "u1", "city": "Berlin", "phone": "030 1" },
                { "title": "Monteurzimmer", "platform": "a", "url": "u2", "city": "Potsdam", "email": "a@b.de", "pricePerMonth": 450.0 }
            ]
        }))
        .to_request();

    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["totalCandidates"], 2);
    assert_eq!(body["valid"].as_array().unwrap().len(), 2);
    assert_eq!(body["unsuitable"], json!(["u1"]));
}

#[actix_web::test]
async fn test_region_endpoint_rejects_inverted_radii() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/region")
        .set_json(json!({ "zipCode": "10115", "city": "Berlin", "minRadiusKm": 40.0, "maxRadiusKm": 10.0 }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_roster_requires_database() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/requesters").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), actix_web::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_health_without_database() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert!(body["database"].is_null());
    assert_eq!(body["enhanced_summaries"], false);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_web::test]
async fn test_latest_ranking_requires_database() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(create_app_state()))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/rankings/Max%20Mustermann")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), actix_web::http::StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status_code"], 503);
    assert_eq!(body["error"], "Storage not configured");
}
