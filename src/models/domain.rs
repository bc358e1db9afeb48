use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Start date spellings accepted from the requester roster
const START_DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%Y-%m-%d", "%m/%d/%Y"];

/// Spellings of an affirmative urgency flag
const TRUTHY_SPELLINGS: [&str; 4] = ["yes", "ja", "true", "1"];

const AFFIRMATIVE_SPELLINGS: [&str; 2] = ["ja", "yes"];
const NEGATIVE_SPELLINGS: [&str; 2] = ["nein", "no"];

/// Parse a requester start date in any of the supported formats
pub fn parse_start_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    START_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Interpret a textual urgency flag
pub fn parse_truthy(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    TRUTHY_SPELLINGS.contains(&value.as_str())
}

fn deserialize_start_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_start_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unable to parse start date: {}", raw)))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UrgencyFlag {
    Bool(bool),
    Number(i64),
    Text(String),
}

fn deserialize_urgent<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<UrgencyFlag>::deserialize(deserializer)? {
        Some(UrgencyFlag::Bool(flag)) => flag,
        Some(UrgencyFlag::Number(n)) => n != 0,
        Some(UrgencyFlag::Text(text)) => parse_truthy(&text),
        None => false,
    })
}

fn default_party_size() -> u32 { 1 }
fn default_true() -> bool { true }

/// Person who needs accommodation near a work location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub name: String,
    #[serde(deserialize_with = "deserialize_start_date")]
    pub start_date: NaiveDate,
    /// Display name of the work location
    pub location: String,
    pub zip_code: String,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "deserialize_urgent")]
    pub urgent: bool,
    #[serde(default)]
    pub budget_max: Option<u32>,
    #[serde(default = "default_party_size")]
    pub party_size: u32,
}

impl Requester {
    /// Explicit budget, or the configured default when absent or zero
    pub fn effective_budget(&self, default_budget_max: u32) -> u32 {
        self.budget_max
            .filter(|budget| *budget > 0)
            .unwrap_or(default_budget_max)
    }
}

/// Latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Named place used to list localities around a search center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locality {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Locality {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Geocoded search area around a work location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub center_zip: String,
    pub center_city: String,
    pub center: Option<Coordinate>,
    /// Advisory only
    pub min_radius_km: f64,
    /// Hard cutoff for distance filtering
    pub max_radius_km: f64,
    #[serde(default)]
    pub nearby_localities: Vec<String>,
    /// Set when the center could not be resolved
    #[serde(default)]
    pub error: Option<String>,
}

impl Region {
    pub fn is_resolved(&self) -> bool {
        self.center.is_some()
    }
}

/// Accommodation listing as delivered by a source collector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub price_per_month: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_persons: Option<u32>,
    #[serde(default)]
    pub available_from: Option<String>,

    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub is_duplicate: bool,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    #[serde(default)]
    pub validation_note: Option<String>,
}

impl Candidate {
    pub fn new(title: &str, platform: &str, url: &str, city: &str) -> Self {
        Self {
            title: title.to_string(),
            platform: platform.to_string(),
            url: url.to_string(),
            city: city.to_string(),
            zip_code: None,
            address: None,
            price_per_month: None,
            phone: None,
            email: None,
            contact_name: None,
            description: None,
            max_persons: None,
            available_from: None,
            distance_km: None,
            is_duplicate: false,
            is_valid: true,
            validation_note: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price_per_month = Some(price);
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// True when a non-empty phone or email is present
    pub fn has_contact_info(&self) -> bool {
        non_empty(self.phone.as_deref()).is_some() || non_empty(self.email.as_deref()).is_some()
    }
}

/// Yes/no/unclear reading of a free-text answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    Yes,
    No,
    Unclear,
}

impl TriState {
    pub fn from_text(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return TriState::Unclear;
        };
        let value = value.trim().to_lowercase();
        if AFFIRMATIVE_SPELLINGS.contains(&value.as_str()) {
            TriState::Yes
        } else if NEGATIVE_SPELLINGS.contains(&value.as_str()) {
            TriState::No
        } else {
            TriState::Unclear
        }
    }
}

/// Landlord reply after structured extraction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredResponse {
    pub listing_url: Option<String>,
    /// "yes" / "no" / "unclear" in any supported spelling
    pub available: Option<String>,
    pub price_per_month: Option<String>,
    pub price_per_person: Option<String>,
    pub deposit: Option<String>,
    pub available_from: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub internet: Option<String>,
    pub parking: Option<String>,
    pub distance_km: Option<String>,
    pub travel_time_min: Option<String>,
    pub remark: Option<String>,
    pub response_channel: Option<String>,
    pub response_date: Option<String>,

    pub score: Option<f64>,
    pub rank: Option<u8>,
    pub warnings: String,
}

impl StructuredResponse {
    pub fn availability(&self) -> TriState {
        TriState::from_text(self.available.as_deref())
    }

    pub fn internet_state(&self) -> TriState {
        TriState::from_text(self.internet.as_deref())
    }

    pub fn parking_state(&self) -> TriState {
        TriState::from_text(self.parking.as_deref())
    }
}

/// Search and filter options consumed by the region calculator and filter engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub min_radius_km: f64,
    pub max_radius_km: f64,
    pub default_budget_max: u32,
    pub dedup_price_rounding_unit: f64,
    pub dedup_title_prefix_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_radius_km: 20.0,
            max_radius_km: 35.0,
            default_budget_max: 1500,
            dedup_price_rounding_unit: 50.0,
            dedup_title_prefix_length: 50,
        }
    }
}

/// Upper distance bound with the score adjustment applied at or below it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBand {
    pub max_km: f64,
    pub adjustment: f64,
}

/// Score thresholds and adjustments used by the ranking engine
#[derive(Debug, Clone, PartialEq)]
pub struct RankingPolicy {
    pub baseline: f64,
    /// Ascending by `max_km`
    pub distance_bands: Vec<DistanceBand>,
    pub beyond_bands_adjustment: f64,
    pub comfortable_budget_ratio: f64,
    pub comfortable_adjustment: f64,
    pub within_budget_adjustment: f64,
    pub over_budget_adjustment: f64,
    pub internet_bonus: f64,
    pub parking_bonus: f64,
    pub urgency_bonus: f64,
    pub far_warning_km: f64,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            baseline: 100.0,
            distance_bands: vec![
                DistanceBand { max_km: 10.0, adjustment: 30.0 },
                DistanceBand { max_km: 20.0, adjustment: 20.0 },
                DistanceBand { max_km: 30.0, adjustment: 10.0 },
            ],
            beyond_bands_adjustment: -10.0,
            comfortable_budget_ratio: 0.8,
            comfortable_adjustment: 20.0,
            within_budget_adjustment: 10.0,
            over_budget_adjustment: -20.0,
            internet_bonus: 5.0,
            parking_bonus: 5.0,
            urgency_bonus: 5.0,
            far_warning_km: 30.0,
        }
    }
}

/// Trimmed value, or None when empty
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(parse_start_date("15.01.2026"), Some(expected));
        assert_eq!(parse_start_date("2026-01-15"), Some(expected));
        assert_eq!(parse_start_date("01/15/2026"), Some(expected));
        assert_eq!(parse_start_date("next monday"), None);
    }

    #[test]
    fn test_urgency_spellings() {
        for value in ["yes", "JA", "True", " 1 "] {
            assert!(parse_truthy(value), "{} should be urgent", value);
        }
        for value in ["no", "nein", "", "maybe"] {
            assert!(!parse_truthy(value), "{} should not be urgent", value);
        }
    }

    #[test]
    fn test_requester_deserialization() {
        let json = r#"{
            "name": "Max Mustermann",
            "startDate": "01.02.2026",
            "location": "Werk Spandau",
            "zipCode": "13585",
            "city": "Berlin",
            "urgent": "Ja"
        }"#;

        let requester: Requester = serde_json::from_str(json).unwrap();
        assert!(requester.urgent);
        assert_eq!(requester.party_size, 1);
        assert_eq!(requester.budget_max, None);
        assert_eq!(requester.start_date, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    }

    #[test]
    fn test_requester_rejects_bad_start_date() {
        let json = r#"{
            "name": "Max", "startDate": "soon", "location": "X",
            "zipCode": "1", "city": "Berlin"
        }"#;
        assert!(serde_json::from_str::<Requester>(json).is_err());
    }

    #[test]
    fn test_urgency_from_number_and_bool() {
        let base = r#""name": "A", "startDate": "2026-01-01", "location": "X", "zipCode": "1", "city": "B""#;
        let numeric: Requester = serde_json::from_str(&format!("{{{}, \"urgent\": 1}}", base)).unwrap();
        let boolean: Requester = serde_json::from_str(&format!("{{{}, \"urgent\": false}}", base)).unwrap();
        assert!(numeric.urgent);
        assert!(!boolean.urgent);
    }

    #[test]
    fn test_effective_budget() {
        let mut requester: Requester = serde_json::from_str(
            r#"{"name": "A", "startDate": "2026-01-01", "location": "X", "zipCode": "1", "city": "B"}"#,
        )
        .unwrap();
        assert_eq!(requester.effective_budget(1500), 1500);

        requester.budget_max = Some(0);
        assert_eq!(requester.effective_budget(1500), 1500);

        requester.budget_max = Some(900);
        assert_eq!(requester.effective_budget(1500), 900);
    }

    #[test]
    fn test_contact_info_ignores_blank_fields() {
        let mut candidate = Candidate::new("Room", "Test", "http://test", "Berlin");
        assert!(!candidate.has_contact_info());

        candidate.phone = Some("   ".to_string());
        assert!(!candidate.has_contact_info());

        candidate.email = Some("host@example.com".to_string());
        assert!(candidate.has_contact_info());
    }

    #[test]
    fn test_tri_state() {
        assert_eq!(TriState::from_text(Some("Ja")), TriState::Yes);
        assert_eq!(TriState::from_text(Some("yes")), TriState::Yes);
        assert_eq!(TriState::from_text(Some("Nein")), TriState::No);
        assert_eq!(TriState::from_text(Some("Unklar")), TriState::Unclear);
        assert_eq!(TriState::from_text(None), TriState::Unclear);
    }
}
