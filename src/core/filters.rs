use crate::core::dedup::remove_duplicates;
use crate::core::distance::geodesic_distance_km;
use crate::core::region::RegionCalculator;
use crate::models::{Candidate, Region, Requester, SearchConfig};
use serde::Serialize;
use thiserror::Error;

/// Wording that marks a listing as aimed at somebody else
const UNSUITABLE_KEYWORDS: [&str; 6] = ["wg", "studenten", "student", "azubi", "nur für", "only for"];

/// Wording typical of worker accommodation
const SUITABLE_KEYWORDS: [&str; 9] = [
    "monteur",
    "arbeiter",
    "worker",
    "handwerker",
    "möbliert",
    "furnished",
    "vollmöbliert",
    "kurzzeitvermietung",
    "short-term",
];

/// Why a candidate was rejected; the message becomes its validation note
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("Missing title")]
    MissingTitle,

    #[error("No contact information")]
    NoContact,

    #[error("Too far: {distance_km:.1} km > {max_radius_km} km")]
    TooFar { distance_km: f64, max_radius_km: f64 },

    #[error("Over budget: {price} > {budget}")]
    OverBudget { price: f64, budget: u32 },

    #[error("Duplicate listing")]
    Duplicate,
}

/// Candidates split by the hard filter
#[derive(Debug, Clone, Default)]
pub struct FilterResult {
    pub valid: Vec<Candidate>,
    pub rejected: Vec<Candidate>,
}

/// Outcome of the full region → dedup → filter pipeline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningReport {
    pub region: Region,
    pub valid: Vec<Candidate>,
    pub rejected: Vec<Candidate>,
    pub duplicates: Vec<Candidate>,
    pub total_candidates: usize,
}

/// Deduplication and filter engine
///
/// # Pipeline Stages
/// 1. Search region around the requester's work location
/// 2. Duplicate removal across sources
/// 3. Hard filter: title, contact, distance, budget, duplicate flag
#[derive(Clone)]
pub struct ListingFilter {
    region_calculator: RegionCalculator,
}

impl ListingFilter {
    pub fn new(region_calculator: RegionCalculator) -> Self {
        Self { region_calculator }
    }

    pub fn region_calculator(&self) -> &RegionCalculator {
        &self.region_calculator
    }

    fn config(&self) -> &SearchConfig {
        self.region_calculator.config()
    }

    /// Run the complete screening pipeline for one requester
    pub async fn screen(&self, requester: &Requester, candidates: Vec<Candidate>) -> ScreeningReport {
        let total_candidates = candidates.len();

        let region = self
            .region_calculator
            .compute_search_region(
                &requester.zip_code,
                &requester.city,
                requester.state.as_deref(),
                None,
                None,
            )
            .await;

        let deduplicated = remove_duplicates(candidates, self.config());
        let filtered = self.filter_listings(deduplicated.unique, requester, &region).await;

        ScreeningReport {
            region,
            valid: filtered.valid,
            rejected: filtered.rejected,
            duplicates: deduplicated.duplicates,
            total_candidates,
        }
    }

    /// Apply the hard filter to deduplicated candidates
    ///
    /// Rules run in a fixed order and the first failing one decides the
    /// candidate's note. Distance is only checked when both the region center
    /// and the candidate's city resolve.
    pub async fn filter_listings(
        &self,
        candidates: Vec<Candidate>,
        requester: &Requester,
        region: &Region,
    ) -> FilterResult {
        tracing::info!(requester = %requester.name, "Filtering {} listings", candidates.len());

        if region.center.is_none() {
            tracing::warn!(
                requester = %requester.name,
                "Could not geocode work location, skipping distance filter"
            );
        }

        let budget = requester.effective_budget(self.config().default_budget_max);
        let mut result = FilterResult::default();

        for mut candidate in candidates {
            match self.check(&mut candidate, budget, region).await {
                Ok(()) => {
                    candidate.is_valid = true;
                    result.valid.push(candidate);
                }
                Err(rejection) => {
                    tracing::debug!(title = %candidate.title, reason = %rejection, "Rejected listing");
                    candidate.is_valid = false;
                    candidate.validation_note = Some(rejection.to_string());
                    result.rejected.push(candidate);
                }
            }
        }

        tracing::info!(
            requester = %requester.name,
            valid = result.valid.len(),
            rejected = result.rejected.len(),
            "Filtered listings"
        );

        result
    }

    async fn check(&self, candidate: &mut Candidate, budget: u32, region: &Region) -> Result<(), Rejection> {
        if candidate.title.trim().is_empty() {
            return Err(Rejection::MissingTitle);
        }

        if !candidate.has_contact_info() {
            return Err(Rejection::NoContact);
        }

        if let Some(center) = region.center {
            if !candidate.city.trim().is_empty() {
                let location = self
                    .region_calculator
                    .resolve_coordinates(candidate.zip_code.as_deref().unwrap_or(""), &candidate.city, None)
                    .await;

                if let Some(location) = location {
                    let distance_km = geodesic_distance_km(center, location);
                    candidate.distance_km = Some((distance_km * 100.0).round() / 100.0);

                    if distance_km > region.max_radius_km {
                        return Err(Rejection::TooFar {
                            distance_km,
                            max_radius_km: region.max_radius_km,
                        });
                    }
                }
            }
        }

        if let Some(price) = candidate.price_per_month {
            if price > budget as f64 {
                return Err(Rejection::OverBudget { price, budget });
            }
        }

        if candidate.is_duplicate {
            return Err(Rejection::Duplicate);
        }

        Ok(())
    }
}

/// Advisory check whether a listing suits worker accommodation
///
/// Any unsuitable keyword rules a listing out; otherwise it is suitable,
/// whether or not a suitable keyword appears.
pub fn validate_suitability(candidate: &Candidate) -> bool {
    let text = format!(
        "{} {}",
        candidate.title,
        candidate.description.as_deref().unwrap_or("")
    )
    .to_lowercase();

    if let Some(keyword) = UNSUITABLE_KEYWORDS.iter().find(|k| text.contains(*k)) {
        tracing::debug!(title = %candidate.title, keyword = %keyword, "Unsuitable listing");
        return false;
    }

    if SUITABLE_KEYWORDS.iter().any(|k| text.contains(k)) {
        tracing::trace!(title = %candidate.title, "Listing explicitly targets workers");
    }

    true
}
