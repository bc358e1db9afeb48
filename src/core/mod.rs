// Core algorithm exports
pub mod dedup;
pub mod distance;
pub mod filters;
pub mod ranking;
pub mod region;
pub mod scoring;
pub mod summary;

pub use dedup::{remove_duplicates, signature, DedupResult};
pub use distance::{geodesic_distance_km, is_within_radius};
pub use filters::{validate_suitability, FilterResult, ListingFilter, Rejection, ScreeningReport};
pub use ranking::{RankingEngine, RankingOutcome, NOT_AVAILABLE_WARNING};
pub use region::RegionCalculator;
pub use scoring::{calculate_score, generate_warnings, parse_distance_km, parse_price};
pub use summary::{fallback_summary, Summarizer};
