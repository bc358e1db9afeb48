// Service exports
pub mod cache;
pub mod geocoding;
pub mod postgres;
pub mod text_generation;

pub use cache::{CacheError, CacheKey, CachedGeocoder};
pub use geocoding::{GeocodeError, Geocoder, NominatimGeocoder};
pub use postgres::{RankingStore, RosterRow, StoreError, StoredRanking};
pub use text_generation::{ChatCompletionsClient, TextGenerationError, TextGenerator};
