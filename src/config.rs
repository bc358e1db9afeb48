use crate::models::{DistanceBand, Locality, RankingPolicy, SearchConfig};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub search: SearchSettings,
    pub ranking: RankingSettings,
    pub geocoding: GeocodingSettings,
    pub text_generation: TextGenerationSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

/// Region and filter options
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_min_radius_km")]
    pub min_radius_km: f64,
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    #[serde(default = "default_budget_max")]
    pub default_budget_max: u32,
    #[serde(default = "default_dedup_price_rounding_unit")]
    pub dedup_price_rounding_unit: f64,
    #[serde(default = "default_dedup_title_prefix_length")]
    pub dedup_title_prefix_length: usize,
    /// Optional gazetteer for nearby-locality listing
    #[serde(default)]
    pub localities: Vec<Locality>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_radius_km: default_min_radius_km(),
            max_radius_km: default_max_radius_km(),
            default_budget_max: default_budget_max(),
            dedup_price_rounding_unit: default_dedup_price_rounding_unit(),
            dedup_title_prefix_length: default_dedup_title_prefix_length(),
            localities: Vec::new(),
        }
    }
}

impl SearchSettings {
    pub fn to_config(&self) -> SearchConfig {
        SearchConfig {
            min_radius_km: self.min_radius_km,
            max_radius_km: self.max_radius_km,
            default_budget_max: self.default_budget_max,
            dedup_price_rounding_unit: self.dedup_price_rounding_unit,
            dedup_title_prefix_length: self.dedup_title_prefix_length,
        }
    }
}

fn default_min_radius_km() -> f64 { SearchConfig::default().min_radius_km }
fn default_max_radius_km() -> f64 { SearchConfig::default().max_radius_km }
fn default_budget_max() -> u32 { SearchConfig::default().default_budget_max }
fn default_dedup_price_rounding_unit() -> f64 { SearchConfig::default().dedup_price_rounding_unit }
fn default_dedup_title_prefix_length() -> usize { SearchConfig::default().dedup_title_prefix_length }

/// Ranking thresholds; see `RankingPolicy`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    pub baseline: f64,
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

impl Default for RankingSettings {
    fn default() -> Self {
        let policy = RankingPolicy::default();
        Self {
            baseline: policy.baseline,
            distance_bands: policy.distance_bands,
            beyond_bands_adjustment: policy.beyond_bands_adjustment,
            comfortable_budget_ratio: policy.comfortable_budget_ratio,
            comfortable_adjustment: policy.comfortable_adjustment,
            within_budget_adjustment: policy.within_budget_adjustment,
            over_budget_adjustment: policy.over_budget_adjustment,
            internet_bonus: policy.internet_bonus,
            parking_bonus: policy.parking_bonus,
            urgency_bonus: policy.urgency_bonus,
            far_warning_km: policy.far_warning_km,
        }
    }
}

impl RankingSettings {
    /// Bands are sorted ascending so the first match is the tightest
    pub fn to_policy(&self) -> RankingPolicy {
        let mut distance_bands = self.distance_bands.clone();
        distance_bands.sort_by(|a, b| {
            a.max_km
                .partial_cmp(&b.max_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        RankingPolicy {
            baseline: self.baseline,
            distance_bands,
            beyond_bands_adjustment: self.beyond_bands_adjustment,
            comfortable_budget_ratio: self.comfortable_budget_ratio,
            comfortable_adjustment: self.comfortable_adjustment,
            within_budget_adjustment: self.within_budget_adjustment,
            over_budget_adjustment: self.over_budget_adjustment,
            internet_bonus: self.internet_bonus,
            parking_bonus: self.parking_bonus,
            urgency_bonus: self.urgency_bonus,
            far_warning_km: self.far_warning_km,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingSettings {
    pub endpoint: String,
    pub user_agent: String,
    /// Appended to every query
    pub country: String,
    pub timeout_secs: u64,
}

impl Default for GeocodingSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "housefinder/0.1".to_string(),
            country: "Germany".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextGenerationSettings {
    pub endpoint: String,
    /// Enhanced summaries are disabled without a key
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl Default for TextGenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4-turbo-preview".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Persistence is disabled without a URL
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Second cache tier is disabled without a URL
    pub redis_url: Option<String>,
    pub ttl_secs: u64,
    pub l1_cache_size: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: 86_400,
            l1_cache_size: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

fn environment() -> Environment {
    // e.g., HOUSEFINDER__SEARCH__MAX_RADIUS_KM -> search.max_radius_km
    Environment::with_prefix("HOUSEFINDER")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with HOUSEFINDER__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}
