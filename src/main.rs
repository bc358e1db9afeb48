use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use housefinder::config::Settings;
use housefinder::core::{ListingFilter, RankingEngine, RegionCalculator, Summarizer};
use housefinder::routes::{self, AppState};
use housefinder::services::{
    CachedGeocoder, ChatCompletionsClient, Geocoder, NominatimGeocoder, RankingStore, TextGenerator,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn to_io_error<E: std::fmt::Display>(context: &str, e: E) -> std::io::Error {
    error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| to_io_error("Configuration error", e))?;

    // Initialize logging; RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting housefinder service...");

    // Geocoder with in-process cache, plus Redis when configured
    let nominatim = NominatimGeocoder::new(
        settings.geocoding.endpoint.clone(),
        settings.geocoding.user_agent.clone(),
        Duration::from_secs(settings.geocoding.timeout_secs),
    )
    .map_err(|e| to_io_error("Geocoder setup failed", e))?;

    let mut cached = CachedGeocoder::new(nominatim, settings.cache.l1_cache_size, settings.cache.ttl_secs);

    if let Some(redis_url) = &settings.cache.redis_url {
        if let Err(e) = cached.enable_redis(redis_url).await {
            warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
        }
    }

    info!(
        "Geocode cache initialized (L1: {} entries, TTL: {}s, Redis: {})",
        settings.cache.l1_cache_size,
        settings.cache.ttl_secs,
        cached.has_redis()
    );

    let geocoder: Arc<dyn Geocoder> = Arc::new(cached);

    let search_config = settings.search.to_config();
    let region_calculator = RegionCalculator::new(geocoder, search_config, settings.geocoding.country.clone())
        .with_localities(settings.search.localities.clone());
    let listing_filter = ListingFilter::new(region_calculator);

    let ranking = RankingEngine::new(settings.ranking.to_policy(), search_config.default_budget_max);

    info!("Ranking engine initialized with policy: {:?}", ranking.policy());

    // Enhanced summaries are optional
    let generator: Option<Arc<dyn TextGenerator>> = match &settings.text_generation.api_key {
        Some(api_key) if !api_key.trim().is_empty() => {
            let client = ChatCompletionsClient::new(
                settings.text_generation.endpoint.clone(),
                api_key.clone(),
                settings.text_generation.model.clone(),
                settings.text_generation.temperature,
                Duration::from_secs(settings.text_generation.timeout_secs),
            )
            .map_err(|e| to_io_error("Text generation client setup failed", e))?;
            info!("Enhanced summaries enabled (model: {})", settings.text_generation.model);
            Some(Arc::new(client))
        }
        _ => {
            info!("No text generation key configured, using template summaries");
            None
        }
    };
    let summarizer = Summarizer::new(generator);

    // PostgreSQL is optional; without it the roster and ranking history routes answer 503
    let store = match &settings.database.url {
        Some(url) => {
            let store = RankingStore::from_settings(
                url,
                settings.database.max_connections,
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| to_io_error("PostgreSQL connection error", e))?;
            info!("PostgreSQL store initialized");
            Some(Arc::new(store))
        }
        None => {
            info!("No database configured, persistence disabled");
            None
        }
    };

    // Build application state
    let app_state = AppState {
        listing_filter,
        ranking,
        summarizer,
        store,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
