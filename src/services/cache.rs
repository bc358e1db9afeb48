use crate::models::Coordinate;
use crate::services::geocoding::{GeocodeError, Geocoder};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a geocoding query
    pub fn geocode(query: &str) -> String {
        let normalized = query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        format!("geocode:{}", normalized)
    }
}

/// Multi-tier cache in front of a geocoder
///
/// L1 is an in-process moka cache, L2 an optional Redis shared across
/// instances. Not-found answers are cached as well; provider errors are not.
/// Redis failures are logged and the lookup continues without L2.
pub struct CachedGeocoder<G> {
    inner: G,
    l1_cache: moka::future::Cache<String, Option<Coordinate>>,
    redis: Option<ConnectionManager>,
    ttl_secs: u64,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            inner,
            l1_cache,
            redis: None,
            ttl_secs,
        }
    }

    /// Add a Redis second tier; on failure the cache stays L1-only
    pub async fn enable_redis(&mut self, redis_url: &str) -> Result<(), CacheError> {
        let client = redis::Client::open(redis_url)?;
        self.redis = Some(ConnectionManager::new(client).await?);
        Ok(())
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    async fn l2_get(&self, key: &str) -> Result<Option<Option<Coordinate>>, CacheError> {
        let Some(redis) = &self.redis else {
            return Ok(None);
        };

        let mut conn = redis.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn l2_set(&self, key: &str, value: &Option<Coordinate>) -> Result<(), CacheError> {
        let Some(redis) = &self.redis else {
            return Ok(());
        };

        let json = serde_json::to_string(value)?;
        let mut conn = redis.clone();
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(self.ttl_secs)
            .arg(json)
            .query_async(&mut conn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let key = CacheKey::geocode(query);

        if let Some(hit) = self.l1_cache.get(&key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(hit);
        }

        match self.l2_get(&key).await {
            Ok(Some(hit)) => {
                tracing::trace!("L2 cache hit: {}", key);
                self.l1_cache.insert(key, hit).await;
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Geocode cache read failed for {}: {}", key, e),
        }

        tracing::trace!("Cache miss: {}", key);
        let result = self.inner.geocode(query).await?;

        if let Err(e) = self.l2_set(&key, &result).await {
            tracing::warn!("Geocode cache write failed for {}: {}", key, e);
        }
        self.l1_cache.insert(key, result).await;

        Ok(result)
    }
}
