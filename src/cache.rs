//! In-memory caching using moka
//!
//! Holds per-property pricing data: the property row and its seasonal rules.
//! Reservations are never cached, availability must always be read fresh.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::pricing::models::{Property, SeasonalPricingRule};
use crate::pricing::PricingService;

/// Default time-to-live for cached pricing data
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Application cache holding properties and their seasonal rules
#[derive(Clone)]
pub struct AppCache {
    /// Properties (id -> Property)
    pub properties: Cache<Uuid, Arc<Property>>,
    /// Seasonal rules (property id -> audited rules)
    pub seasons: Cache<Uuid, Arc<Vec<SeasonalPricingRule>>>,
}

impl AppCache {
    /// Create a new cache instance with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            // Properties: 1000 entries, idle entries dropped after half the TTL
            properties: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .time_to_idle(ttl / 2)
                .build(),

            // Season rule sets: one per property
            seasons: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .time_to_idle(ttl / 2)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            properties_size: self.properties.entry_count(),
            seasons_size: self.seasons.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.properties.invalidate_all();
        self.seasons.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate one property and its seasons
    pub async fn invalidate_property(&self, property_id: Uuid) {
        self.properties.invalidate(&property_id).await;
        self.seasons.invalidate(&property_id).await;
        info!("Cache invalidated for property: {}", property_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub properties_size: u64,
    pub seasons_size: u64,
}

const MIN_WARM_INTERVAL: Duration = Duration::from_secs(1);

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes on every `every` tick. Periods
/// under a second are raised to one second.
pub async fn start_cache_warmer(service: Arc<PricingService>, every: Duration) {
    let mut interval = interval(every.max(MIN_WARM_INTERVAL));
    loop {
        // First tick completes immediately
        interval.tick().await;
        warm_cache(&service).await;
    }
}

/// Load every active property and its seasons into the cache
pub async fn warm_cache(service: &PricingService) {
    info!("Starting cache warm-up...");

    let ids = match service.active_property_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Failed to list properties for cache warm-up: {}", e);
            return;
        }
    };

    let mut warmed = 0usize;
    for id in ids {
        match service.preload(id).await {
            Ok(()) => warmed += 1,
            Err(e) => warn!("Failed to warm pricing cache for {}: {}", id, e),
        }
    }

    info!(
        "Cache warm-up complete ({} properties). Stats: {:?}",
        warmed,
        service.cache().stats()
    );
}
