//! PostgreSQL implementation of the pricing repositories

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::pricing::calendar::DateRange;
use crate::pricing::models::{Property, Reservation, SeasonalPricingRule};
use crate::pricing::queries;
use crate::pricing::repository::{PricingRepository, PropertyRepository, ReservationRepository};
use crate::pricing::PricingError;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn repo_err(e: AppError) -> PricingError {
    PricingError::Repository(e.to_string())
}

#[async_trait]
impl PropertyRepository for PgStore {
    async fn find_property(&self, id: Uuid) -> Result<Option<Property>, PricingError> {
        queries::find_property(&self.pool, id).await.map_err(repo_err)
    }

    async fn list_active_property_ids(&self) -> Result<Vec<Uuid>, PricingError> {
        queries::list_active_property_ids(&self.pool)
            .await
            .map_err(repo_err)
    }
}

#[async_trait]
impl PricingRepository for PgStore {
    async fn seasonal_rules(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<SeasonalPricingRule>, PricingError> {
        let rules = queries::find_seasonal_rules(&self.pool, property_id)
            .await
            .map_err(repo_err)?;
        debug!("Loaded {} seasons for property {}", rules.len(), property_id);
        Ok(rules)
    }
}

#[async_trait]
impl ReservationRepository for PgStore {
    async fn find_overlapping(
        &self,
        property_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<Reservation>, PricingError> {
        let rows = queries::find_blocked_ranges(&self.pool, property_id, range.start, range.end)
            .await
            .map_err(repo_err)?;
        Ok(rows.into_iter().map(Reservation::from).collect())
    }
}
