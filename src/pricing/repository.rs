//! Storage interfaces the pricing service reads through.

use async_trait::async_trait;
use uuid::Uuid;

use super::calendar::DateRange;
use super::error::PricingError;
use super::models::{Property, Reservation, SeasonalPricingRule};

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Find a property by id (active or not)
    async fn find_property(&self, id: Uuid) -> Result<Option<Property>, PricingError>;

    /// Ids of all bookable properties (for cache warming)
    async fn list_active_property_ids(&self) -> Result<Vec<Uuid>, PricingError>;
}

#[async_trait]
pub trait PricingRepository: Send + Sync {
    /// All seasonal rules of a property, any year
    async fn seasonal_rules(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<SeasonalPricingRule>, PricingError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Bookings and calendar blocks of a property that overlap `range`
    async fn find_overlapping(
        &self,
        property_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<Reservation>, PricingError>;
}
