//! In-memory storage implementation

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::pricing::calendar::DateRange;
use crate::pricing::models::{Property, RecurringSeason, Reservation, SeasonalPricingRule};
use crate::pricing::repository::{PricingRepository, PropertyRepository, ReservationRepository};
use crate::pricing::PricingError;

/// In-memory storage for development and testing
#[derive(Default)]
pub struct InMemoryStore {
    properties: DashMap<Uuid, Property>,
    rules: DashMap<Uuid, Vec<SeasonalPricingRule>>,
    reservations: DashMap<Uuid, Vec<Reservation>>,
    property_lookups: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an active property and return its id
    pub fn add_property(&self, name: &str, base_price: Decimal, currency: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.insert_property(Property {
            id,
            name: name.to_string(),
            base_price,
            currency: currency.to_string(),
            is_active: true,
        });
        id
    }

    pub fn insert_property(&self, property: Property) {
        self.properties.insert(property.id, property);
    }

    pub fn set_active(&self, property_id: Uuid, active: bool) {
        if let Some(mut property) = self.properties.get_mut(&property_id) {
            property.is_active = active;
        }
    }

    pub fn add_rule(&self, rule: SeasonalPricingRule) {
        self.rules.entry(rule.property_id).or_default().push(rule);
    }

    /// Store one absolute rule per year for a day-month season
    pub fn add_recurring_season(
        &self,
        property_id: Uuid,
        season: &RecurringSeason,
        years: RangeInclusive<i32>,
    ) -> Result<(), PricingError> {
        for year in years {
            let mut rule = season.for_year(property_id, year)?;
            // Each occurrence is its own row
            rule.id = Uuid::new_v4();
            self.add_rule(rule);
        }
        Ok(())
    }

    pub fn add_reservation(&self, reservation: Reservation) {
        self.reservations
            .entry(reservation.property_id)
            .or_default()
            .push(reservation);
    }

    /// How many times a property was read from storage
    pub fn property_lookups(&self) -> usize {
        self.property_lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PropertyRepository for InMemoryStore {
    async fn find_property(&self, id: Uuid) -> Result<Option<Property>, PricingError> {
        self.property_lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.properties.get(&id).map(|p| p.clone()))
    }

    async fn list_active_property_ids(&self) -> Result<Vec<Uuid>, PricingError> {
        Ok(self
            .properties
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.id)
            .collect())
    }
}

#[async_trait]
impl PricingRepository for InMemoryStore {
    async fn seasonal_rules(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<SeasonalPricingRule>, PricingError> {
        let mut rules = self
            .rules
            .get(&property_id)
            .map(|r| r.clone())
            .unwrap_or_default();
        rules.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(rules)
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn find_overlapping(
        &self,
        property_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<Reservation>, PricingError> {
        Ok(self
            .reservations
            .get(&property_id)
            .map(|all| {
                all.iter()
                    .filter(|r| r.range().overlaps(&range))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::BlockSource;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_find_overlapping_uses_half_open_ranges() {
        let store = InMemoryStore::new();
        let id = store.add_property("Villa", dec!(1000), "THB");
        store.add_reservation(Reservation {
            property_id: id,
            start_date: d(2024, 3, 1),
            end_date: d(2024, 3, 5),
            source: BlockSource::Booking,
        });

        let touching = store
            .find_overlapping(id, DateRange::new(d(2024, 3, 5), d(2024, 3, 7)))
            .await
            .unwrap();
        assert!(touching.is_empty());

        let overlapping = store
            .find_overlapping(id, DateRange::new(d(2024, 3, 4), d(2024, 3, 7)))
            .await
            .unwrap();
        assert_eq!(overlapping.len(), 1);
    }

    #[tokio::test]
    async fn test_recurring_season_stored_per_year() {
        let store = InMemoryStore::new();
        let id = store.add_property("Villa", dec!(1000), "THB");
        let season = RecurringSeason {
            id: Uuid::new_v4(),
            season_label: "songkran".to_string(),
            start_month: 4,
            start_day: 10,
            end_month: 4,
            end_day: 17,
            price_per_night: dec!(2200),
            minimum_nights: 2,
        };

        store.add_recurring_season(id, &season, 2024..=2026).unwrap();
        let rules = store.seasonal_rules(id).await.unwrap();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].start_date, d(2024, 4, 10));
        assert_eq!(rules[2].end_date, d(2026, 4, 17));
    }

    #[tokio::test]
    async fn test_inactive_properties_not_listed() {
        let store = InMemoryStore::new();
        let a = store.add_property("A", dec!(1000), "THB");
        let b = store.add_property("B", dec!(1000), "THB");
        store.set_active(b, false);

        assert_eq!(store.list_active_property_ids().await.unwrap(), vec![a]);
    }
}
