//! Pricing service with repository and cache access.
//!
//! Loads the property, its seasons and the overlapping reservations, then
//! hands them to the pure calculators.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::AppCache;

use super::calculators::{calculate_stay, conflicting_reservations, find_rule_overlaps};
use super::calendar::{CivilCalendar, DateRange, SeasonWindow};
use super::error::PricingError;
use super::models::{AvailabilityResult, PriceQuery, PriceResult, Property, SeasonalPricingRule};
use super::repository::{PricingRepository, PropertyRepository, ReservationRepository};

/// Behavior switches for the pricing service
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingSettings {
    pub calendar: CivilCalendar,
    /// Fail rule loading when seasons overlap instead of logging a warning
    pub strict_seasons: bool,
}

pub struct PricingService {
    properties: Arc<dyn PropertyRepository>,
    pricing: Arc<dyn PricingRepository>,
    reservations: Arc<dyn ReservationRepository>,
    cache: AppCache,
    settings: PricingSettings,
}

impl PricingService {
    pub fn new(
        properties: Arc<dyn PropertyRepository>,
        pricing: Arc<dyn PricingRepository>,
        reservations: Arc<dyn ReservationRepository>,
        cache: AppCache,
        settings: PricingSettings,
    ) -> Self {
        Self {
            properties,
            pricing,
            reservations,
            cache,
            settings,
        }
    }

    pub fn calendar(&self) -> &CivilCalendar {
        &self.settings.calendar
    }

    pub fn cache(&self) -> &AppCache {
        &self.cache
    }

    /// Quote a stay: per-night prices plus the nights that are already taken.
    ///
    /// The range is validated before any storage access.
    pub async fn quote(&self, query: &PriceQuery) -> Result<PriceResult, PricingError> {
        let range = self.stay_range(query)?;

        let property = self.load_property(query.property_id).await?;
        let rules = self.load_rules(query.property_id).await?;
        let reservations = self
            .reservations
            .find_overlapping(query.property_id, range)
            .await?;

        let result = calculate_stay(query, &property, &rules, &reservations)?;

        info!(
            property_id = %query.property_id,
            check_in = %query.check_in,
            check_out = %query.check_out,
            nights = result.nights,
            total = %result.total_price,
            available = result.is_available,
            "Quoted stay"
        );

        Ok(result)
    }

    /// Availability only: skips season loading and per-night pricing.
    pub async fn check_availability(
        &self,
        query: &PriceQuery,
    ) -> Result<AvailabilityResult, PricingError> {
        let range = self.stay_range(query)?;

        self.load_property(query.property_id).await?;
        let reservations = self
            .reservations
            .find_overlapping(query.property_id, range)
            .await?;

        let conflicts: Vec<_> = conflicting_reservations(query.property_id, &range, &reservations)
            .into_iter()
            .cloned()
            .collect();

        debug!(
            property_id = %query.property_id,
            conflicts = conflicts.len(),
            "Checked availability"
        );

        Ok(AvailabilityResult {
            property_id: query.property_id,
            available: conflicts.is_empty(),
            conflicts,
        })
    }

    /// Seasons of a property that touch `year`, earliest first.
    pub async fn season_calendar(
        &self,
        property_id: Uuid,
        year: i32,
    ) -> Result<Vec<SeasonalPricingRule>, PricingError> {
        let (first, last) = match (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(PricingError::invalid_range(format!(
                    "year {} is out of range",
                    year
                )))
            }
        };
        let year_window = SeasonWindow::new(first, last);

        self.load_property(property_id).await?;
        let rules = self.load_rules(property_id).await?;

        let mut seasons: Vec<SeasonalPricingRule> = rules
            .iter()
            .filter(|rule| rule.window().intersection(&year_window).is_some())
            .cloned()
            .collect();
        seasons.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));

        Ok(seasons)
    }

    /// Ids of every bookable property.
    pub async fn active_property_ids(&self) -> Result<Vec<Uuid>, PricingError> {
        self.properties.list_active_property_ids().await
    }

    /// Load a property and its seasons into the cache.
    pub async fn preload(&self, property_id: Uuid) -> Result<(), PricingError> {
        self.load_property(property_id).await?;
        self.load_rules(property_id).await?;
        Ok(())
    }

    /// Drop cached data for one property (after an admin edit).
    pub async fn invalidate_property(&self, property_id: Uuid) {
        self.cache.invalidate_property(property_id).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    fn stay_range(&self, query: &PriceQuery) -> Result<DateRange, PricingError> {
        query
            .range()?
            .limited_to(self.settings.calendar.max_stay_nights())
    }

    async fn load_property(&self, property_id: Uuid) -> Result<Arc<Property>, PricingError> {
        if let Some(cached) = self.cache.properties.get(&property_id).await {
            debug!("Cache HIT for property: {}", property_id);
            return Ok(cached);
        }

        debug!("Cache MISS for property: {}", property_id);
        let property = self
            .properties
            .find_property(property_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(PricingError::PropertyNotFound { property_id })?;

        let property = Arc::new(property);
        self.cache
            .properties
            .insert(property_id, property.clone())
            .await;

        Ok(property)
    }

    async fn load_rules(
        &self,
        property_id: Uuid,
    ) -> Result<Arc<Vec<SeasonalPricingRule>>, PricingError> {
        if let Some(cached) = self.cache.seasons.get(&property_id).await {
            return Ok(cached);
        }

        let rules = self.pricing.seasonal_rules(property_id).await?;
        let rules = Arc::new(self.audit_rules(property_id, rules)?);
        self.cache.seasons.insert(property_id, rules.clone()).await;

        Ok(rules)
    }

    /// Check freshly loaded seasons. Broken rules and overlaps are logged and
    /// tolerated, or rejected outright in strict mode.
    fn audit_rules(
        &self,
        property_id: Uuid,
        rules: Vec<SeasonalPricingRule>,
    ) -> Result<Vec<SeasonalPricingRule>, PricingError> {
        let mut errors: Vec<String> = Vec::new();
        let mut usable = Vec::with_capacity(rules.len());

        for rule in rules {
            let problems = rule.problems();
            if problems.is_empty() {
                usable.push(rule);
            } else {
                errors.extend(problems);
            }
        }

        let overlaps = find_rule_overlaps(&usable);
        if self.settings.strict_seasons {
            errors.extend(overlaps.iter().map(|o| o.to_string()));
            if !errors.is_empty() {
                return Err(PricingError::Configuration {
                    message: format!("seasonal pricing for property {} is inconsistent", property_id),
                    errors,
                });
            }
        } else {
            for problem in &errors {
                warn!(%property_id, "Skipping unusable season: {}", problem);
            }
            for overlap in &overlaps {
                warn!(%property_id, "Overlapping seasons, narrowest wins: {}", overlap);
            }
        }

        Ok(usable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryStore;
    use crate::pricing::models::{BlockSource, RecurringSeason, Reservation};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn service_with(store: Arc<InMemoryStore>, strict: bool) -> PricingService {
        PricingService::new(
            store.clone(),
            store.clone(),
            store,
            AppCache::default(),
            PricingSettings {
                calendar: CivilCalendar::default(),
                strict_seasons: strict,
            },
        )
    }

    fn seeded() -> (Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let id = store.add_property("Villa Sunset", dec!(1000), "THB");
        (store, id)
    }

    fn rule(property_id: Uuid, label: &str, start: NaiveDate, end: NaiveDate, price: Decimal) -> SeasonalPricingRule {
        SeasonalPricingRule {
            id: Uuid::new_v4(),
            property_id,
            season_label: label.to_string(),
            start_date: start,
            end_date: end,
            price_per_night: price,
            minimum_nights: 1,
        }
    }

    #[tokio::test]
    async fn test_quote_unknown_property() {
        let store = Arc::new(InMemoryStore::new());
        let service = service_with(store, false);
        let id = Uuid::new_v4();

        let err = service
            .quote(&PriceQuery::new(id, d(2024, 3, 1), d(2024, 3, 4)))
            .await
            .unwrap_err();
        assert_eq!(err, PricingError::PropertyNotFound { property_id: id });
    }

    #[tokio::test]
    async fn test_quote_inactive_property() {
        let (store, id) = seeded();
        store.set_active(id, false);
        let service = service_with(store, false);

        let err = service
            .quote(&PriceQuery::new(id, d(2024, 3, 1), d(2024, 3, 4)))
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::PropertyNotFound { .. }));
    }

    #[tokio::test]
    async fn test_invalid_range_checked_before_storage() {
        let (store, id) = seeded();
        let service = service_with(store.clone(), false);

        let err = service
            .quote(&PriceQuery::new(id, d(2024, 3, 4), d(2024, 3, 4)))
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidRange { .. }));
        assert_eq!(store.property_lookups(), 0);
    }

    #[tokio::test]
    async fn test_overlong_stay_rejected_before_storage() {
        let (store, id) = seeded();
        let service = service_with(store.clone(), false);

        let err = service
            .quote(&PriceQuery::new(id, d(1, 1, 1), d(9999, 12, 31)))
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidRange { .. }));

        let err = service
            .check_availability(&PriceQuery::new(id, d(2024, 1, 1), d(2025, 1, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidRange { .. }));
        assert_eq!(store.property_lookups(), 0);

        let year = service
            .quote(&PriceQuery::new(id, d(2025, 1, 1), d(2026, 1, 1)))
            .await
            .unwrap();
        assert_eq!(year.nights, 365);
    }

    #[tokio::test]
    async fn test_quote_combines_seasons_and_blocks() {
        let (store, id) = seeded();
        store.add_rule(rule(id, "high", d(2024, 3, 1), d(2024, 3, 2), dec!(1500)));
        store.add_reservation(Reservation {
            property_id: id,
            start_date: d(2024, 3, 3),
            end_date: d(2024, 3, 6),
            source: BlockSource::CalendarBlock,
        });
        let service = service_with(store, false);

        let result = service
            .quote(&PriceQuery::new(id, d(2024, 3, 1), d(2024, 3, 4)))
            .await
            .unwrap();

        assert_eq!(result.total_price, dec!(4000));
        assert_eq!(result.unavailable_dates, vec![d(2024, 3, 3)]);
        assert!(!result.is_available);
        assert_eq!(result.currency, "THB");
    }

    #[tokio::test]
    async fn test_property_cached_between_quotes() {
        let (store, id) = seeded();
        let service = service_with(store.clone(), false);
        let query = PriceQuery::new(id, d(2024, 3, 1), d(2024, 3, 4));

        service.quote(&query).await.unwrap();
        service.quote(&query).await.unwrap();

        assert_eq!(store.property_lookups(), 1);
    }

    #[tokio::test]
    async fn test_invalidation_picks_up_new_seasons() {
        let (store, id) = seeded();
        let service = service_with(store.clone(), false);
        let query = PriceQuery::new(id, d(2024, 3, 1), d(2024, 3, 4));

        assert_eq!(service.quote(&query).await.unwrap().total_price, dec!(3000));

        store.add_rule(rule(id, "high", d(2024, 3, 1), d(2024, 3, 31), dec!(2000)));
        // Still served from cache
        assert_eq!(service.quote(&query).await.unwrap().total_price, dec!(3000));

        service.invalidate_property(id).await;
        assert_eq!(service.quote(&query).await.unwrap().total_price, dec!(6000));
    }

    #[tokio::test]
    async fn test_reservations_never_cached() {
        let (store, id) = seeded();
        let service = service_with(store.clone(), false);
        let query = PriceQuery::new(id, d(2024, 3, 1), d(2024, 3, 4));

        assert!(service.quote(&query).await.unwrap().is_available);

        store.add_reservation(Reservation {
            property_id: id,
            start_date: d(2024, 3, 2),
            end_date: d(2024, 3, 3),
            source: BlockSource::Booking,
        });
        let result = service.quote(&query).await.unwrap();
        assert!(!result.is_available);
        assert_eq!(result.unavailable_dates, vec![d(2024, 3, 2)]);
    }

    #[tokio::test]
    async fn test_overlapping_seasons_lenient() {
        let (store, id) = seeded();
        store.add_rule(rule(id, "high", d(2024, 12, 1), d(2025, 1, 31), dec!(3000)));
        store.add_rule(rule(id, "peak", d(2024, 12, 24), d(2025, 1, 2), dec!(5000)));
        let service = service_with(store, false);

        let result = service
            .quote(&PriceQuery::new(id, d(2024, 12, 23), d(2024, 12, 26)))
            .await
            .unwrap();
        let prices: Vec<Decimal> = result.breakdown.iter().map(|n| n.price).collect();
        assert_eq!(prices, vec![dec!(3000), dec!(5000), dec!(5000)]);
    }

    #[tokio::test]
    async fn test_overlapping_seasons_strict() {
        let (store, id) = seeded();
        store.add_rule(rule(id, "high", d(2024, 12, 1), d(2025, 1, 31), dec!(3000)));
        store.add_rule(rule(id, "peak", d(2024, 12, 24), d(2025, 1, 2), dec!(5000)));
        let service = service_with(store, true);

        let err = service
            .quote(&PriceQuery::new(id, d(2024, 12, 23), d(2024, 12, 26)))
            .await
            .unwrap_err();
        match err {
            PricingError::Configuration { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("peak"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_priced_season_strict() {
        let (store, id) = seeded();
        store.add_rule(rule(id, "free", d(2024, 3, 1), d(2024, 3, 10), dec!(0)));

        let err = service_with(store.clone(), true)
            .quote(&PriceQuery::new(id, d(2024, 3, 1), d(2024, 3, 3)))
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::Configuration { .. }));

        // Lenient mode skips the rule and falls back to the base price
        let result = service_with(store, false)
            .quote(&PriceQuery::new(id, d(2024, 3, 1), d(2024, 3, 3)))
            .await
            .unwrap();
        assert_eq!(result.total_price, dec!(2000));
    }

    #[tokio::test]
    async fn test_broken_season_skipped_when_lenient() {
        let (store, id) = seeded();
        store.add_rule(rule(id, "typo", d(2024, 3, 10), d(2024, 3, 1), dec!(9000)));
        let service = service_with(store, false);

        let result = service
            .quote(&PriceQuery::new(id, d(2024, 3, 1), d(2024, 3, 3)))
            .await
            .unwrap();
        assert_eq!(result.total_price, dec!(2000));
    }

    #[tokio::test]
    async fn test_check_availability_lists_conflicts() {
        let (store, id) = seeded();
        store.add_reservation(Reservation {
            property_id: id,
            start_date: d(2024, 3, 1),
            end_date: d(2024, 3, 5),
            source: BlockSource::Booking,
        });
        let service = service_with(store, false);

        let free = service
            .check_availability(&PriceQuery::new(id, d(2024, 3, 5), d(2024, 3, 7)))
            .await
            .unwrap();
        assert!(free.available);
        assert!(free.conflicts.is_empty());

        let taken = service
            .check_availability(&PriceQuery::new(id, d(2024, 3, 4), d(2024, 3, 7)))
            .await
            .unwrap();
        assert!(!taken.available);
        assert_eq!(taken.conflicts.len(), 1);
    }

    #[tokio::test]
    async fn test_season_calendar_for_year() {
        let (store, id) = seeded();
        let festive = RecurringSeason {
            id: Uuid::new_v4(),
            season_label: "festive".to_string(),
            start_month: 12,
            start_day: 20,
            end_month: 1,
            end_day: 5,
            price_per_night: dec!(4000),
            minimum_nights: 5,
        };
        store.add_recurring_season(id, &festive, 2024..=2025).unwrap();
        store.add_rule(rule(id, "green", d(2025, 6, 1), d(2025, 9, 30), dec!(800)));
        let service = service_with(store, false);

        let seasons = service.season_calendar(id, 2025).await.unwrap();
        let starts: Vec<NaiveDate> = seasons.iter().map(|s| s.start_date).collect();
        // Wrap-in from 2024, green season, then the 2025 festive season
        assert_eq!(starts, vec![d(2024, 12, 20), d(2025, 6, 1), d(2025, 12, 20)]);
    }

    #[tokio::test]
    async fn test_preload_fills_cache() {
        let (store, id) = seeded();
        let service = service_with(store, false);

        service.preload(id).await.unwrap();
        service.cache().properties.run_pending_tasks().await;
        service.cache().seasons.run_pending_tasks().await;
        assert_eq!(service.cache().stats().properties_size, 1);
        assert_eq!(service.cache().stats().seasons_size, 1);
    }
}
