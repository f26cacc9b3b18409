//! Database queries for the pricing engine.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

use super::models::{Property, ReservationRow, SeasonalPricingRule};

/// Get a property by id
pub async fn find_property(pool: &PgPool, id: Uuid) -> Result<Option<Property>> {
    let property = sqlx::query_as::<_, Property>(
        r#"
        SELECT id, name, base_price, currency, is_active
        FROM properties
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(property)
}

/// Ids of all active properties (for cache warming)
pub async fn list_active_property_ids(pool: &PgPool) -> Result<Vec<Uuid>> {
    let ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT id
        FROM properties
        WHERE is_active = true
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// All seasonal rules of a property
pub async fn find_seasonal_rules(
    pool: &PgPool,
    property_id: Uuid,
) -> Result<Vec<SeasonalPricingRule>> {
    let rules = sqlx::query_as::<_, SeasonalPricingRule>(
        r#"
        SELECT
            id, property_id, season_label,
            start_date, end_date,
            price_per_night, minimum_nights
        FROM seasonal_pricing
        WHERE property_id = $1
        ORDER BY start_date, id
        "#,
    )
    .bind(property_id)
    .fetch_all(pool)
    .await?;

    Ok(rules)
}

/// Bookings and synced calendar blocks overlapping `[start, end)`
pub async fn find_blocked_ranges(
    pool: &PgPool,
    property_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ReservationRow>> {
    let rows = sqlx::query_as::<_, ReservationRow>(
        r#"
        SELECT property_id, start_date, end_date, 'booking' AS source
        FROM reservations
        WHERE property_id = $1
          AND status IN ('confirmed', 'pending')
          AND start_date < $3
          AND end_date > $2
        UNION ALL
        SELECT property_id, start_date, end_date, 'calendar' AS source
        FROM blocked_dates
        WHERE property_id = $1
          AND start_date < $3
          AND end_date > $2
        ORDER BY start_date
        "#,
    )
    .bind(property_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
