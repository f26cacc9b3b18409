//! Response DTOs for pricing API endpoints.
//!
//! Money is rounded to two places here and serialized as JSON numbers; the
//! domain types keep full precision.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::round_money;
use super::models::{AvailabilityResult, NightPrice, PriceResult, Reservation, SeasonalPricingRule};

/// Decimal places shown to guests
pub const DISPLAY_PLACES: u32 = 2;

/// One night of the breakdown
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NightPriceResponse {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub season_type: String,
    pub unavailable: bool,
}

impl From<NightPrice> for NightPriceResponse {
    fn from(night: NightPrice) -> Self {
        Self {
            date: night.date,
            price: round_money(night.price, DISPLAY_PLACES),
            season_type: night.season_type,
            unavailable: night.unavailable,
        }
    }
}

/// Response for a stay quote
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuoteResponse {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub available: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_night: Decimal,
    pub nights: i64,
    pub currency: String,
    pub minimum_nights: u32,
    pub meets_minimum_stay: bool,
    pub unavailable_dates: Vec<NaiveDate>,
    pub breakdown: Vec<NightPriceResponse>,
}

impl From<PriceResult> for PriceQuoteResponse {
    fn from(result: PriceResult) -> Self {
        Self {
            property_id: result.property_id,
            check_in: result.check_in,
            check_out: result.check_out,
            available: result.is_available,
            total_price: round_money(result.total_price, DISPLAY_PLACES),
            price_per_night: round_money(result.price_per_night, DISPLAY_PLACES),
            nights: result.nights,
            currency: result.currency,
            minimum_nights: result.minimum_nights,
            meets_minimum_stay: result.meets_minimum_stay,
            unavailable_dates: result.unavailable_dates,
            breakdown: result.breakdown.into_iter().map(Into::into).collect(),
        }
    }
}

/// A reservation that blocks the requested stay
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: String,
}

impl From<Reservation> for ConflictResponse {
    fn from(r: Reservation) -> Self {
        Self {
            start_date: r.start_date,
            end_date: r.end_date,
            source: r.source.as_str().to_string(),
        }
    }
}

/// Response for an availability check
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub property_id: Uuid,
    pub available: bool,
    pub conflicts: Vec<ConflictResponse>,
}

impl From<AvailabilityResult> for AvailabilityResponse {
    fn from(result: AvailabilityResult) -> Self {
        Self {
            property_id: result.property_id,
            available: result.available,
            conflicts: result.conflicts.into_iter().map(Into::into).collect(),
        }
    }
}

/// One row of the season table
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonResponse {
    pub season_label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_night: Decimal,
    pub minimum_nights: u32,
}

impl From<SeasonalPricingRule> for SeasonResponse {
    fn from(rule: SeasonalPricingRule) -> Self {
        Self {
            minimum_nights: rule.effective_minimum_nights(),
            price_per_night: round_money(rule.price_per_night, DISPLAY_PLACES),
            season_label: rule.season_label,
            start_date: rule.start_date,
            end_date: rule.end_date,
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
