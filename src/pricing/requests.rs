//! Request DTOs for pricing API endpoints.

use serde::Deserialize;
use uuid::Uuid;

use super::calendar::CivilCalendar;
use super::error::PricingError;
use super::models::PriceQuery;

/// Body of `POST /api/pricing/quote`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub property_id: Uuid,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
}

impl QuoteRequest {
    pub fn into_query(self, calendar: &CivilCalendar) -> Result<PriceQuery, PricingError> {
        StayParams {
            check_in: self.check_in,
            check_out: self.check_out,
        }
        .into_query(self.property_id, calendar)
    }
}

/// `?checkIn=..&checkOut=..` on the property endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayParams {
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
}

impl StayParams {
    /// Parse and validate both dates. Missing, unparseable or inverted
    /// dates are all reported as `InvalidRange`.
    pub fn into_query(
        self,
        property_id: Uuid,
        calendar: &CivilCalendar,
    ) -> Result<PriceQuery, PricingError> {
        let check_in = self
            .check_in
            .ok_or_else(|| PricingError::invalid_range("checkIn is required"))?;
        let check_out = self
            .check_out
            .ok_or_else(|| PricingError::invalid_range("checkOut is required"))?;

        let range = calendar.parse_stay(&check_in, &check_out)?;
        Ok(PriceQuery::new(property_id, range.start, range.end))
    }
}

/// `?year=` on the seasons endpoint
#[derive(Debug, Default, Deserialize)]
pub struct SeasonsParams {
    #[serde(default)]
    pub year: Option<i32>,
}

/// Body of `POST /api/admin/cache/invalidate`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateCacheRequest {
    #[serde(default)]
    pub property_id: Option<Uuid>,
}
