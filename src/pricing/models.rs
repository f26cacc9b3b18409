//! Pricing domain models.
//!
//! Rows loaded from the database use sqlx's FromRow derive; the rest are
//! plain values passed between the service and the calculators.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::calendar::{day_month_in_year, DateRange, SeasonWindow};
use super::error::PricingError;

/// Season label reported for nights priced at the property's base rate.
pub const BASE_SEASON: &str = "base";

/// Property from properties
#[derive(Debug, Clone, FromRow)]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub base_price: Decimal,
    pub currency: String,
    pub is_active: bool,
}

/// Where a blocked range came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockSource {
    Booking,
    CalendarBlock,
}

impl BlockSource {
    pub fn from_str(s: &str) -> Self {
        match s {
            "calendar" | "calendar_block" => BlockSource::CalendarBlock,
            _ => BlockSource::Booking,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BlockSource::Booking => "booking",
            BlockSource::CalendarBlock => "calendar_block",
        }
    }
}

/// A booked or blocked range, half-open `[start_date, end_date)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: BlockSource,
}

impl Reservation {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Row shape shared by reservations and blocked_dates queries
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRow {
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: String,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            property_id: row.property_id,
            start_date: row.start_date,
            end_date: row.end_date,
            source: BlockSource::from_str(&row.source),
        }
    }
}

/// Seasonal rate from seasonal_pricing. The window is closed: both
/// `start_date` and `end_date` are priced at this rate.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SeasonalPricingRule {
    pub id: Uuid,
    pub property_id: Uuid,
    pub season_label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_per_night: Decimal,
    pub minimum_nights: i32,
}

impl SeasonalPricingRule {
    pub fn window(&self) -> SeasonWindow {
        SeasonWindow::new(self.start_date, self.end_date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.window().contains(date)
    }

    pub fn span_days(&self) -> i64 {
        self.window().span_days()
    }

    /// Minimum stay, treating zero or negative values as "no minimum".
    pub fn effective_minimum_nights(&self) -> u32 {
        self.minimum_nights.max(1) as u32
    }

    /// Problems that make this rule unusable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.end_date < self.start_date {
            problems.push(format!(
                "season '{}' ({}) ends {} before it starts {}",
                self.season_label, self.id, self.end_date, self.start_date
            ));
        }
        if self.price_per_night <= Decimal::ZERO {
            problems.push(format!(
                "season '{}' ({}) has non-positive price {}",
                self.season_label, self.id, self.price_per_night
            ));
        }
        problems
    }
}

/// Year-agnostic season as entered in the admin form (day and month only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSeason {
    pub id: Uuid,
    pub season_label: String,
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
    pub price_per_night: Decimal,
    pub minimum_nights: i32,
}

impl RecurringSeason {
    /// Whether the window runs past 31 December into the next year.
    pub fn wraps_year(&self) -> bool {
        (self.end_month, self.end_day) < (self.start_month, self.start_day)
    }

    /// The occurrence that starts in `year`, as an absolute rule.
    pub fn for_year(
        &self,
        property_id: Uuid,
        year: i32,
    ) -> Result<SeasonalPricingRule, PricingError> {
        let end_year = if self.wraps_year() { year + 1 } else { year };
        let start_date = day_month_in_year(year, self.start_month, self.start_day);
        let end_date = day_month_in_year(end_year, self.end_month, self.end_day);

        match (start_date, end_date) {
            (Some(start_date), Some(end_date)) => Ok(SeasonalPricingRule {
                id: self.id,
                property_id,
                season_label: self.season_label.clone(),
                start_date,
                end_date,
                price_per_night: self.price_per_night,
                minimum_nights: self.minimum_nights,
            }),
            _ => Err(PricingError::Configuration {
                message: format!("season '{}' has an invalid day or month", self.season_label),
                errors: vec![format!(
                    "{:02}-{:02} .. {:02}-{:02}",
                    self.start_month, self.start_day, self.end_month, self.end_day
                )],
            }),
        }
    }
}

/// Ephemeral quote input. `check_in < check_out` is checked by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuery {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl PriceQuery {
    pub fn new(property_id: Uuid, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            property_id,
            check_in,
            check_out,
        }
    }

    pub fn range(&self) -> Result<DateRange, PricingError> {
        DateRange::checked(self.check_in, self.check_out)
    }
}

/// Price that applies to a single night
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrice {
    pub price: Decimal,
    pub season_type: String,
    pub minimum_nights: u32,
    pub rule_id: Option<Uuid>,
}

/// One line of the per-night breakdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightPrice {
    pub date: NaiveDate,
    pub price: Decimal,
    pub season_type: String,
    pub unavailable: bool,
}

/// Full quote for a stay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceResult {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub total_price: Decimal,
    /// Average over the stay, unrounded.
    pub price_per_night: Decimal,
    pub currency: String,
    pub is_available: bool,
    pub unavailable_dates: Vec<NaiveDate>,
    pub breakdown: Vec<NightPrice>,
    pub minimum_nights: u32,
    pub meets_minimum_stay: bool,
}

/// Result of an availability-only check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityResult {
    pub property_id: Uuid,
    pub available: bool,
    pub conflicts: Vec<Reservation>,
}

/// Two seasons of the same property whose windows share at least one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOverlap {
    pub property_id: Uuid,
    pub first: Uuid,
    pub second: Uuid,
    pub first_label: String,
    pub second_label: String,
    pub shared: SeasonWindow,
}

impl std::fmt::Display for RuleOverlap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "seasons '{}' ({}) and '{}' ({}) overlap from {} to {}",
            self.first_label,
            self.first,
            self.second_label,
            self.second,
            self.shared.start,
            self.shared.end
        )
    }
}
