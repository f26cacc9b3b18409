//! Core pricing calculation functions.
//!
//! Pure functions for availability and stay pricing - no database access.
//! Money is `Decimal` throughout; rounding happens only when a response is
//! serialized.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::calendar::{days_between, DateRange};
use super::error::PricingError;
use super::models::{
    NightPrice, PriceQuery, PriceResult, Property, Reservation, ResolvedPrice, RuleOverlap,
    SeasonalPricingRule, BASE_SEASON,
};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use villa_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1333.3333), 2), dec!(1333.33));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Half-open overlap test: `[a.start, a.end)` and `[b.start, b.end)` conflict
/// iff `a.start < b.end && b.start < a.end`.
pub fn ranges_conflict(a: &DateRange, b: &DateRange) -> bool {
    a.overlaps(b)
}

/// Reservations of `property_id` that overlap `range`.
pub fn conflicting_reservations<'a>(
    property_id: Uuid,
    range: &DateRange,
    reservations: &'a [Reservation],
) -> Vec<&'a Reservation> {
    reservations
        .iter()
        .filter(|r| r.property_id == property_id && ranges_conflict(&r.range(), range))
        .collect()
}

/// Whether `[check_in, check_out)` is free for `property_id`.
///
/// Callers must validate `check_in < check_out` first (see
/// [`DateRange::checked`]); an empty range never conflicts.
pub fn is_available(
    property_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    reservations: &[Reservation],
) -> bool {
    let range = DateRange::new(check_in, check_out);
    conflicting_reservations(property_id, &range, reservations).is_empty()
}

/// Order in which overlapping seasons win a night: narrowest window first,
/// then the later start, then the higher rate, then the lower id.
fn season_precedence(a: &SeasonalPricingRule, b: &SeasonalPricingRule) -> Ordering {
    a.span_days()
        .cmp(&b.span_days())
        .then_with(|| b.start_date.cmp(&a.start_date))
        .then_with(|| b.price_per_night.cmp(&a.price_per_night))
        .then_with(|| a.id.cmp(&b.id))
}

/// Resolve the nightly rate for `date`.
///
/// Falls back to `base_price` with season type `"base"` when no rule covers
/// the date. When several rules cover it the result does not depend on the
/// order of `rules`.
pub fn resolve_nightly_price(
    date: NaiveDate,
    rules: &[SeasonalPricingRule],
    base_price: Decimal,
) -> ResolvedPrice {
    resolve_from(date, rules.iter(), base_price)
}

fn resolve_from<'a>(
    date: NaiveDate,
    rules: impl Iterator<Item = &'a SeasonalPricingRule>,
    base_price: Decimal,
) -> ResolvedPrice {
    match rules
        .filter(|rule| rule.contains(date))
        .min_by(|a, b| season_precedence(a, b))
    {
        Some(rule) => ResolvedPrice {
            price: rule.price_per_night,
            season_type: rule.season_label.clone(),
            minimum_nights: rule.effective_minimum_nights(),
            rule_id: Some(rule.id),
        },
        None => ResolvedPrice {
            price: base_price,
            season_type: BASE_SEASON.to_string(),
            minimum_nights: 1,
            rule_id: None,
        },
    }
}

/// Price a stay night by night and flag the nights that are already taken.
///
/// Nights inside a reservation are still priced; the result carries
/// `is_available = false` and the blocked dates instead of refusing to quote.
pub fn calculate_stay(
    query: &PriceQuery,
    property: &Property,
    rules: &[SeasonalPricingRule],
    reservations: &[Reservation],
) -> Result<PriceResult, PricingError> {
    let range = query.range()?;
    let nights = days_between(query.check_in, query.check_out);

    let property_rules: Vec<&SeasonalPricingRule> = rules
        .iter()
        .filter(|rule| rule.property_id == query.property_id)
        .collect();
    let blocked: Vec<&Reservation> = reservations
        .iter()
        .filter(|r| r.property_id == query.property_id)
        .collect();

    let mut total_price = Decimal::ZERO;
    let mut minimum_nights = 1;
    let mut unavailable_dates = Vec::new();
    let mut breakdown = Vec::with_capacity(nights as usize);

    for date in range.nights() {
        let unavailable = blocked.iter().any(|r| r.range().contains(date));
        let resolved = resolve_from(date, property_rules.iter().copied(), property.base_price);

        total_price += resolved.price;
        minimum_nights = minimum_nights.max(resolved.minimum_nights);
        if unavailable {
            unavailable_dates.push(date);
        }

        breakdown.push(NightPrice {
            date,
            price: resolved.price,
            season_type: resolved.season_type,
            unavailable,
        });
    }

    let price_per_night = total_price / Decimal::from(nights);

    Ok(PriceResult {
        property_id: query.property_id,
        check_in: query.check_in,
        check_out: query.check_out,
        nights,
        total_price,
        price_per_night,
        currency: property.currency.clone(),
        is_available: unavailable_dates.is_empty(),
        unavailable_dates,
        breakdown,
        minimum_nights,
        meets_minimum_stay: nights >= i64::from(minimum_nights),
    })
}

/// Every pair of seasons of the same property whose windows intersect.
pub fn find_rule_overlaps(rules: &[SeasonalPricingRule]) -> Vec<RuleOverlap> {
    let mut overlaps = Vec::new();

    for (i, first) in rules.iter().enumerate() {
        for second in &rules[i + 1..] {
            if first.property_id != second.property_id {
                continue;
            }
            if let Some(shared) = first.window().intersection(&second.window()) {
                overlaps.push(RuleOverlap {
                    property_id: first.property_id,
                    first: first.id,
                    second: second.id,
                    first_label: first.season_label.clone(),
                    second_label: second.season_label.clone(),
                    shared,
                });
            }
        }
    }

    overlaps
}
