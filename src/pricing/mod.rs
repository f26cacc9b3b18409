//! Pricing engine module for villa stays.
//!
//! Availability checks and seasonal per-night pricing. The calculators are
//! pure; `services` wires them to storage and the cache.

pub mod calculators;
pub mod calendar;
pub mod error;
pub mod models;
pub mod queries;
pub mod repository;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{calculate_stay, is_available, resolve_nightly_price, round_money};
pub use calendar::CivilCalendar;
pub use error::PricingError;
pub use routes::router;
pub use services::{PricingService, PricingSettings};
