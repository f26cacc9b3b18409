//! Availability and seasonal pricing service for villa rentals.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod pricing;
pub mod routes;

use std::sync::Arc;

pub use routes::create_router;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pricing: Arc<pricing::PricingService>,
}
