//! HTTP handlers for quotes, availability and season tables.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::AppState;

use super::requests::{QuoteRequest, SeasonsParams, StayParams};
use super::responses::{AvailabilityResponse, PriceQuoteResponse, SeasonResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/quote", post(quote))
        .route("/api/properties/:id/price", get(property_price))
        .route("/api/properties/:id/availability", get(property_availability))
        .route("/api/properties/:id/seasons", get(property_seasons))
}

/// Quote from a JSON body
async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<PriceQuoteResponse>> {
    let query = request.into_query(state.pricing.calendar())?;
    let result = state.pricing.quote(&query).await?;
    Ok(Json(result.into()))
}

/// Quote from query parameters
async fn property_price(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Query(params): Query<StayParams>,
) -> Result<Json<PriceQuoteResponse>> {
    let query = params.into_query(property_id, state.pricing.calendar())?;
    let result = state.pricing.quote(&query).await?;
    Ok(Json(result.into()))
}

async fn property_availability(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Query(params): Query<StayParams>,
) -> Result<Json<AvailabilityResponse>> {
    let query = params.into_query(property_id, state.pricing.calendar())?;
    let result = state.pricing.check_availability(&query).await?;
    Ok(Json(result.into()))
}

/// Season table for a year (current year in the property calendar by default)
async fn property_seasons(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Query(params): Query<SeasonsParams>,
) -> Result<Json<Vec<SeasonResponse>>> {
    let year = params.year.unwrap_or_else(|| {
        Utc::now()
            .with_timezone(&state.pricing.calendar().offset())
            .year()
    });

    let seasons = state.pricing.season_calendar(property_id, year).await?;
    Ok(Json(seasons.into_iter().map(Into::into).collect()))
}
