//! Cache administration handlers

use axum::{body::Bytes, extract::State, http::StatusCode};

use crate::error::{AppError, Result};
use crate::pricing::requests::InvalidateCacheRequest;
use crate::AppState;

/// Drop cached pricing data for one property, or for all of them when the
/// body is empty. Called by the back-office after season edits.
///
/// A body that is present but malformed is rejected and nothing is dropped.
pub async fn invalidate_cache(State(state): State<AppState>, body: Bytes) -> Result<StatusCode> {
    let request = parse_request(&body)?;

    match request.property_id {
        Some(id) => state.pricing.invalidate_property(id).await,
        None => state.pricing.invalidate_all(),
    }

    Ok(StatusCode::NO_CONTENT)
}

fn parse_request(body: &[u8]) -> Result<InvalidateCacheRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InvalidateCacheRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("invalid cache invalidation request: {}", e)))
}
