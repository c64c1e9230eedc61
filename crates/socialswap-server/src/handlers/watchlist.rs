//! Watchlist handlers

use super::ApiError;
use crate::extractors::Identity;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use socialswap_core::{ListingDetails, ListingId, WatchEntry};

pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<ListingDetails>>, ApiError> {
    Ok(Json(state.watchlist.list_for_account(identity.account_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    listing_id: ListingId,
}

pub async fn add(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<AddRequest>,
) -> Result<(StatusCode, Json<WatchEntry>), ApiError> {
    let entry = state
        .watchlist
        .add(identity.account_id, req.listing_id)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Always 204, whether or not the listing was being watched
pub async fn remove(
    State(state): State<AppState>,
    identity: Identity,
    Path(listing_id): Path<ListingId>,
) -> Result<StatusCode, ApiError> {
    state.watchlist.remove(identity.account_id, listing_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
