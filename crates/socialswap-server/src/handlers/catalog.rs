//! Platform and category handlers

use super::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use socialswap_core::ports::CatalogStore;
use socialswap_core::{Category, CategoryId, Platform, PlatformId};

pub async fn list_platforms(State(state): State<AppState>) -> Result<Json<Vec<Platform>>, ApiError> {
    Ok(Json(state.store.list_platforms().await?))
}

pub async fn get_platform(
    State(state): State<AppState>,
    Path(id): Path<PlatformId>,
) -> Result<Json<Platform>, ApiError> {
    Ok(Json(state.integrity.require_platform(id).await?))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.store.list_categories().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.integrity.require_category(id).await?))
}
