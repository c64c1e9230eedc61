//! Acting-account extractor for protected routes
//!
//! Authentication happens upstream. The gateway forwards the verified
//! account id in `X-Account-Id`; this extractor only checks that the
//! account still exists.

use crate::handlers::ApiError;
use crate::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use socialswap_core::{AccountId, StoreError};

pub const ACCOUNT_HEADER: &str = "x-account-id";

/// The account a request acts as
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub account_id: AccountId,
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(ACCOUNT_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing X-Account-Id header"))?;

        let account_id: AccountId = header
            .trim()
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid X-Account-Id header"))?;

        match state.integrity.require_account(account_id).await {
            Ok(_) => Ok(Identity { account_id }),
            Err(StoreError::NotFound { .. }) => Err(ApiError::unauthorized("Unknown account")),
            Err(e) => Err(e.into()),
        }
    }
}
