//! Watchlist types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, ListingId, WatchEntryId};

/// A listing saved for later by an account. At most one per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub id: WatchEntryId,
    pub account_id: AccountId,
    pub listing_id: ListingId,
    pub created_at: DateTime<Utc>,
}
