//! Watchlist management service

use super::Integrity;
use socialswap_core::ports::WatchlistStore;
use socialswap_core::{AccountId, ListingDetails, ListingId, Result, WatchEntry};

pub struct WatchlistManager {
    integrity: Integrity,
}

impl WatchlistManager {
    pub fn new(integrity: Integrity) -> Self {
        Self { integrity }
    }

    /// Save a listing for later. A second add for the same pair fails with
    /// `ConstraintViolation`; the store's unique key decides races.
    pub async fn add(&self, account_id: AccountId, listing_id: ListingId) -> Result<WatchEntry> {
        self.integrity.check_watch_refs(account_id, listing_id).await?;
        self.integrity
            .store()
            .insert_watch_entry(account_id, listing_id)
            .await
    }

    /// Removing an entry that does not exist is not an error.
    /// Returns whether anything was removed.
    pub async fn remove(&self, account_id: AccountId, listing_id: ListingId) -> Result<bool> {
        self.integrity
            .store()
            .delete_watch_entry(account_id, listing_id)
            .await
    }

    pub async fn is_watching(&self, account_id: AccountId, listing_id: ListingId) -> Result<bool> {
        Ok(self
            .integrity
            .store()
            .get_watch_entry(account_id, listing_id)
            .await?
            .is_some())
    }

    /// Watched listings with platform, category and owner attached, in the
    /// order they were added
    pub async fn list_for_account(&self, account_id: AccountId) -> Result<Vec<ListingDetails>> {
        let listing_ids: Vec<ListingId> = self
            .integrity
            .store()
            .list_watch_entries(account_id)
            .await?
            .into_iter()
            .map(|entry| entry.listing_id)
            .collect();

        let listings = self.integrity.resolve_listings(&listing_ids).await?;
        self.integrity.hydrate_all(listings).await
    }
}
