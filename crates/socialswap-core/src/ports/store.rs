//! Storage traits for persistence
//!
//! Every backend implements the same contract: ids and creation timestamps
//! are assigned by the store, `list*` results come back in insertion order,
//! and uniqueness constraints are checked and claimed in one indivisible
//! step. Referential checks for listings, watchlist entries and messages
//! happen in the integrity layer before the raw `insert_*` calls below.

use async_trait::async_trait;
use socialswap_types::{
    Account, AccountId, Category, CategoryId, Listing, ListingId, Message, MessageId,
    NewAccount, NewCategory, NewListing, NewMessage, NewPlatform, Platform, PlatformId,
    WatchEntry,
};

use crate::Result;

/// Account store. Username and email are unique, compared case-insensitively.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>>;
    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>>;
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn list_accounts(&self) -> Result<Vec<Account>>;
    async fn create_account(&self, account: NewAccount) -> Result<Account>;
}

/// Platform and category reference tables. Names are unique, case-insensitively.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_platform(&self, id: PlatformId) -> Result<Option<Platform>>;
    async fn get_platform_by_name(&self, name: &str) -> Result<Option<Platform>>;
    async fn list_platforms(&self) -> Result<Vec<Platform>>;
    async fn create_platform(&self, platform: NewPlatform) -> Result<Platform>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;
    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn create_category(&self, category: NewCategory) -> Result<Category>;
}

/// Listing store. Listings are immutable once created.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>>;
    async fn list_listings(&self) -> Result<Vec<Listing>>;
    async fn list_featured_listings(&self) -> Result<Vec<Listing>>;
    async fn list_hot_listings(&self) -> Result<Vec<Listing>>;
    async fn list_listings_by_platform(&self, platform_id: PlatformId) -> Result<Vec<Listing>>;
    async fn list_listings_by_category(&self, category_id: CategoryId) -> Result<Vec<Listing>>;
    async fn list_listings_by_owner(&self, owner_id: AccountId) -> Result<Vec<Listing>>;

    /// Store a listing whose references were already validated.
    async fn insert_listing(&self, listing: NewListing) -> Result<Listing>;
}

/// Watchlist store. At most one entry per (account, listing) pair.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn get_watch_entry(
        &self,
        account_id: AccountId,
        listing_id: ListingId,
    ) -> Result<Option<WatchEntry>>;
    async fn list_watch_entries(&self, account_id: AccountId) -> Result<Vec<WatchEntry>>;

    /// Fails with `ConstraintViolation(WatchlistPair)` when the pair exists.
    async fn insert_watch_entry(
        &self,
        account_id: AccountId,
        listing_id: ListingId,
    ) -> Result<WatchEntry>;

    /// Returns whether an entry was removed.
    async fn delete_watch_entry(&self, account_id: AccountId, listing_id: ListingId)
        -> Result<bool>;
}

/// Message store
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn get_message(&self, id: MessageId) -> Result<Option<Message>>;
    /// Messages sent or received by the account, in insertion order.
    async fn list_messages_involving(&self, account_id: AccountId) -> Result<Vec<Message>>;
    async fn insert_message(&self, message: NewMessage) -> Result<Message>;
}

/// The full Entity Store contract
pub trait EntityStore:
    AccountStore + CatalogStore + ListingStore + WatchlistStore + MessageStore
{
}

impl<T> EntityStore for T where
    T: AccountStore + CatalogStore + ListingStore + WatchlistStore + MessageStore
{
}
