//! In-memory entity store using DashMap
//!
//! Records live in one map per entity kind keyed by id. Each uniqueness
//! constraint has its own index map keyed by the folded value; claiming a
//! key goes through `DashMap::entry`, which holds the shard lock across the
//! check and the insert.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use socialswap_core::ports::{AccountStore, CatalogStore, ListingStore, MessageStore, WatchlistStore};
use socialswap_core::{
    Account, AccountId, Category, CategoryId, Constraint, Id, Listing, ListingId, Message,
    MessageId, NewAccount, NewCategory, NewListing, NewMessage, NewPlatform, Platform,
    PlatformId, Result, StoreError, WatchEntry,
};
use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonic id allocator, one per entity kind
struct Sequence(AtomicI64);

impl Sequence {
    fn new() -> Self {
        Self(AtomicI64::new(1))
    }

    fn next(&self) -> Id {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

/// Case-insensitive key, matching SQLite's NOCASE collation
fn fold(value: &str) -> String {
    value.to_ascii_lowercase()
}

/// Values of a map in id order
fn in_id_order<T: Clone>(map: &DashMap<Id, T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
    let mut rows: Vec<(Id, T)> = map
        .iter()
        .filter(|entry| keep(entry.value()))
        .map(|entry| (*entry.key(), entry.value().clone()))
        .collect();
    rows.sort_by_key(|(id, _)| *id);
    rows.into_iter().map(|(_, row)| row).collect()
}

fn lookup<T: Clone>(index: &DashMap<String, Id>, rows: &DashMap<Id, T>, key: &str) -> Option<T> {
    let id = index.get(&fold(key)).map(|id| *id.value())?;
    rows.get(&id).map(|row| row.value().clone())
}

pub struct MemoryStore {
    accounts: DashMap<AccountId, Account>,
    usernames: DashMap<String, AccountId>,
    emails: DashMap<String, AccountId>,
    platforms: DashMap<PlatformId, Platform>,
    platform_names: DashMap<String, PlatformId>,
    categories: DashMap<CategoryId, Category>,
    category_names: DashMap<String, CategoryId>,
    listings: DashMap<ListingId, Listing>,
    watchlist: DashMap<(AccountId, ListingId), WatchEntry>,
    messages: DashMap<MessageId, Message>,

    account_ids: Sequence,
    platform_ids: Sequence,
    category_ids: Sequence,
    listing_ids: Sequence,
    watch_ids: Sequence,
    message_ids: Sequence,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            usernames: DashMap::new(),
            emails: DashMap::new(),
            platforms: DashMap::new(),
            platform_names: DashMap::new(),
            categories: DashMap::new(),
            category_names: DashMap::new(),
            listings: DashMap::new(),
            watchlist: DashMap::new(),
            messages: DashMap::new(),
            account_ids: Sequence::new(),
            platform_ids: Sequence::new(),
            category_ids: Sequence::new(),
            listing_ids: Sequence::new(),
            watch_ids: Sequence::new(),
            message_ids: Sequence::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.value().clone()))
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(lookup(&self.usernames, &self.accounts, username))
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(lookup(&self.emails, &self.accounts, email))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(in_id_order(&self.accounts, |_| true))
    }

    async fn create_account(&self, new: NewAccount) -> Result<Account> {
        // Lock order is always username then email
        let username_slot = match self.usernames.entry(fold(&new.username)) {
            Entry::Occupied(_) => return Err(StoreError::ConstraintViolation(Constraint::Username)),
            Entry::Vacant(slot) => slot,
        };
        let email_slot = match self.emails.entry(fold(&new.email)) {
            Entry::Occupied(_) => return Err(StoreError::ConstraintViolation(Constraint::Email)),
            Entry::Vacant(slot) => slot,
        };

        let account = Account {
            id: self.account_ids.next(),
            username: new.username,
            password_hash: new.password_hash,
            email: new.email,
            full_name: new.full_name,
            avatar_url: None,
            created_at: Utc::now(),
        };
        self.accounts.insert(account.id, account.clone());
        username_slot.insert(account.id);
        email_slot.insert(account.id);

        Ok(account)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_platform(&self, id: PlatformId) -> Result<Option<Platform>> {
        Ok(self.platforms.get(&id).map(|p| p.value().clone()))
    }

    async fn get_platform_by_name(&self, name: &str) -> Result<Option<Platform>> {
        Ok(lookup(&self.platform_names, &self.platforms, name))
    }

    async fn list_platforms(&self) -> Result<Vec<Platform>> {
        Ok(in_id_order(&self.platforms, |_| true))
    }

    async fn create_platform(&self, new: NewPlatform) -> Result<Platform> {
        let slot = match self.platform_names.entry(fold(&new.name)) {
            Entry::Occupied(_) => {
                return Err(StoreError::ConstraintViolation(Constraint::PlatformName))
            }
            Entry::Vacant(slot) => slot,
        };

        let platform = Platform {
            id: self.platform_ids.next(),
            name: new.name,
            icon_class: new.icon_class,
            icon_color: new.icon_color,
        };
        self.platforms.insert(platform.id, platform.clone());
        slot.insert(platform.id);

        Ok(platform)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.categories.get(&id).map(|c| c.value().clone()))
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(lookup(&self.category_names, &self.categories, name))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(in_id_order(&self.categories, |_| true))
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category> {
        let slot = match self.category_names.entry(fold(&new.name)) {
            Entry::Occupied(_) => {
                return Err(StoreError::ConstraintViolation(Constraint::CategoryName))
            }
            Entry::Vacant(slot) => slot,
        };

        let category = Category {
            id: self.category_ids.next(),
            name: new.name,
        };
        self.categories.insert(category.id, category.clone());
        slot.insert(category.id);

        Ok(category)
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>> {
        Ok(self.listings.get(&id).map(|l| l.value().clone()))
    }

    async fn list_listings(&self) -> Result<Vec<Listing>> {
        Ok(in_id_order(&self.listings, |_| true))
    }

    async fn list_featured_listings(&self) -> Result<Vec<Listing>> {
        Ok(in_id_order(&self.listings, |l| l.is_featured))
    }

    async fn list_hot_listings(&self) -> Result<Vec<Listing>> {
        Ok(in_id_order(&self.listings, |l| l.is_hot))
    }

    async fn list_listings_by_platform(&self, platform_id: PlatformId) -> Result<Vec<Listing>> {
        Ok(in_id_order(&self.listings, |l| l.platform_id == platform_id))
    }

    async fn list_listings_by_category(&self, category_id: CategoryId) -> Result<Vec<Listing>> {
        Ok(in_id_order(&self.listings, |l| l.category_id == category_id))
    }

    async fn list_listings_by_owner(&self, owner_id: AccountId) -> Result<Vec<Listing>> {
        Ok(in_id_order(&self.listings, |l| l.owner_id == owner_id))
    }

    async fn insert_listing(&self, new: NewListing) -> Result<Listing> {
        let listing = new.into_listing(self.listing_ids.next(), Utc::now());
        self.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }
}

#[async_trait]
impl WatchlistStore for MemoryStore {
    async fn get_watch_entry(
        &self,
        account_id: AccountId,
        listing_id: ListingId,
    ) -> Result<Option<WatchEntry>> {
        Ok(self
            .watchlist
            .get(&(account_id, listing_id))
            .map(|e| e.value().clone()))
    }

    async fn list_watch_entries(&self, account_id: AccountId) -> Result<Vec<WatchEntry>> {
        let mut entries: Vec<WatchEntry> = self
            .watchlist
            .iter()
            .filter(|e| e.key().0 == account_id)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by_key(|e| e.id);
        Ok(entries)
    }

    async fn insert_watch_entry(
        &self,
        account_id: AccountId,
        listing_id: ListingId,
    ) -> Result<WatchEntry> {
        match self.watchlist.entry((account_id, listing_id)) {
            Entry::Occupied(_) => Err(StoreError::ConstraintViolation(Constraint::WatchlistPair)),
            Entry::Vacant(slot) => {
                let entry = WatchEntry {
                    id: self.watch_ids.next(),
                    account_id,
                    listing_id,
                    created_at: Utc::now(),
                };
                slot.insert(entry.clone());
                Ok(entry)
            }
        }
    }

    async fn delete_watch_entry(
        &self,
        account_id: AccountId,
        listing_id: ListingId,
    ) -> Result<bool> {
        Ok(self.watchlist.remove(&(account_id, listing_id)).is_some())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn get_message(&self, id: MessageId) -> Result<Option<Message>> {
        Ok(self.messages.get(&id).map(|m| m.value().clone()))
    }

    async fn list_messages_involving(&self, account_id: AccountId) -> Result<Vec<Message>> {
        Ok(in_id_order(&self.messages, |m| m.involves(account_id)))
    }

    async fn insert_message(&self, new: NewMessage) -> Result<Message> {
        let message = new.into_message(self.message_ids.next(), Utc::now());
        self.messages.insert(message.id, message.clone());
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            email: email.to_string(),
            full_name: None,
        }
    }

    #[tokio::test]
    async fn test_rejected_create_does_not_consume_id() {
        let store = MemoryStore::new();

        let first = store.create_account(new_account("demo", "demo@example.com")).await.unwrap();
        let err = store
            .create_account(new_account("other", "DEMO@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::ConstraintViolation(Constraint::Email));

        let second = store.create_account(new_account("other", "other@example.com")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_failed_email_claim_releases_username() {
        let store = MemoryStore::new();
        store.create_account(new_account("demo", "demo@example.com")).await.unwrap();

        // username is free but email clashes; the username must stay unclaimed
        assert!(store.create_account(new_account("fresh", "demo@example.com")).await.is_err());
        assert!(store.get_account_by_username("fresh").await.unwrap().is_none());
        assert!(store.create_account(new_account("fresh", "fresh@example.com")).await.is_ok());
    }
}
