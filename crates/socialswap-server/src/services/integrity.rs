//! Relational integrity layer
//!
//! Shared by every backend: validates foreign references before a write
//! reaches the store, and joins related records onto listings at read time.
//! Accounts, platforms, categories and listings are never deleted, so a
//! reference that resolves here still resolves when the insert lands.

use socialswap_core::ports::{AccountStore, CatalogStore, ListingStore};
use socialswap_core::{
    Account, AccountId, AccountSummary, Category, CategoryId, EntityKind, EntityStore, Listing,
    ListingDetails, ListingId, NewListing, NewMessage, Platform, PlatformId, Result, StoreError,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct Integrity {
    store: Arc<dyn EntityStore>,
}

impl Integrity {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn EntityStore {
        &*self.store
    }

    pub async fn require_account(&self, id: AccountId) -> Result<Account> {
        self.store
            .get_account(id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Account, id))
    }

    pub async fn require_platform(&self, id: PlatformId) -> Result<Platform> {
        self.store
            .get_platform(id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Platform, id))
    }

    pub async fn require_category(&self, id: CategoryId) -> Result<Category> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Category, id))
    }

    pub async fn require_listing(&self, id: ListingId) -> Result<Listing> {
        self.store
            .get_listing(id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Listing, id))
    }

    /// Create a listing after checking its numbers and references
    pub async fn create_listing(&self, new: NewListing) -> Result<Listing> {
        if new.price < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "price must not be negative, got {}",
                new.price
            )));
        }
        if new.followers < 0 {
            return Err(StoreError::InvalidArgument(format!(
                "follower count must not be negative, got {}",
                new.followers
            )));
        }

        self.require_account(new.owner_id).await?;
        self.require_platform(new.platform_id).await?;
        self.require_category(new.category_id).await?;

        self.store.insert_listing(new).await
    }

    pub async fn check_watch_refs(&self, account_id: AccountId, listing_id: ListingId) -> Result<()> {
        self.require_account(account_id).await?;
        self.require_listing(listing_id).await?;
        Ok(())
    }

    pub async fn check_message_refs(&self, message: &NewMessage) -> Result<()> {
        self.require_account(message.from_account_id).await?;
        self.require_account(message.to_account_id).await?;
        self.require_listing(message.listing_id).await?;
        Ok(())
    }

    /// Attach platform, category and owner to a listing
    pub async fn hydrate(&self, listing: Listing) -> Result<ListingDetails> {
        let platform = self
            .store
            .get_platform(listing.platform_id)
            .await?
            .ok_or(StoreError::DanglingReference {
                kind: EntityKind::Platform,
                id: listing.platform_id,
            })?;
        let category = self
            .store
            .get_category(listing.category_id)
            .await?
            .ok_or(StoreError::DanglingReference {
                kind: EntityKind::Category,
                id: listing.category_id,
            })?;
        let owner = self
            .store
            .get_account(listing.owner_id)
            .await?
            .ok_or(StoreError::DanglingReference {
                kind: EntityKind::Account,
                id: listing.owner_id,
            })?;

        Ok(ListingDetails {
            platform,
            category,
            owner: AccountSummary::from(&owner),
            listing,
        })
    }

    /// Hydrate a batch, reading each reference table once
    pub async fn hydrate_all(&self, listings: Vec<Listing>) -> Result<Vec<ListingDetails>> {
        let platforms: HashMap<PlatformId, Platform> = self
            .store
            .list_platforms()
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let categories: HashMap<CategoryId, Category> = self
            .store
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let mut owners: HashMap<AccountId, AccountSummary> = HashMap::new();

        let mut details = Vec::with_capacity(listings.len());
        for listing in listings {
            let platform = platforms.get(&listing.platform_id).cloned().ok_or(
                StoreError::DanglingReference {
                    kind: EntityKind::Platform,
                    id: listing.platform_id,
                },
            )?;
            let category = categories.get(&listing.category_id).cloned().ok_or(
                StoreError::DanglingReference {
                    kind: EntityKind::Category,
                    id: listing.category_id,
                },
            )?;
            let owner = match owners.get(&listing.owner_id) {
                Some(owner) => owner.clone(),
                None => {
                    let account = self.store.get_account(listing.owner_id).await?.ok_or(
                        StoreError::DanglingReference {
                            kind: EntityKind::Account,
                            id: listing.owner_id,
                        },
                    )?;
                    let summary = AccountSummary::from(&account);
                    owners.insert(account.id, summary.clone());
                    summary
                }
            };
            details.push(ListingDetails {
                listing,
                platform,
                category,
                owner,
            });
        }
        Ok(details)
    }

    /// Listings for stored ids, in the given order
    pub async fn resolve_listings(&self, ids: &[ListingId]) -> Result<Vec<Listing>> {
        let mut listings = Vec::with_capacity(ids.len());
        for &id in ids {
            let listing = self
                .store
                .get_listing(id)
                .await?
                .ok_or(StoreError::DanglingReference {
                    kind: EntityKind::Listing,
                    id,
                })?;
            listings.push(listing);
        }
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::conformance::{backends, fixture, new_account, new_listing};
    use socialswap_core::NewPlatform;

    #[tokio::test]
    async fn test_create_listing_names_missing_reference() {
        for (name, store) in backends().await {
            let (owner, platform, category) = fixture(&*store).await;
            let integrity = Integrity::new(store.clone());

            let err = integrity
                .create_listing(new_listing(owner, 42, category))
                .await
                .unwrap_err();
            assert_eq!(err, StoreError::not_found(EntityKind::Platform, 42), "{}", name);

            let err = integrity
                .create_listing(new_listing(owner, platform, 7))
                .await
                .unwrap_err();
            assert_eq!(err, StoreError::not_found(EntityKind::Category, 7), "{}", name);

            let err = integrity
                .create_listing(new_listing(99, platform, category))
                .await
                .unwrap_err();
            assert_eq!(err, StoreError::not_found(EntityKind::Account, 99), "{}", name);

            // Nothing was stored by the failed attempts
            assert!(store.list_listings().await.unwrap().is_empty(), "{}", name);

            let listing = integrity
                .create_listing(new_listing(owner, platform, category))
                .await
                .unwrap();
            assert_eq!(listing.id, 1, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_create_listing_rejects_negative_numbers() {
        for (name, store) in backends().await {
            let (owner, platform, category) = fixture(&*store).await;
            let integrity = Integrity::new(store.clone());

            let mut negative_price = new_listing(owner, platform, category);
            negative_price.price = -1;
            assert!(
                matches!(
                    integrity.create_listing(negative_price).await,
                    Err(StoreError::InvalidArgument(_))
                ),
                "{}",
                name
            );

            let mut negative_followers = new_listing(owner, platform, category);
            negative_followers.followers = -5;
            assert!(matches!(
                integrity.create_listing(negative_followers).await,
                Err(StoreError::InvalidArgument(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_hydrate_joins_current_records() {
        for (name, store) in backends().await {
            let (owner, platform, category) = fixture(&*store).await;
            let integrity = Integrity::new(store.clone());
            let listing = integrity
                .create_listing(new_listing(owner, platform, category))
                .await
                .unwrap();

            let details = integrity.hydrate(listing.clone()).await.unwrap();
            assert_eq!(details.platform.name, "Instagram", "{}", name);
            assert_eq!(details.category.name, "Fashion", "{}", name);
            assert_eq!(details.owner.username, "creator", "{}", name);
            assert_eq!(details.listing, listing, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_hydrate_all_matches_single_hydrate() {
        for (name, store) in backends().await {
            let (owner, platform, category) = fixture(&*store).await;
            let second_owner = store.create_account(new_account("second")).await.unwrap().id;
            let youtube = store
                .create_platform(NewPlatform {
                    name: "YouTube".to_string(),
                    icon_class: "ri-youtube-line".to_string(),
                    icon_color: "text-red-500".to_string(),
                })
                .await
                .unwrap()
                .id;
            let integrity = Integrity::new(store.clone());
            integrity.create_listing(new_listing(owner, platform, category)).await.unwrap();
            integrity.create_listing(new_listing(second_owner, youtube, category)).await.unwrap();
            integrity.create_listing(new_listing(owner, youtube, category)).await.unwrap();

            let listings = store.list_listings().await.unwrap();
            let batch = integrity.hydrate_all(listings.clone()).await.unwrap();
            assert_eq!(batch.len(), 3, "{}", name);
            for (listing, detail) in listings.into_iter().zip(batch) {
                assert_eq!(integrity.hydrate(listing).await.unwrap(), detail, "{}", name);
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_listings_keeps_order() {
        for (name, store) in backends().await {
            let (owner, platform, category) = fixture(&*store).await;
            let integrity = Integrity::new(store.clone());
            for _ in 0..3 {
                integrity.create_listing(new_listing(owner, platform, category)).await.unwrap();
            }

            let ids: Vec<_> = integrity
                .resolve_listings(&[3, 1])
                .await
                .unwrap()
                .into_iter()
                .map(|l| l.id)
                .collect();
            assert_eq!(ids, vec![3, 1], "{}", name);

            assert_eq!(
                integrity.resolve_listings(&[8]).await.unwrap_err(),
                StoreError::DanglingReference {
                    kind: EntityKind::Listing,
                    id: 8
                },
                "{}",
                name
            );
        }
    }
}
