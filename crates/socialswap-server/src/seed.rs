//! Startup data: reference tables and the demo marketplace

use crate::services::Integrity;
use anyhow::{Context, Result};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use rand::rngs::OsRng;
use socialswap_core::ports::{AccountStore, CatalogStore};
use socialswap_core::{Category, EntityStore, NewAccount, NewCategory, NewListing, NewPlatform};
use tracing::{info, warn};

const PLATFORMS: [(&str, &str, &str); 6] = [
    ("Instagram", "ri-instagram-line", "text-pink-500"),
    ("Twitter", "ri-twitter-x-line", "text-blue-400"),
    ("TikTok", "ri-tiktok-line", "text-white"),
    ("YouTube", "ri-youtube-line", "text-red-500"),
    ("Facebook", "ri-facebook-circle-line", "text-blue-500"),
    ("LinkedIn", "ri-linkedin-box-line", "text-blue-600"),
];

const CATEGORIES: [&str; 12] = [
    "Fashion & Beauty",
    "Technology",
    "Food",
    "Fitness",
    "Travel",
    "Business",
    "Entertainment",
    "Gaming",
    "Photography",
    "Finance",
    "Lifestyle",
    "Recruitment",
];

const DEMO_PASSWORD: &str = "password";

/// Create the default platforms and categories. Names already present are
/// left alone, so this is safe to run on every start.
pub async fn bootstrap_reference_data(store: &dyn EntityStore) -> Result<()> {
    let mut created = 0;

    for (name, icon_class, icon_color) in PLATFORMS {
        if store.get_platform_by_name(name).await?.is_none() {
            store
                .create_platform(NewPlatform {
                    name: name.to_string(),
                    icon_class: icon_class.to_string(),
                    icon_color: icon_color.to_string(),
                })
                .await
                .with_context(|| format!("Failed to create platform {}", name))?;
            created += 1;
        }
    }

    for name in CATEGORIES {
        if store.get_category_by_name(name).await?.is_none() {
            store
                .create_category(NewCategory::named(name))
                .await
                .with_context(|| format!("Failed to create category {}", name))?;
            created += 1;
        }
    }

    info!("Reference data ready ({} records created)", created);
    Ok(())
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

async fn ensure_category(store: &dyn EntityStore, name: &str) -> Result<Category> {
    if let Some(existing) = store.get_category_by_name(name).await? {
        return Ok(existing);
    }
    Ok(store.create_category(NewCategory::named(name)).await?)
}

/// Populate an empty marketplace with two accounts and three listings.
/// Returns false without touching anything when accounts already exist.
pub async fn seed_demo_data(integrity: &Integrity) -> Result<bool> {
    let store = integrity.store();

    if !store.list_accounts().await?.is_empty() {
        info!("Store already has accounts, skipping demo seed");
        return Ok(false);
    }

    let demo = store
        .create_account(NewAccount {
            username: "demo".to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            email: "demo@example.com".to_string(),
            full_name: Some("Demo User".to_string()),
        })
        .await?;
    let creator = store
        .create_account(NewAccount {
            username: "creator".to_string(),
            password_hash: hash_password(DEMO_PASSWORD)?,
            email: "creator@example.com".to_string(),
            full_name: Some("Content Creator".to_string()),
        })
        .await?;
    info!("Created demo accounts {} and {}", demo.id, creator.id);

    let (Some(instagram), Some(youtube)) = (
        store.get_platform_by_name("Instagram").await?,
        store.get_platform_by_name("YouTube").await?,
    ) else {
        warn!("Instagram or YouTube platform missing, no demo listings created");
        return Ok(true);
    };

    let fashion = ensure_category(store, "Fashion").await?;
    let tech = ensure_category(store, "Tech").await?;
    let food = ensure_category(store, "Food").await?;

    let listings = [
        NewListing {
            title: "Fashion Influencer Account".to_string(),
            description: "Established fashion profile with active and engaged followers."
                .to_string(),
            followers: 25_000,
            engagement: 3.8,
            price: 2500_00,
            cover_image_url: None,
            age: "3 years".to_string(),
            weekly_posts: "4-6".to_string(),
            is_featured: true,
            is_hot: true,
            owner_id: creator.id,
            platform_id: instagram.id,
            category_id: fashion.id,
        },
        NewListing {
            title: "Tech Review Channel".to_string(),
            description: "Tech channel with product reviews and tech news.".to_string(),
            followers: 50_000,
            engagement: 4.2,
            price: 5000_00,
            cover_image_url: None,
            age: "2 years".to_string(),
            weekly_posts: "2-3".to_string(),
            is_featured: true,
            is_hot: false,
            owner_id: creator.id,
            platform_id: youtube.id,
            category_id: tech.id,
        },
        NewListing {
            title: "Food Blogger Profile".to_string(),
            description: "Food and recipe page with high-quality content.".to_string(),
            followers: 15_000,
            engagement: 5.1,
            price: 1800_00,
            cover_image_url: None,
            age: "1.5 years".to_string(),
            weekly_posts: "5-7".to_string(),
            is_featured: false,
            is_hot: true,
            owner_id: creator.id,
            platform_id: instagram.id,
            category_id: food.id,
        },
    ];

    for listing in listings {
        let created = integrity.create_listing(listing).await?;
        info!("Created demo listing {}: {}", created.id, created.title);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::conformance::backends;
    use argon2::{PasswordHash, PasswordVerifier};
    use socialswap_core::ports::ListingStore;
    use socialswap_core::query::{self, SortKey};

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        for (name, store) in backends().await {
            bootstrap_reference_data(&*store).await.unwrap();
            bootstrap_reference_data(&*store).await.unwrap();

            assert_eq!(store.list_platforms().await.unwrap().len(), 6, "{}", name);
            assert_eq!(store.list_categories().await.unwrap().len(), 12, "{}", name);
            let tiktok = store.get_platform_by_name("tiktok").await.unwrap().unwrap();
            assert_eq!(tiktok.icon_class, "ri-tiktok-line", "{}", name);
        }
    }

    #[tokio::test]
    async fn test_demo_seed_matches_marketplace_example() {
        for (name, store) in backends().await {
            bootstrap_reference_data(&*store).await.unwrap();
            let integrity = Integrity::new(store.clone());
            assert!(seed_demo_data(&integrity).await.unwrap(), "{}", name);

            let featured: Vec<_> = store
                .list_featured_listings()
                .await
                .unwrap()
                .into_iter()
                .map(|l| l.title)
                .collect();
            assert_eq!(
                featured,
                vec!["Fashion Influencer Account", "Tech Review Channel"],
                "{}",
                name
            );

            let by_price: Vec<_> =
                query::sorted(store.list_listings().await.unwrap(), SortKey::PriceHigh)
                    .into_iter()
                    .map(|l| l.price)
                    .collect();
            assert_eq!(by_price, vec![5000_00, 2500_00, 1800_00], "{}", name);

            let creator = store.get_account_by_username("creator").await.unwrap().unwrap();
            assert_eq!(
                store.list_listings_by_owner(creator.id).await.unwrap().len(),
                3,
                "{}",
                name
            );
            let hash = PasswordHash::new(&creator.password_hash).unwrap();
            assert!(Argon2::default()
                .verify_password(DEMO_PASSWORD.as_bytes(), &hash)
                .is_ok());
        }
    }

    #[tokio::test]
    async fn test_demo_seed_skips_populated_store() {
        for (name, store) in backends().await {
            bootstrap_reference_data(&*store).await.unwrap();
            let integrity = Integrity::new(store.clone());
            seed_demo_data(&integrity).await.unwrap();

            assert!(!seed_demo_data(&integrity).await.unwrap(), "{}", name);
            assert_eq!(store.list_accounts().await.unwrap().len(), 2, "{}", name);
            assert_eq!(store.list_listings().await.unwrap().len(), 3, "{}", name);
        }
    }

    #[tokio::test]
    async fn test_demo_seed_without_platforms_creates_no_listings() {
        for (name, store) in backends().await {
            let integrity = Integrity::new(store.clone());
            assert!(seed_demo_data(&integrity).await.unwrap(), "{}", name);
            assert!(store.list_listings().await.unwrap().is_empty(), "{}", name);
        }
    }
}
