//! Listing types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, AccountSummary, Category, CategoryId, ListingId, Platform, PlatformId};

/// A social-media account offered for sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub followers: i64,
    /// Engagement rate as a percentage, e.g. 3.8
    pub engagement: f64,
    /// Asking price in cents
    pub price: i64,
    pub cover_image_url: Option<String>,
    /// Free-form account age label, e.g. "2 years"
    pub age: String,
    /// Free-form posting frequency label, e.g. "5-7"
    pub weekly_posts: String,
    pub is_featured: bool,
    pub is_hot: bool,
    pub owner_id: AccountId,
    pub platform_id: PlatformId,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
}

/// Listing creation payload. Id and timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub followers: i64,
    pub engagement: f64,
    pub price: i64,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    pub age: String,
    pub weekly_posts: String,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_hot: bool,
    pub owner_id: AccountId,
    pub platform_id: PlatformId,
    pub category_id: CategoryId,
}

impl NewListing {
    pub fn into_listing(self, id: ListingId, created_at: DateTime<Utc>) -> Listing {
        Listing {
            id,
            title: self.title,
            description: self.description,
            followers: self.followers,
            engagement: self.engagement,
            price: self.price,
            cover_image_url: self.cover_image_url,
            age: self.age,
            weekly_posts: self.weekly_posts,
            is_featured: self.is_featured,
            is_hot: self.is_hot,
            owner_id: self.owner_id,
            platform_id: self.platform_id,
            category_id: self.category_id,
            created_at,
        }
    }
}

/// A listing joined with its platform, category and owner at read time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetails {
    #[serde(flatten)]
    pub listing: Listing,
    pub platform: Platform,
    pub category: Category,
    pub owner: AccountSummary,
}
