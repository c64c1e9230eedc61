//! Listing query engine
//!
//! Pure functions over listings already fetched from the store: filtering,
//! stable sorting, pagination and "similar listings" matching.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use socialswap_types::{CategoryId, Listing, PlatformId};

use crate::{Result, StoreError};

/// Page size used by the marketplace grid when none is requested
pub const DEFAULT_PAGE_SIZE: i64 = 8;

/// Maximum number of entries returned by [`similar`]
pub const SIMILAR_LIMIT: usize = 3;

/// Sort orders offered by the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    FollowersHigh,
    EngagementHigh,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Newest,
        SortKey::PriceLow,
        SortKey::PriceHigh,
        SortKey::FollowersHigh,
        SortKey::EngagementHigh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
            SortKey::FollowersHigh => "followers-high",
            SortKey::EngagementHigh => "engagement-high",
        }
    }

    fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            SortKey::Newest => b.created_at.cmp(&a.created_at),
            SortKey::PriceLow => a.price.cmp(&b.price),
            SortKey::PriceHigh => b.price.cmp(&a.price),
            SortKey::FollowersHigh => b.followers.cmp(&a.followers),
            SortKey::EngagementHigh => b.engagement.total_cmp(&a.engagement),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| StoreError::InvalidArgument(format!("unknown sort key: {}", s)))
    }
}

/// Sort in place. Ties keep their original relative order.
pub fn sort_listings(listings: &mut [Listing], key: SortKey) {
    // slice::sort_by is stable
    listings.sort_by(|a, b| key.compare(a, b));
}

pub fn sorted(mut listings: Vec<Listing>, key: SortKey) -> Vec<Listing> {
    sort_listings(&mut listings, key);
    listings
}

/// Listings with the featured flag set, in their incoming order
pub fn featured(listings: Vec<Listing>) -> Vec<Listing> {
    listings.into_iter().filter(|l| l.is_featured).collect()
}

/// Listings with the hot flag set, in their incoming order
pub fn hot(listings: Vec<Listing>) -> Vec<Listing> {
    listings.into_iter().filter(|l| l.is_hot).collect()
}

/// Narrowing applied before sorting. Empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    pub platform_id: Option<PlatformId>,
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub featured_only: bool,
    #[serde(default)]
    pub hot_only: bool,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        self.platform_id.map_or(true, |id| listing.platform_id == id)
            && self.category_id.map_or(true, |id| listing.category_id == id)
            && (!self.featured_only || listing.is_featured)
            && (!self.hot_only || listing.is_hot)
    }

    pub fn apply(&self, listings: Vec<Listing>) -> Vec<Listing> {
        listings.into_iter().filter(|l| self.matches(l)).collect()
    }
}

fn check_page_args(page_size: i64, page: i64) -> Result<(usize, usize)> {
    if page < 1 {
        return Err(StoreError::InvalidArgument(format!(
            "page must be 1 or greater, got {}",
            page
        )));
    }
    if page_size < 1 {
        return Err(StoreError::InvalidArgument(format!(
            "page size must be 1 or greater, got {}",
            page_size
        )));
    }
    let size = usize::try_from(page_size)
        .map_err(|_| StoreError::InvalidArgument(format!("page size too large: {}", page_size)))?;
    let start = usize::try_from(page - 1)
        .ok()
        .and_then(|p| p.checked_mul(size))
        .unwrap_or(usize::MAX);
    Ok((size, start))
}

/// The slice `[(page-1)*size, page*size)`. Pages past the end are empty.
pub fn paginate<T>(items: &[T], page_size: i64, page: i64) -> Result<&[T]> {
    let (size, start) = check_page_args(page_size, page)?;
    if start >= items.len() {
        return Ok(&[]);
    }
    let end = start.saturating_add(size).min(items.len());
    Ok(&items[start..end])
}

/// Number of pages needed to show `total` items
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// One page of results plus the numbers a pager needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn from_vec(items: Vec<T>, page_size: i64, page: i64) -> Result<Self> {
        let (size, start) = check_page_args(page_size, page)?;
        let total = items.len();
        Ok(Page {
            items: items.into_iter().skip(start).take(size).collect(),
            page,
            page_size,
            total,
            total_pages: page_count(total, size),
        })
    }
}

/// Up to three other listings sharing the reference's platform or category,
/// in candidate order.
pub fn similar(reference: &Listing, candidates: &[Listing]) -> Vec<Listing> {
    candidates
        .iter()
        .filter(|l| l.id != reference.id)
        .filter(|l| l.platform_id == reference.platform_id || l.category_id == reference.category_id)
        .take(SIMILAR_LIMIT)
        .cloned()
        .collect()
}
