//! Listing handlers

use super::ApiError;
use crate::extractors::Identity;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use socialswap_core::ports::ListingStore;
use socialswap_core::query::{self, ListingFilter, Page, SortKey, DEFAULT_PAGE_SIZE};
use socialswap_core::{
    CategoryId, Listing, ListingDetails, ListingId, NewListing, PlatformId,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    sort: Option<String>,
    page: Option<i64>,
    page_size: Option<i64>,
    platform: Option<PlatformId>,
    category: Option<CategoryId>,
    #[serde(default)]
    featured: bool,
    #[serde(default)]
    hot: bool,
}

/// Filter, sort, then page the marketplace
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<ListingDetails>>, ApiError> {
    let sort = match query.sort.as_deref() {
        Some(name) => name.parse::<SortKey>()?,
        None => SortKey::default(),
    };
    let filter = ListingFilter {
        platform_id: query.platform,
        category_id: query.category,
        featured_only: query.featured,
        hot_only: query.hot,
    };

    let listings = query::sorted(filter.apply(state.store.list_listings().await?), sort);
    let page = Page::from_vec(
        listings,
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        query.page.unwrap_or(1),
    )?;

    Ok(Json(Page {
        items: state.integrity.hydrate_all(page.items).await?,
        page: page.page,
        page_size: page.page_size,
        total: page.total,
        total_pages: page.total_pages,
    }))
}

pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<ListingDetails>>, ApiError> {
    let listings = state.store.list_featured_listings().await?;
    Ok(Json(state.integrity.hydrate_all(listings).await?))
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    #[serde(flatten)]
    details: ListingDetails,
    similar: Vec<Listing>,
    /// Only meaningful when the request carries an identity
    watching: bool,
}

pub async fn get(
    State(state): State<AppState>,
    identity: Option<Identity>,
    Path(id): Path<ListingId>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing = state.integrity.require_listing(id).await?;
    let similar = query::similar(&listing, &state.store.list_listings().await?);
    let watching = match identity {
        Some(identity) => state.watchlist.is_watching(identity.account_id, id).await?,
        None => false,
    };

    Ok(Json(ListingResponse {
        details: state.integrity.hydrate(listing).await?,
        similar,
        watching,
    }))
}

/// Listing payload. The owner is the acting account.
#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    title: String,
    description: String,
    followers: i64,
    engagement: f64,
    price: i64,
    #[serde(default)]
    cover_image_url: Option<String>,
    age: String,
    weekly_posts: String,
    #[serde(default)]
    is_featured: bool,
    #[serde(default)]
    is_hot: bool,
    platform_id: PlatformId,
    category_id: CategoryId,
}

pub async fn create(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<Listing>), ApiError> {
    let listing = state
        .integrity
        .create_listing(NewListing {
            title: req.title,
            description: req.description,
            followers: req.followers,
            engagement: req.engagement,
            price: req.price,
            cover_image_url: req.cover_image_url,
            age: req.age,
            weekly_posts: req.weekly_posts,
            is_featured: req.is_featured,
            is_hot: req.is_hot,
            owner_id: identity.account_id,
            platform_id: req.platform_id,
            category_id: req.category_id,
        })
        .await?;

    tracing::info!(
        "Account {} listed {} ({})",
        identity.account_id,
        listing.id,
        listing.title
    );
    Ok((StatusCode::CREATED, Json(listing)))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{seeded_app, send};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    fn titles(items: &Value) -> Vec<&str> {
        items
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["title"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_list_sorted_and_paged() {
        let (app, _) = seeded_app().await;

        let (status, page) =
            send(&app, "GET", "/api/listings?sort=price-high&page_size=2", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            titles(&page["items"]),
            vec!["Tech Review Channel", "Fashion Influencer Account"]
        );
        assert_eq!(page["total"], 3);
        assert_eq!(page["total_pages"], 2);
        assert_eq!(page["items"][0]["platform"]["name"], "YouTube");
        assert_eq!(page["items"][0]["owner"]["username"], "creator");
        assert!(page["items"][0]["owner"].get("password_hash").is_none());

        let (_, second) = send(
            &app,
            "GET",
            "/api/listings?sort=price-high&page_size=2&page=2",
            None,
            None,
        )
        .await;
        assert_eq!(titles(&second["items"]), vec!["Food Blogger Profile"]);

        let (_, beyond) = send(&app, "GET", "/api/listings?page=9", None, None).await;
        assert!(beyond["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_rejects_bad_arguments() {
        let (app, _) = seeded_app().await;

        let (status, body) = send(&app, "GET", "/api/listings?sort=cheapest", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");

        let (status, _) = send(&app, "GET", "/api/listings?page=0", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (app, _) = seeded_app().await;

        let (_, instagram) = send(&app, "GET", "/api/listings?platform=1&sort=price-low", None, None).await;
        assert_eq!(
            titles(&instagram["items"]),
            vec!["Food Blogger Profile", "Fashion Influencer Account"]
        );

        let (_, hot) = send(&app, "GET", "/api/listings?hot=true&sort=price-high", None, None).await;
        assert_eq!(
            titles(&hot["items"]),
            vec!["Fashion Influencer Account", "Food Blogger Profile"]
        );

        let (_, featured) = send(&app, "GET", "/api/listings/featured", None, None).await;
        assert_eq!(
            titles(&featured),
            vec!["Fashion Influencer Account", "Tech Review Channel"]
        );
    }

    #[tokio::test]
    async fn test_get_includes_similar_and_watch_state() {
        let (app, _) = seeded_app().await;

        let (status, listing) = send(&app, "GET", "/api/listings/1", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listing["title"], "Fashion Influencer Account");
        assert_eq!(listing["category"]["name"], "Fashion");
        // Food shares Instagram, Tech shares nothing
        assert_eq!(titles(&listing["similar"]), vec!["Food Blogger Profile"]);
        assert_eq!(listing["watching"], false);

        send(&app, "POST", "/api/watchlist", Some(1), Some(json!({ "listing_id": 1 }))).await;
        let (_, listing) = send(&app, "GET", "/api/listings/1", Some(1), None).await;
        assert_eq!(listing["watching"], true);

        let (status, _) = send(&app, "GET", "/api/listings/77", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_owned_by_caller() {
        let (app, _) = seeded_app().await;
        let payload = json!({
            "title": "Travel Diaries",
            "description": "Travel photography with a loyal audience.",
            "followers": 8000,
            "engagement": 6.3,
            "price": 90000,
            "age": "8 months",
            "weekly_posts": "3-4",
            "platform_id": 3,
            "category_id": 5
        });

        let (status, _) = send(&app, "POST", "/api/listings", None, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, created) = send(&app, "POST", "/api/listings", Some(1), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], 4);
        assert_eq!(created["owner_id"], 1);
        assert_eq!(created["is_featured"], false);

        let mut bad_platform = payload;
        bad_platform["platform_id"] = json!(42);
        let (status, body) = send(&app, "POST", "/api/listings", Some(1), Some(bad_platform)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "platform not found: 42");
    }
}
