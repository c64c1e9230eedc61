//! Port traits (interfaces) for dependency injection

pub mod store;

pub use store::{AccountStore, CatalogStore, EntityStore, ListingStore, MessageStore, WatchlistStore};
