//! SocialSwap Types - Pure type definitions
//!
//! Entity records, insert payloads and hydrated read views for the
//! marketplace. No async runtime or storage dependencies live here.

pub mod account;
pub mod catalog;
pub mod listing;
pub mod message;
pub mod watchlist;

pub use account::*;
pub use catalog::*;
pub use listing::*;
pub use message::*;
pub use watchlist::*;

use serde::{Deserialize, Serialize};

/// Store-assigned identifier. Unique per entity kind, starts at 1.
pub type Id = i64;

pub type AccountId = Id;
pub type PlatformId = Id;
pub type CategoryId = Id;
pub type ListingId = Id;
pub type WatchEntryId = Id;
pub type MessageId = Id;

/// The closed set of entity kinds held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Platform,
    Category,
    Listing,
    WatchEntry,
    Message,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Account => write!(f, "account"),
            EntityKind::Platform => write!(f, "platform"),
            EntityKind::Category => write!(f, "category"),
            EntityKind::Listing => write!(f, "listing"),
            EntityKind::WatchEntry => write!(f, "watchlist entry"),
            EntityKind::Message => write!(f, "message"),
        }
    }
}
