//! Business logic services

pub mod integrity;
pub mod messaging;
pub mod watchlist;

pub use integrity::Integrity;
pub use messaging::MessagingRelay;
pub use watchlist::WatchlistManager;
