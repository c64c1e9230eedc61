//! Buyer/seller message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, ListingId, MessageId};

/// A message about a listing, sent from one account to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub subject: String,
    pub content: String,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub listing_id: ListingId,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether the account sent or received this message
    pub fn involves(&self, account_id: AccountId) -> bool {
        self.from_account_id == account_id || self.to_account_id == account_id
    }
}

/// Message creation payload. The read flag always starts unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub subject: String,
    pub content: String,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub listing_id: ListingId,
}

impl NewMessage {
    pub fn into_message(self, id: MessageId, created_at: DateTime<Utc>) -> Message {
        Message {
            id,
            subject: self.subject,
            content: self.content,
            from_account_id: self.from_account_id,
            to_account_id: self.to_account_id,
            listing_id: self.listing_id,
            read: false,
            created_at,
        }
    }
}
