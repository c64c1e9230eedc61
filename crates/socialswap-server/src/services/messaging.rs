//! Messaging relay between buyers and sellers

use super::Integrity;
use socialswap_core::ports::MessageStore;
use socialswap_core::{AccountId, ListingId, Message, NewMessage, Result};

pub struct MessagingRelay {
    integrity: Integrity,
}

/// Newest first. Messages created in the same instant fall back to id.
fn newest_first(messages: &mut [Message]) {
    messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

impl MessagingRelay {
    pub fn new(integrity: Integrity) -> Self {
        Self { integrity }
    }

    /// Send a message about a listing. The read flag starts unset.
    pub async fn send(
        &self,
        from: AccountId,
        to: AccountId,
        listing_id: ListingId,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Message> {
        let message = NewMessage {
            subject: subject.into(),
            content: content.into(),
            from_account_id: from,
            to_account_id: to,
            listing_id,
        };
        self.integrity.check_message_refs(&message).await?;
        self.integrity.store().insert_message(message).await
    }

    /// Every message the account sent or received, newest first
    pub async fn list_for_account(&self, account_id: AccountId) -> Result<Vec<Message>> {
        let mut messages = self
            .integrity
            .store()
            .list_messages_involving(account_id)
            .await?;
        newest_first(&mut messages);
        Ok(messages)
    }

    /// Messages addressed to the account that are still unread, newest first
    pub async fn unread_for_account(&self, account_id: AccountId) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .integrity
            .store()
            .list_messages_involving(account_id)
            .await?
            .into_iter()
            .filter(|m| m.to_account_id == account_id && !m.read)
            .collect();
        newest_first(&mut messages);
        Ok(messages)
    }
}
