//! Message handlers

use super::ApiError;
use crate::extractors::Identity;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use socialswap_core::{AccountId, ListingId, Message};

#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    unread: bool,
}

/// Conversation history, newest first. `?unread=true` narrows to
/// received messages not yet read.
pub async fn list(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<InboxQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = if query.unread {
        state.messages.unread_for_account(identity.account_id).await?
    } else {
        state.messages.list_for_account(identity.account_id).await?
    };
    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    to_account_id: AccountId,
    listing_id: ListingId,
    subject: String,
    content: String,
}

pub async fn send(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<SendRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let message = state
        .messages
        .send(
            identity.account_id,
            req.to_account_id,
            req.listing_id,
            req.subject,
            req.content,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{seeded_app, send};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_then_read_inbox() {
        let (app, _) = seeded_app().await;
        let enquiry = json!({
            "to_account_id": 2,
            "listing_id": 1,
            "subject": "Interested",
            "content": "Is the account still available?"
        });

        let (status, _) = send(&app, "POST", "/api/messages", None, Some(enquiry.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, message) = send(&app, "POST", "/api/messages", Some(1), Some(enquiry)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(message["from_account_id"], 1);
        assert_eq!(message["read"], false);

        let (_, sent) = send(&app, "GET", "/api/messages", Some(1), None).await;
        assert_eq!(sent.as_array().unwrap().len(), 1);
        let (_, unread) = send(&app, "GET", "/api/messages?unread=true", Some(1), None).await;
        assert!(unread.as_array().unwrap().is_empty());

        let (_, inbox) = send(&app, "GET", "/api/messages?unread=true", Some(2), None).await;
        assert_eq!(inbox[0]["subject"], "Interested");
    }

    #[tokio::test]
    async fn test_send_to_unknown_recipient() {
        let (app, _) = seeded_app().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/messages",
            Some(1),
            Some(json!({
                "to_account_id": 9,
                "listing_id": 1,
                "subject": "Hello",
                "content": "Anyone there?"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "account not found: 9");
    }
}
