//! Account types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Marketplace account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Account creation payload. The password is already hashed by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub full_name: Option<String>,
}

/// Public view of an account, attached to listings for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            full_name: account.full_name.clone(),
            avatar_url: account.avatar_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let account = Account {
            id: 1,
            username: "demo".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            email: "demo@example.com".to_string(),
            full_name: Some("Demo User".to_string()),
            avatar_url: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"username\":\"demo\""));
    }
}
