use serde::{Deserialize, Serialize};

use super::RowId;

/// User row as stored in the `users` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: RowId,
    pub username: String,
    /// bcrypt hash; absent for accounts created by an administrator
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub is_pro: Option<bool>,
}

impl UserRow {
    /// Listing view without the credential hash
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            is_pro: self.is_pro.unwrap_or(false),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            username: self.username.clone(),
            is_pro: self.is_pro.unwrap_or(false),
        }
    }
}

/// User as returned by the admin endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: RowId,
    pub username: String,
    pub is_pro: bool,
}

/// Authenticated subject carried by identity tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: RowId,
    pub username: String,
    pub is_pro: bool,
}

/// Admin user update as received, accepting both `is_pro` and legacy `isPro`
#[derive(Debug, Clone, Deserialize)]
pub struct UserPatch {
    pub username: String,
    #[serde(default)]
    pub is_pro: Option<bool>,
    #[serde(default, rename = "isPro")]
    pub is_pro_legacy: Option<bool>,
}

impl UserPatch {
    /// Collapse the two flag spellings into the canonical row shape.
    /// `is_pro` wins over `isPro`; neither means `false`.
    pub fn normalize(self) -> UserUpsert {
        UserUpsert {
            username: self.username.trim().to_string(),
            is_pro: self.is_pro.or(self.is_pro_legacy).unwrap_or(false),
        }
    }
}

/// Canonical row written by admin user upserts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUpsert {
    pub username: String,
    pub is_pro: bool,
}

/// Row inserted on registration
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_pro: bool,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            is_pro: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: serde_json::Value) -> UserUpsert {
        serde_json::from_value::<UserPatch>(value).unwrap().normalize()
    }

    #[test]
    fn test_normalize_accepts_both_spellings() {
        assert!(patch(json!({ "username": "a", "is_pro": true })).is_pro);
        assert!(patch(json!({ "username": "a", "isPro": true })).is_pro);
    }

    #[test]
    fn test_normalize_defaults_to_false() {
        assert!(!patch(json!({ "username": "a" })).is_pro);
        assert!(!patch(json!({ "username": "a", "is_pro": null })).is_pro);
    }

    #[test]
    fn test_normalize_prefers_canonical_spelling() {
        let upsert = patch(json!({ "username": " a ", "is_pro": false, "isPro": true }));
        assert_eq!(
            upsert,
            UserUpsert {
                username: "a".to_string(),
                is_pro: false
            }
        );
    }

    #[test]
    fn test_summary_hides_password_hash() {
        let row: UserRow = serde_json::from_value(json!({
            "id": 3,
            "username": "alice",
            "password_hash": "$2b$10$abc",
            "is_pro": null
        }))
        .unwrap();

        let summary = serde_json::to_value(row.summary()).unwrap();
        assert_eq!(summary, json!({ "id": 3, "username": "alice", "is_pro": false }));
    }
}
