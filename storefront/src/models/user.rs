//! Account and session models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::UserId;

/// Public profile of a storefront account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Account ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Whether the account may use the admin dashboard.
    #[serde(default)]
    pub is_admin: bool,
    /// Remaining profile fields, kept so a stored record round-trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Create a user with the core fields set.
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    /// Look up a string profile field outside the core set.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }

    /// Name to show in greetings: first name when present, else username.
    pub fn display_name(&self) -> &str {
        self.field("first_name")
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Access and refresh credential pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer token attached to authorized requests.
    pub access: String,
    /// Token used to invalidate the server session on logout.
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Response body of login and registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub tokens: TokenPair,
}

/// Login form.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Sign-up form.
#[derive(Clone, Default, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Partial profile edit. Unset fields are left unchanged on the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileUpdate {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

/// Password change form.
#[derive(Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_user_minimal_record() {
        let user: User =
            serde_json::from_value(json!({"id": 1, "username": "alice", "is_admin": false}))
                .unwrap();
        assert_eq!(user, User::new(1, "alice"));
    }

    #[test]
    fn test_user_keeps_extra_fields() {
        let raw = json!({
            "id": 3,
            "username": "bob",
            "email": "bob@example.com",
            "is_admin": true,
            "first_name": "Bob",
            "phone": "555"
        });
        let user: User = serde_json::from_value(raw.clone()).unwrap();
        assert!(user.is_admin);
        assert_eq!(user.display_name(), "Bob");
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn test_secrets_not_in_debug() {
        let tokens = TokenPair {
            access: "secret-a".into(),
            refresh: "secret-r".into(),
        };
        let creds = Credentials::new("alice", "hunter2");
        assert!(!format!("{tokens:?}").contains("secret"));
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
