use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Signed-in user profile.
///
/// Unknown fields from the verifier (avatar, status, ...) are kept in `extra`
/// and written back out flattened, so the persisted record round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Expiry of the current token pair, milliseconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial user used by `SessionManager::update_user`.
///
/// `None` fields are left alone; `extra` entries are merged key by key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Option<Vec<String>>,
    pub department: Option<String>,
    pub token_expires_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Return a copy with `update` merged in
    pub fn merged(&self, update: UserUpdate) -> Self {
        let mut user = self.clone();
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(roles) = update.roles {
            user.roles = roles;
        }
        if let Some(department) = update.department {
            user.department = Some(department);
        }
        if let Some(expires_at) = update.token_expires_at {
            user.token_expires_at = Some(expires_at);
        }
        user.extra.extend(update.extra);
        user
    }

    /// Name, falling back to email, then "User"
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.email.is_empty() {
            &self.email
        } else {
            "User"
        }
    }

    pub fn initials(&self) -> String {
        fn first_char(s: &str) -> Option<String> {
            s.chars().next().map(|c| c.to_uppercase().to_string())
        }

        let parts: Vec<&str> = self.name.split_whitespace().collect();
        match parts.as_slice() {
            [first, second, ..] => format!(
                "{}{}",
                first_char(first).unwrap_or_default(),
                first_char(second).unwrap_or_default()
            ),
            [only] => first_char(only).unwrap_or_default(),
            [] => first_char(self.email.as_str()).unwrap_or_else(|| "U".to_string()),
        }
    }
}

/// Display name for an optional user ("Guest" when signed out)
pub fn display_name(user: Option<&User>) -> String {
    user.map(|u| u.display_name().to_string())
        .unwrap_or_else(|| "Guest".to_string())
}

/// Initials for an optional user ("G" when signed out)
pub fn user_initials(user: Option<&User>) -> String {
    user.map(User::initials).unwrap_or_else(|| "G".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jane() -> User {
        User {
            id: "user-3".into(),
            email: "jane@example.com".into(),
            name: "Jane Smith".into(),
            roles: vec!["manager".into(), "user".into()],
            department: Some("Marketing".into()),
            token_expires_at: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_merged_only_touches_given_fields() {
        let mut extra = Map::new();
        extra.insert("avatar".into(), json!("https://example.com/a.png"));
        let update = UserUpdate {
            name: Some("Jane Doe".into()),
            extra,
            ..Default::default()
        };

        let merged = jane().merged(update);
        assert_eq!(merged.name, "Jane Doe");
        assert_eq!(merged.email, "jane@example.com");
        assert_eq!(merged.department.as_deref(), Some("Marketing"));
        assert_eq!(merged.extra["avatar"], "https://example.com/a.png");
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut user = jane();
        assert_eq!(user.display_name(), "Jane Smith");
        user.name.clear();
        assert_eq!(user.display_name(), "jane@example.com");
        user.email.clear();
        assert_eq!(user.display_name(), "User");
        assert_eq!(display_name(None), "Guest");
    }

    #[test]
    fn test_initials() {
        let mut user = jane();
        assert_eq!(user.initials(), "JS");
        user.name = "admin".into();
        assert_eq!(user.initials(), "A");
        user.name.clear();
        assert_eq!(user.initials(), "J");
        user.email.clear();
        assert_eq!(user.initials(), "U");
        assert_eq!(user_initials(None), "G");
    }

    #[test]
    fn test_extra_fields_round_trip_flattened() {
        let raw = json!({
            "id": "user-1",
            "email": "admin@example.com",
            "name": "Admin User",
            "roles": ["admin", "user"],
            "status": "active",
            "tokenExpiresAt": 1_700_000_000_000_i64
        });
        let user: User = serde_json::from_value(raw.clone()).expect("parse user");
        assert_eq!(user.token_expires_at, Some(1_700_000_000_000));
        assert_eq!(user.extra["status"], "active");
        assert!(!user.extra.contains_key("tokenExpiresAt"));

        let back = serde_json::to_value(&user).expect("serialize user");
        assert_eq!(back, raw);
    }
}
