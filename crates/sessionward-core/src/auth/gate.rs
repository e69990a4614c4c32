//! Role-based access checks for the presentation layer.

use super::session::SessionState;
use crate::models::User;
use crate::utils::now_millis;

pub fn has_role(user: Option<&User>, role: &str) -> bool {
    user.is_some_and(|u| u.has_role(role))
}

/// True when the user holds at least one of `roles`
pub fn has_any_role<S: AsRef<str>>(user: Option<&User>, roles: &[S]) -> bool {
    roles.iter().any(|role| has_role(user, role.as_ref()))
}

/// True when the user holds every one of `roles`; vacuously true for none
pub fn has_all_roles<S: AsRef<str>>(user: Option<&User>, roles: &[S]) -> bool {
    roles.iter().all(|role| has_role(user, role.as_ref()))
}

/// Requirement for entering a protected view.
///
/// `role` and `roles` are combined with any-of semantics. A gate with neither
/// only requires a session.
#[derive(Debug, Clone, Default)]
pub struct RoleGate {
    pub role: Option<String>,
    pub roles: Vec<String>,
}

impl RoleGate {
    /// Gate that only requires authentication
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            roles: Vec::new(),
        }
    }

    pub fn any_of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: None,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    fn required(&self) -> Vec<&str> {
        self.role
            .iter()
            .chain(self.roles.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn permits(&self, user: Option<&User>) -> bool {
        let required = self.required();
        required.is_empty() || has_any_role(user, required.as_slice())
    }
}

/// Outcome of guarding a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Session restore or sign-in still running
    Loading,
    Unauthenticated,
    Forbidden,
    Granted,
}

/// Decide what a protected view should show for `state`
pub fn guard(state: &SessionState, gate: &RoleGate) -> Access {
    guard_at(state, gate, now_millis())
}

/// `guard` against an explicit clock. A pair that has expired by `now`
/// counts as signed out even if no transition has recorded it yet.
pub fn guard_at(state: &SessionState, gate: &RoleGate, now: i64) -> Access {
    if state.is_loading {
        Access::Loading
    } else if !state.is_session_valid(now) {
        Access::Unauthenticated
    } else if !gate.permits(state.user.as_ref()) {
        Access::Forbidden
    } else {
        Access::Granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenPair;
    use crate::utils::MS_PER_MINUTE;
    use serde_json::Map;

    fn user_with(roles: &[&str]) -> User {
        User {
            id: "user-3".into(),
            email: "jane@example.com".into(),
            name: "Jane Smith".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            department: None,
            token_expires_at: None,
            extra: Map::new(),
        }
    }

    fn authenticated(user: User) -> SessionState {
        authenticated_at(user, now_millis())
    }

    fn authenticated_at(user: User, issued_at: i64) -> SessionState {
        SessionState {
            user: Some(user),
            tokens: Some(TokenPair::issue("a".into(), "r".into(), None, Some(60), issued_at)),
            is_authenticated: true,
            is_loading: false,
            ..SessionState::default()
        }
    }

    #[test]
    fn test_any_of_semantics() {
        let manager = user_with(&["manager", "user"]);
        assert!(RoleGate::any_of(["admin", "manager"]).permits(Some(&manager)));
        assert!(!RoleGate::role("admin").permits(Some(&manager)));
    }

    #[test]
    fn test_role_helpers() {
        let manager = user_with(&["manager", "user"]);
        assert!(has_role(Some(&manager), "user"));
        assert!(has_any_role(Some(&manager), &["admin", "manager"]));
        assert!(has_all_roles(Some(&manager), &["manager", "user"]));
        assert!(!has_all_roles(Some(&manager), &["admin", "manager"]));
        assert!(!has_role(None, "user"));
        assert!(has_all_roles::<&str>(Some(&manager), &[]));
        assert!(has_all_roles::<&str>(None, &[]));
        assert!(!has_all_roles(None, &["user"]));
    }

    #[test]
    fn test_single_role_and_list_combine() {
        let guest = user_with(&["guest"]);
        let gate = RoleGate {
            role: Some("admin".into()),
            roles: vec!["guest".into()],
        };
        assert!(gate.permits(Some(&guest)));
    }

    #[test]
    fn test_guard_outcomes() {
        let gate = RoleGate::role("admin");
        assert_eq!(guard(&SessionState::default(), &gate), Access::Loading);

        let signed_out = SessionState {
            is_loading: false,
            ..SessionState::default()
        };
        assert_eq!(guard(&signed_out, &gate), Access::Unauthenticated);

        let jane = authenticated(user_with(&["manager", "user"]));
        assert_eq!(guard(&jane, &gate), Access::Forbidden);
        assert_eq!(guard(&jane, &RoleGate::authenticated()), Access::Granted);

        let admin = authenticated(user_with(&["admin"]));
        assert_eq!(guard(&admin, &gate), Access::Granted);
    }

    #[test]
    fn test_expired_pair_is_unauthenticated() {
        let now = now_millis();
        let stale = authenticated_at(user_with(&["admin"]), now - 120 * MS_PER_MINUTE);
        assert!(stale.is_authenticated);

        let gate = RoleGate::role("admin");
        assert_eq!(guard(&stale, &gate), Access::Unauthenticated);
        assert_eq!(guard_at(&stale, &gate, now - 90 * MS_PER_MINUTE), Access::Granted);
    }
}
