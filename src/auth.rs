// 🔐 Auth Session - mock login/signup backed by local storage
//
// No credentials are verified: any well-formed email/password logs in.
// The session survives restarts through the `budgetApp_user` key.

use crate::error::{BudgetError, Result};
use crate::storage::{keys, Event, LocalStore};
use crate::validation::Validator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    fn new(name: String, email: String) -> Self {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            created_at: Utc::now(),
        }
    }
}

pub struct AuthSession {
    user: Option<User>,
}

impl AuthSession {
    /// Pick up whatever session the store remembers.
    pub fn restore(store: &LocalStore) -> Result<Self> {
        let user: Option<User> = store.get_json(keys::USER)?;
        Ok(AuthSession { user })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The signed-in user, or `BudgetError::Auth` when nobody is.
    pub fn require_user(&self) -> Result<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| BudgetError::Auth("not signed in".to_string()))
    }

    pub fn login(&mut self, store: &LocalStore, email: &str, password: &str) -> Result<User> {
        let email = email.trim();
        Validator::new("Login")
            .require_text("email", email, "your email")
            .require_text("password", password, "your password")
            .check(
                email.is_empty() || email.contains('@'),
                "email",
                "Please enter a valid email address",
            )
            .finish()?;

        let name = email.split('@').next().unwrap_or(email).to_string();
        let user = User::new(name, email.to_string());
        self.start(store, user, "login")
    }

    pub fn signup(
        &mut self,
        store: &LocalStore,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let email = email.trim();
        Validator::new("Signup")
            .require_text("name", name, "your name")
            .require_text("email", email, "your email")
            .check(
                email.is_empty() || email.contains('@'),
                "email",
                "Please enter a valid email address",
            )
            .check(
                password.chars().count() >= MIN_PASSWORD_LEN,
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            )
            .finish()?;

        let user = User::new(name.trim().to_string(), email.to_string());
        self.start(store, user, "signup")
    }

    /// Returns the user that was logged out, if any.
    pub fn logout(&mut self, store: &LocalStore) -> Result<Option<User>> {
        store.remove(keys::USER)?;
        let previous = self.user.take();

        if let Some(user) = &previous {
            store.record_event(&Event::new(
                "logout",
                "user",
                &user.id,
                serde_json::json!({}),
                &user.email,
            ))?;
            info!(email = %user.email, "user logged out");
        }

        Ok(previous)
    }

    fn start(&mut self, store: &LocalStore, user: User, event_type: &str) -> Result<User> {
        store.set_json(keys::USER, &user)?;
        store.record_event(&Event::new(
            event_type,
            "user",
            &user.id,
            serde_json::json!({ "name": user.name }),
            &user.email,
        ))?;
        info!(email = %user.email, event_type, "session started");

        self.user = Some(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BudgetError;

    #[test]
    fn test_login_accepts_any_credentials_and_persists() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut session = AuthSession::restore(&store).unwrap();
        assert!(matches!(session.require_user(), Err(BudgetError::Auth(_))));

        let user = session.login(&store, "priya@example.com", "anything").unwrap();
        assert_eq!(user.name, "priya");
        assert_eq!(session.require_user().unwrap().email, "priya@example.com");

        let restored = AuthSession::restore(&store).unwrap();
        assert_eq!(restored.current_user(), Some(&user));

        let events = store.events_for_entity("user", &user.id).unwrap();
        assert_eq!(events[0].event_type, "login");
    }

    #[test]
    fn test_login_requires_fields() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut session = AuthSession::restore(&store).unwrap();

        let err = session.login(&store, "", "").unwrap_err();
        match err {
            BudgetError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.get_raw(keys::USER).unwrap().is_none());
    }

    #[test]
    fn test_login_rejects_malformed_email() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut session = AuthSession::restore(&store).unwrap();
        assert!(session.login(&store, "priya", "secret").is_err());
    }

    #[test]
    fn test_signup_enforces_password_length() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut session = AuthSession::restore(&store).unwrap();

        assert!(session
            .signup(&store, "Arun Kumar", "arun@example.com", "12345")
            .is_err());

        let user = session
            .signup(&store, "Arun Kumar", "arun@example.com", "123456")
            .unwrap();
        assert_eq!(user.name, "Arun Kumar");
    }

    #[test]
    fn test_logout_clears_session() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut session = AuthSession::restore(&store).unwrap();
        let user = session.login(&store, "meena@example.com", "pw").unwrap();

        let previous = session.logout(&store).unwrap();
        assert_eq!(previous.map(|u| u.id), Some(user.id.clone()));
        assert!(session.require_user().is_err());
        assert!(AuthSession::restore(&store).unwrap().current_user().is_none());

        // Logging out twice is harmless
        assert!(session.logout(&store).unwrap().is_none());
        assert_eq!(store.events_for_entity("user", &user.id).unwrap().len(), 2);
    }
}
