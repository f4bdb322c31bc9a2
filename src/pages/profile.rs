// 👤 Profile - who the dashboard belongs to

use crate::auth::User;
use crate::error::Result;
use crate::storage::{keys, LocalStore, Persisted};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub monthly_income: f64,
    #[serde(default)]
    pub occupation: String,
}

impl Profile {
    pub fn from_user(user: &User) -> Self {
        Profile {
            name: user.name.clone(),
            email: user.email.clone(),
            ..Profile::seed()
        }
    }

    /// Stored profile, or one started from the signed-in user.
    pub fn load_for(store: &LocalStore, user: Option<&User>) -> Result<Self> {
        match store.get_json::<Profile>(keys::PROFILE)? {
            Some(profile) => Ok(profile),
            None => Ok(user.map(Profile::from_user).unwrap_or_else(Profile::seed)),
        }
    }

    /// Replace every field at once; nothing changes when validation fails.
    pub fn update(&mut self, next: Profile) -> Result<()> {
        let email = next.email.trim();
        let phone_digits = next.phone.chars().filter(|c| c.is_ascii_digit()).count();
        Validator::new("Profile")
            .require_text("name", &next.name, "your name")
            .require_text("email", email, "your email")
            .check(
                email.is_empty() || email.contains('@'),
                "email",
                "Please enter a valid email address",
            )
            .check(
                next.phone.trim().is_empty() || phone_digits == 10,
                "phone",
                "Phone number must have 10 digits",
            )
            .require_non_negative("monthlyIncome", next.monthly_income, "Monthly income")
            .finish()?;

        *self = Profile {
            name: next.name.trim().to_string(),
            email: email.to_string(),
            phone: next.phone.trim().to_string(),
            city: next.city.trim().to_string(),
            state: next.state.trim().to_string(),
            monthly_income: next.monthly_income,
            occupation: next.occupation.trim().to_string(),
        };
        info!(email = %self.email, "profile updated");
        Ok(())
    }
}

impl Persisted for Profile {
    const STORAGE_KEY: &'static str = keys::PROFILE;

    fn seed() -> Self {
        Profile {
            name: "Guest".to_string(),
            email: String::new(),
            phone: String::new(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            monthly_income: 45000.0,
            occupation: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthSession;

    #[test]
    fn test_seeded_from_session_user() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut session = AuthSession::restore(&store).unwrap();
        let user = session.login(&store, "kavya@example.com", "pw").unwrap();

        let profile = Profile::load_for(&store, session.current_user()).unwrap();
        assert_eq!(profile.name, user.name);
        assert_eq!(profile.email, "kavya@example.com");
        assert_eq!(profile.city, "Chennai");

        assert_eq!(Profile::load_for(&store, None).unwrap().name, "Guest");
    }

    #[test]
    fn test_update_validates_and_persists() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut profile = Profile::load(&store).unwrap();

        let bad = Profile {
            email: "not-an-email".to_string(),
            phone: "12345".to_string(),
            ..profile.clone()
        };
        assert!(profile.update(bad).is_err());
        assert_eq!(profile.name, "Guest");

        let good = Profile {
            name: " Kavya ".to_string(),
            email: "kavya@example.com".to_string(),
            phone: "98400 12345".to_string(),
            monthly_income: 62000.0,
            ..profile.clone()
        };
        profile.update(good).unwrap();
        profile.save(&store).unwrap();

        let loaded = Profile::load_for(&store, None).unwrap();
        assert_eq!(loaded.name, "Kavya");
        assert_eq!(loaded.monthly_income, 62000.0);
    }
}
