// 🔑 Password Manager - a local vault with strength scoring
//
// Entries are kept as the user typed them (this is a simulation, not a
// secure vault). Reuse detection compares SHA-256 fingerprints so the
// grouping never needs plaintext side by side.

use crate::error::{BudgetError, Result};
use crate::storage::{keys, Persisted};
use crate::validation::Validator;
use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::info;

pub const MIN_GENERATED_LEN: usize = 8;
pub const MAX_GENERATED_LEN: usize = 64;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{}?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

/// Weak: under 8 characters or a single character class.
/// Strong: 12+ characters using at least three of lower/upper/digit/symbol.
/// Everything else is medium.
pub fn score_password(password: &str) -> PasswordStrength {
    let len = password.chars().count();
    let classes = [
        password.chars().any(|c| c.is_lowercase()),
        password.chars().any(|c| c.is_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_alphanumeric()),
    ]
    .iter()
    .filter(|present| **present)
    .count();

    if len < 8 || classes <= 1 {
        PasswordStrength::Weak
    } else if len >= 12 && classes >= 3 {
        PasswordStrength::Strong
    } else {
        PasswordStrength::Medium
    }
}

/// Random password with at least one character from every class.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    let length = length.clamp(MIN_GENERATED_LEN, MAX_GENERATED_LEN);
    let classes = [LOWER, UPPER, DIGITS, SYMBOLS];
    let all: Vec<u8> = classes.concat();

    let mut chars: Vec<u8> = classes
        .iter()
        .filter_map(|class| class.choose(rng).copied())
        .collect();
    while chars.len() < length {
        if let Some(c) = all.choose(rng) {
            chars.push(*c);
        }
    }

    // Fisher-Yates so the guaranteed characters are not always up front
    for i in (1..chars.len()).rev() {
        let j = rng.random_range(0..=i);
        chars.swap(i, j);
    }

    chars.into_iter().map(char::from).collect()
}

fn fingerprint(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// ENTRIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordEntry {
    pub id: String,
    pub website: String,
    pub username: String,
    pub password: String,
    pub strength: PasswordStrength,
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl PasswordEntry {
    /// Copy safe to show in a listing.
    pub fn masked(&self) -> PasswordEntry {
        PasswordEntry {
            password: "•".repeat(self.password.chars().count().min(12)),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordEntry {
    pub website: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordVault {
    entries: Vec<PasswordEntry>,
}

impl PasswordVault {
    pub fn new() -> Self {
        PasswordVault::default()
    }

    pub fn all(&self) -> &[PasswordEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&PasswordEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn add(&mut self, input: NewPasswordEntry) -> Result<PasswordEntry> {
        Validator::new("PasswordEntry")
            .require_text("website", &input.website, "a website")
            .require_text("username", &input.username, "a username")
            .require_text("password", &input.password, "a password")
            .finish()?;

        let entry = PasswordEntry {
            id: uuid::Uuid::new_v4().to_string(),
            website: input.website.trim().to_string(),
            username: input.username.trim().to_string(),
            strength: score_password(&input.password),
            password: input.password,
            category: input.category,
            created_at: Utc::now(),
        };
        info!(id = %entry.id, website = %entry.website, strength = ?entry.strength, "vault entry added");
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn update_password(&mut self, id: &str, password: &str) -> Result<PasswordEntry> {
        Validator::new("PasswordEntry")
            .require_text("password", password, "a password")
            .finish()?;

        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| BudgetError::not_found("password entry", id))?;
        entry.password = password.to_string();
        entry.strength = score_password(password);
        info!(id, strength = ?entry.strength, "vault password changed");
        Ok(entry.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<PasswordEntry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| BudgetError::not_found("password entry", id))?;
        Ok(self.entries.remove(pos))
    }

    /// Case-insensitive match on website, username or category.
    pub fn search(&self, query: &str) -> Vec<&PasswordEntry> {
        let q = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                q.is_empty()
                    || e.website.to_lowercase().contains(&q)
                    || e.username.to_lowercase().contains(&q)
                    || e.category.to_lowercase().contains(&q)
            })
            .collect()
    }

    pub fn weak_entries(&self) -> Vec<&PasswordEntry> {
        self.entries
            .iter()
            .filter(|e| e.strength == PasswordStrength::Weak)
            .collect()
    }

    /// Groups of entry ids sharing the same password (groups of 2+ only).
    pub fn reused(&self) -> Vec<Vec<String>> {
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for e in &self.entries {
            groups
                .entry(fingerprint(&e.password))
                .or_default()
                .push(e.id.clone());
        }
        let mut reused: Vec<Vec<String>> = groups.into_values().filter(|g| g.len() > 1).collect();
        reused.sort();
        reused
    }

    pub fn masked(&self) -> Vec<PasswordEntry> {
        self.entries.iter().map(PasswordEntry::masked).collect()
    }
}

impl Persisted for PasswordVault {
    const STORAGE_KEY: &'static str = keys::PASSWORDS;

    fn seed() -> Self {
        let mut vault = PasswordVault::new();
        for (website, username, password, category) in [
            ("netbanking.sbi", "priya.k", "Sbi@Secure#2024", "Banking"),
            ("gmail.com", "priya.kumar", "priya123", "Email"),
            ("irctc.co.in", "priyak88", "Train$Pass9", "Travel"),
        ] {
            let _ = vault.add(NewPasswordEntry {
                website: website.to_string(),
                username: username.to_string(),
                password: password.to_string(),
                category: category.to_string(),
            });
        }
        vault
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn entry(website: &str, password: &str) -> NewPasswordEntry {
        NewPasswordEntry {
            website: website.to_string(),
            username: "user".to_string(),
            password: password.to_string(),
            category: "Personal".to_string(),
        }
    }

    #[test]
    fn test_scoring() {
        assert_eq!(score_password("short"), PasswordStrength::Weak);
        assert_eq!(score_password("alllowercaseletters"), PasswordStrength::Weak);
        assert_eq!(score_password("Abcdef12"), PasswordStrength::Medium);
        assert_eq!(score_password("abcdefgh1234"), PasswordStrength::Medium);
        assert_eq!(score_password("Chennai@2025!x"), PasswordStrength::Strong);
        assert_eq!(score_password("Abcdefgh1234"), PasswordStrength::Strong);
    }

    #[test]
    fn test_add_scores_entry() {
        let mut vault = PasswordVault::new();
        let weak = vault.add(entry("a.com", "short")).unwrap();
        let strong = vault.add(entry("b.com", "Xy7#kLm9$pQ2w")).unwrap();
        assert_eq!(weak.strength, PasswordStrength::Weak);
        assert_eq!(strong.strength, PasswordStrength::Strong);
        assert_eq!(vault.weak_entries().len(), 1);
    }

    #[test]
    fn test_add_requires_fields() {
        let mut vault = PasswordVault::new();
        assert!(vault.add(entry("", "")).is_err());
        assert!(vault.all().is_empty());
    }

    #[test]
    fn test_update_rescores() {
        let mut vault = PasswordVault::new();
        let id = vault.add(entry("a.com", "short")).unwrap().id;
        let updated = vault.update_password(&id, "Much#Better2025").unwrap();
        assert_eq!(updated.strength, PasswordStrength::Strong);
        assert!(vault.update_password("missing", "x").is_err());
    }

    #[test]
    fn test_reuse_detection() {
        let mut vault = PasswordVault::new();
        let a = vault.add(entry("a.com", "same-Pass-1")).unwrap().id;
        let b = vault.add(entry("b.com", "same-Pass-1")).unwrap().id;
        vault.add(entry("c.com", "different-1")).unwrap();

        let reused = vault.reused();
        assert_eq!(reused.len(), 1);
        let mut group = reused[0].clone();
        group.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(group, expected);
    }

    #[test]
    fn test_search_and_mask() {
        let mut vault = PasswordVault::new();
        vault.add(entry("netbanking.hdfc", "Secret#Pass123")).unwrap();
        vault.add(entry("flipkart.com", "Shop#Pass123")).unwrap();

        assert_eq!(vault.search("HDFC").len(), 1);
        assert_eq!(vault.search("").len(), 2);

        let masked = vault.masked();
        assert!(masked.iter().all(|e| e.password.chars().all(|c| c == '•')));
        assert_eq!(vault.all()[0].password, "Secret#Pass123");
    }

    #[test]
    fn test_generated_passwords_are_strong() {
        let mut rng = SmallRng::seed_from_u64(42);
        for len in [4, 12, 20, 200] {
            let pw = generate_password(&mut rng, len);
            assert_eq!(pw.len(), len.clamp(MIN_GENERATED_LEN, MAX_GENERATED_LEN));
            assert!(pw.chars().any(|c| c.is_ascii_lowercase()));
            assert!(pw.chars().any(|c| c.is_ascii_uppercase()));
            assert!(pw.chars().any(|c| c.is_ascii_digit()));
            if pw.len() >= 12 {
                assert_eq!(score_password(&pw), PasswordStrength::Strong);
            }
        }
    }
}
