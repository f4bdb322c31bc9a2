// 🗄️ Local Storage - JSON blobs by key, backed by SQLite + WAL
//
// Every page keeps its records in one key, written as a JSON array/object
// with no schema versioning. An events table keeps an audit trail of
// session and money-moving actions.

use crate::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// STORAGE KEYS
// ============================================================================

pub mod keys {
    pub const USER: &str = "budgetApp_user";
    pub const LANGUAGE: &str = "selectedLanguage";
    pub const GOALS: &str = "financialGoals";
    pub const REMINDERS: &str = "chennai-reminders";
    pub const BANK_TRANSACTIONS: &str = "bankTransactions";
    pub const BENEFICIARIES: &str = "beneficiaries";
    pub const PASSWORDS: &str = "passwords";
    pub const SCHEME_NOTIFICATIONS: &str = "schemeNotifications";

    pub const EXPENSES: &str = "budgetApp_expenses";
    pub const BUDGET_PLAN: &str = "budgetApp_budgetPlan";
    pub const PROFILE: &str = "budgetApp_profile";
    pub const SUBSCRIPTIONS: &str = "budgetApp_subscriptions";
    pub const CLOTHING: &str = "budgetApp_clothing";
    pub const INVESTMENTS: &str = "budgetApp_investments";
    pub const FAMILY: &str = "budgetApp_family";
    pub const HEALTH_EXPENSES: &str = "budgetApp_healthExpenses";
}

// ============================================================================
// AUDIT EVENTS
// ============================================================================

/// Event for audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

// ============================================================================
// LOCAL STORE
// ============================================================================

pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open (or create) a file-backed store in WAL mode.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let store = LocalStore { conn };
        store.setup()?;
        info!(path = %path.display(), "local store opened");
        Ok(store)
    }

    /// Store that lives only as long as the process, like a browser tab.
    pub fn open_in_memory() -> Result<Self> {
        let store = LocalStore {
            conn: Connection::open_in_memory()?,
        };
        store.setup()?;
        debug!("in-memory local store opened");
        Ok(store)
    }

    fn setup(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS local_storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event_id TEXT UNIQUE NOT NULL,
                timestamp TEXT NOT NULL,
                event_type TEXT NOT NULL,
                entity_type TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                data TEXT NOT NULL,
                actor TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
            [],
        )?;

        Ok(())
    }

    // ------------------------------------------------------------------------
    // Raw values
    // ------------------------------------------------------------------------

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!(key, bytes = value.len(), "storage write");
        Ok(())
    }

    /// Returns true when the key existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        debug!(key, removed, "storage remove");
        Ok(removed > 0)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM local_storage ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Wipe every key (the audit trail is kept).
    pub fn clear(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM local_storage", [])?;
        info!(removed, "local store cleared");
        Ok(removed)
    }

    // ------------------------------------------------------------------------
    // JSON values
    // ------------------------------------------------------------------------

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }

    // ------------------------------------------------------------------------
    // Audit events
    // ------------------------------------------------------------------------

    pub fn record_event(&self, event: &Event) -> Result<()> {
        self.conn.execute(
            "INSERT INTO events (event_id, timestamp, event_type, entity_type, entity_id, data, actor)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.event_id,
                event.timestamp.to_rfc3339(),
                event.event_type,
                event.entity_type,
                event.entity_id,
                serde_json::to_string(&event.data)?,
                event.actor,
            ],
        )?;
        info!(
            event_type = %event.event_type,
            entity_type = %event.entity_type,
            entity_id = %event.entity_id,
            actor = %event.actor,
            "audit event"
        );
        Ok(())
    }

    pub fn events_for_entity(&self, entity_type: &str, entity_id: &str) -> Result<Vec<Event>> {
        self.query_events(
            "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
             FROM events WHERE entity_type = ?1 AND entity_id = ?2 ORDER BY id",
            params![entity_type, entity_id],
        )
    }

    /// Most recent first.
    pub fn recent_events(&self, limit: usize) -> Result<Vec<Event>> {
        self.query_events(
            "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
             FROM events ORDER BY id DESC LIMIT ?1",
            params![limit as i64],
        )
    }

    fn query_events(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (event_id, timestamp, event_type, entity_type, entity_id, data, actor) = row?;
            events.push(Event {
                event_id,
                timestamp: DateTime::parse_from_rfc3339(&timestamp)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
                event_type,
                entity_type,
                entity_id,
                data: serde_json::from_str(&data)?,
                actor,
            });
        }
        Ok(events)
    }
}

// ============================================================================
// PERSISTED PAGE STATE
// ============================================================================

/// A page view-model that lives under one storage key.
///
/// A missing key yields `seed()`, the sample records a fresh dashboard shows.
pub trait Persisted: Serialize + DeserializeOwned + Sized {
    const STORAGE_KEY: &'static str;

    fn seed() -> Self;

    fn load(store: &LocalStore) -> Result<Self> {
        Ok(store
            .get_json(Self::STORAGE_KEY)?
            .unwrap_or_else(Self::seed))
    }

    fn save(&self, store: &LocalStore) -> Result<()> {
        store.set_json(Self::STORAGE_KEY, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(transparent)]
    struct Notes {
        items: Vec<String>,
    }

    impl Persisted for Notes {
        const STORAGE_KEY: &'static str = "test_notes";

        fn seed() -> Self {
            Notes {
                items: vec!["sample".to_string()],
            }
        }
    }

    #[test]
    fn test_raw_set_get_overwrite() {
        let store = LocalStore::open_in_memory().unwrap();
        assert!(store.get_raw(keys::LANGUAGE).unwrap().is_none());

        store.set_raw(keys::LANGUAGE, "ta").unwrap();
        store.set_raw(keys::LANGUAGE, "hi").unwrap();

        assert_eq!(store.get_raw(keys::LANGUAGE).unwrap().as_deref(), Some("hi"));
        assert_eq!(store.keys().unwrap(), vec![keys::LANGUAGE.to_string()]);
    }

    #[test]
    fn test_remove_and_clear() {
        let store = LocalStore::open_in_memory().unwrap();
        store.set_raw("a", "1").unwrap();
        store.set_raw("b", "2").unwrap();

        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.clear().unwrap(), 1);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_persisted_seed_then_saved_value() {
        let store = LocalStore::open_in_memory().unwrap();

        let seeded = Notes::load(&store).unwrap();
        assert_eq!(seeded, Notes::seed());

        let notes = Notes {
            items: vec!["pay rent".to_string(), "buy milk".to_string()],
        };
        notes.save(&store).unwrap();

        // Transparent: stored as a bare JSON array
        assert_eq!(
            store.get_raw("test_notes").unwrap().as_deref(),
            Some(r#"["pay rent","buy milk"]"#)
        );
        assert_eq!(Notes::load(&store).unwrap(), notes);
    }

    #[test]
    fn test_corrupt_blob_is_an_error() {
        let store = LocalStore::open_in_memory().unwrap();
        store.set_raw("test_notes", "{not json").unwrap();
        assert!(Notes::load(&store).is_err());
    }

    #[test]
    fn test_event_log() {
        let store = LocalStore::open_in_memory().unwrap();

        let event = Event::new(
            "login",
            "user",
            "user_123",
            serde_json::json!({"email": "priya@example.com"}),
            "priya@example.com",
        );
        store.record_event(&event).unwrap();
        store
            .record_event(&Event::new("logout", "user", "user_123", serde_json::json!({}), "priya@example.com"))
            .unwrap();

        let events = store.events_for_entity("user", "user_123").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "login");
        assert_eq!(events[0].data["email"], "priya@example.com");

        let recent = store.recent_events(1).unwrap();
        assert_eq!(recent[0].event_type, "logout");
    }
}
