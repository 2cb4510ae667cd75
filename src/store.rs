use crate::api::{KeymapApi, SaveReceipt};
use crate::auth::Identity;
use crate::error::{ApiError, Result};
use crate::keymap::{validate_character, KeyPosition, Keymaps, Layer};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

pub type UserId = i64;

/// SQLite-backed users and keymaps.
#[derive(Debug)]
pub struct KeymapStore {
    conn: Mutex<Connection>,
}

impl KeymapStore {
    /// Opens (or creates) the database file and its tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening keymap store");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                name TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS keymaps (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                layer INTEGER NOT NULL CHECK (layer BETWEEN 0 AND 5),
                key_position TEXT NOT NULL,
                character TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_keymaps_user_layer_position
                ON keymaps(user_id, layer, key_position);
            "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Looks a user up by provider subject, creating them on first sight.
    pub fn find_or_create_user(&self, identity: &Identity) -> Result<UserId> {
        let conn = self.lock();
        let existing: Option<UserId> = conn
            .query_row(
                "SELECT id FROM users WHERE subject = ?1",
                [&identity.subject],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let now = Local::now().to_rfc3339();
        conn.execute(
            "INSERT INTO users (subject, email, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![identity.subject, identity.email, identity.name, now],
        )?;
        let id = conn.last_insert_rowid();
        info!(user_id = id, email = %identity.email, "created user");
        Ok(id)
    }

    /// Position → character for one layer of one user.
    pub fn for_user_layer(&self, user_id: UserId, layer: Layer) -> Result<BTreeMap<KeyPosition, String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT key_position, character FROM keymaps WHERE user_id = ?1 AND layer = ?2",
        )?;
        let rows = stmt.query_map(params![user_id, layer.index() as i64], |row| {
            Ok((KeyPosition::new(row.get::<_, String>(0)?), row.get::<_, String>(1)?))
        })?;

        let mut layer_map = BTreeMap::new();
        for row in rows {
            let (position, character) = row?;
            layer_map.insert(position, character);
        }
        Ok(layer_map)
    }

    pub fn load_keymaps(&self, user_id: UserId) -> Result<Keymaps> {
        let mut keymaps = Keymaps::new();
        for layer in Layer::all() {
            for (position, character) in self.for_user_layer(user_id, layer)? {
                keymaps.assign(layer, position, character);
            }
        }
        Ok(keymaps)
    }

    /// Upserts every assignment of every layer in one transaction. Blank
    /// characters are skipped; any invalid entry aborts the whole save.
    pub fn bulk_upsert(&self, user_id: UserId, keymaps: &Keymaps) -> Result<usize> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let now = Local::now().to_rfc3339();
        let mut written = 0;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO keymaps (user_id, layer, key_position, character, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                ON CONFLICT(user_id, layer, key_position)
                DO UPDATE SET character = excluded.character, updated_at = excluded.updated_at
                "#,
            )?;

            for assignment in keymaps.assignments() {
                if assignment.character.trim().is_empty() {
                    continue;
                }
                let character = validate_character(&assignment.character)?;
                stmt.execute(params![
                    user_id,
                    assignment.layer.index() as i64,
                    assignment.position.as_str(),
                    character,
                    now,
                ])?;
                written += 1;
            }
        }

        tx.commit()?;
        info!(user_id, written, "keymaps upserted");
        Ok(written)
    }
}

/// [`KeymapApi`] backed by the local store for a single user.
#[derive(Debug, Clone)]
pub struct LocalKeymapApi {
    store: Arc<KeymapStore>,
    user_id: UserId,
}

impl LocalKeymapApi {
    pub fn new(store: Arc<KeymapStore>, user_id: UserId) -> Self {
        Self { store, user_id }
    }
}

impl KeymapApi for LocalKeymapApi {
    fn load(&self) -> std::result::Result<Keymaps, ApiError> {
        Ok(self.store.load_keymaps(self.user_id)?)
    }

    fn save(&self, keymaps: &Keymaps) -> std::result::Result<SaveReceipt, ApiError> {
        let written = self.store.bulk_upsert(self.user_id, keymaps)?;
        Ok(SaveReceipt {
            message: Some(format!("Saved {written} key assignments")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            subject: "sub-42".into(),
            email: "typist@example.com".into(),
            name: Some("Typist".into()),
        }
    }

    fn layer(i: i64) -> Layer {
        Layer::new(i).unwrap()
    }

    #[test]
    fn find_or_create_is_idempotent() {
        let store = KeymapStore::open_in_memory().unwrap();
        let a = store.find_or_create_user(&identity()).unwrap();
        let b = store.find_or_create_user(&identity()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn upsert_then_load_round_trip() {
        let store = KeymapStore::open_in_memory().unwrap();
        let user = store.find_or_create_user(&identity()).unwrap();

        let mut k = Keymaps::new();
        k.assign(layer(0), "r0c1".into(), "q");
        k.assign(layer(2), "Q_pos".into(), "あ");
        assert_eq!(store.bulk_upsert(user, &k).unwrap(), 2);

        assert_eq!(store.load_keymaps(user).unwrap(), k);
        assert_eq!(
            store.for_user_layer(user, layer(2)).unwrap().get("Q_pos"),
            Some(&"あ".to_string())
        );
        assert!(store.for_user_layer(user, layer(5)).unwrap().is_empty());
    }

    #[test]
    fn upsert_overwrites_existing_assignment() {
        let store = KeymapStore::open_in_memory().unwrap();
        let user = store.find_or_create_user(&identity()).unwrap();

        let mut k = Keymaps::new();
        k.assign(layer(1), "a".into(), "x");
        store.bulk_upsert(user, &k).unwrap();
        k.assign(layer(1), "a".into(), "y");
        store.bulk_upsert(user, &k).unwrap();

        let loaded = store.load_keymaps(user).unwrap();
        assert_eq!(loaded.get(layer(1), "a"), Some("y"));
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn blank_characters_are_skipped() {
        let store = KeymapStore::open_in_memory().unwrap();
        let user = store.find_or_create_user(&identity()).unwrap();

        let mut k = Keymaps::new();
        k.assign(layer(0), "a".into(), "  ");
        k.assign(layer(0), "b".into(), "b");
        assert_eq!(store.bulk_upsert(user, &k).unwrap(), 1);
        assert_eq!(store.load_keymaps(user).unwrap().get(layer(0), "a"), None);
    }

    #[test]
    fn invalid_entry_rolls_back_whole_save() {
        let store = KeymapStore::open_in_memory().unwrap();
        let user = store.find_or_create_user(&identity()).unwrap();

        let mut k = Keymaps::new();
        k.assign(layer(0), "a".into(), "ok");
        k.assign(layer(3), "b".into(), "x".repeat(21));
        assert!(store.bulk_upsert(user, &k).is_err());
        assert!(store.load_keymaps(user).unwrap().is_empty());
    }

    #[test]
    fn users_do_not_see_each_other() {
        let store = KeymapStore::open_in_memory().unwrap();
        let alice = store.find_or_create_user(&identity()).unwrap();
        let bob = store
            .find_or_create_user(&Identity {
                subject: "sub-7".into(),
                email: "bob@example.com".into(),
                name: None,
            })
            .unwrap();

        let mut k = Keymaps::new();
        k.assign(layer(0), "a".into(), "1");
        store.bulk_upsert(alice, &k).unwrap();

        assert!(store.load_keymaps(bob).unwrap().is_empty());
    }

    #[test]
    fn local_api_reports_validation_as_rejection() {
        let store = Arc::new(KeymapStore::open_in_memory().unwrap());
        let user = store.find_or_create_user(&identity()).unwrap();
        let api = LocalKeymapApi::new(store, user);

        let mut k = Keymaps::new();
        k.assign(layer(0), "a".into(), "y".repeat(30));
        match api.save(&k) {
            Err(ApiError::Rejected { status, message }) => {
                assert_eq!(status, 422);
                assert!(message.contains("30"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
