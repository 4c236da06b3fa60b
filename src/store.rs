//! File-backed persistence and the append-only record log.
//!
//! The storage file is a string-keyed key-value map. Profile and records are
//! kept as JSON documents inside their values; the session keys hold plain
//! strings. Anything absent or malformed loads as its default so a damaged
//! file never surfaces as a user-visible error.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{FoodRecord, RecordInput, Session, UserProfile};
use crate::error::StorageError;

/// Storage keys.
const KEY_LOGGED_IN: &str = "is_logged_in";
const KEY_USERNAME: &str = "username";
const KEY_PROFILE: &str = "user_profile";
const KEY_RECORDS: &str = "food_records";

/// The key-value storage file.
///
/// Every mutation writes the whole map back to disk synchronously. There is
/// no write-ahead step, so a crash between an in-memory change and the write
/// loses that change; no retry is attempted.
pub struct Storage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Storage {
    /// Opens the store at `path`, treating a missing or damaged file as
    /// empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(e) => {
                    warn!(
                        "Storage file {} is malformed ({e}), starting empty",
                        path.display()
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(
                    "Cannot read storage file {} ({e}), starting empty",
                    path.display()
                );
                BTreeMap::new()
            }
        };

        Self { path, values }
    }

    /// Loads the profile, falling back to the defaults when absent or
    /// malformed.
    pub fn load_profile(&self) -> UserProfile {
        self.load_json(KEY_PROFILE).unwrap_or_default()
    }

    pub fn save_profile(&mut self, profile: &UserProfile) -> Result<(), StorageError> {
        self.put_json(KEY_PROFILE, profile)
    }

    /// Loads the record log, newest-first. Absent or malformed loads empty.
    pub fn load_records(&self) -> Vec<FoodRecord> {
        self.load_json(KEY_RECORDS).unwrap_or_default()
    }

    pub fn save_records(&mut self, records: &[FoodRecord]) -> Result<(), StorageError> {
        self.put_json(KEY_RECORDS, &records)
    }

    /// Loads the session. Logged in requires the flag set and a non-empty
    /// username; anything else is a logged-out session.
    pub fn load_session(&self) -> Session {
        let logged_in = self
            .values
            .get(KEY_LOGGED_IN)
            .is_some_and(|value| value == "true");
        let username = self.values.get(KEY_USERNAME).cloned().unwrap_or_default();

        if logged_in && !username.is_empty() {
            Session {
                username: Some(username),
            }
        } else {
            Session::default()
        }
    }

    /// Persists the session. A logged-out session removes both keys.
    pub fn save_session(&mut self, session: &Session) -> Result<(), StorageError> {
        match &session.username {
            Some(name) => {
                self.values
                    .insert(KEY_LOGGED_IN.to_string(), "true".to_string());
                self.values.insert(KEY_USERNAME.to_string(), name.clone());
            }
            None => {
                self.values.remove(KEY_LOGGED_IN);
                self.values.remove(KEY_USERNAME);
            }
        }
        self.persist()
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.values.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Stored value for `{key}` is malformed ({e}), using defaults");
                None
            }
        }
    }

    fn put_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.values.insert(key.to_string(), raw);
        self.persist()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

/// The in-memory food-record log: newest-first, append-only.
///
/// No update or delete is exposed; a record is immutable once created.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<FoodRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<FoodRecord>) -> Self {
        Self { records }
    }

    /// Creates a record from the input and inserts it at the front.
    ///
    /// Ids derive from the creation time in milliseconds. When two records
    /// land in the same millisecond the new id is bumped past the newest
    /// existing one, keeping ids unique for the lifetime of the store.
    pub fn add(&mut self, input: RecordInput) -> &FoodRecord {
        let timestamp = Utc::now();
        let mut id = timestamp.timestamp_millis();
        if let Some(head) = self.records.first()
            && let Ok(prev) = head.id.parse::<i64>()
            && id <= prev
        {
            id = prev + 1;
        }

        let record = FoodRecord {
            id: id.to_string(),
            name: input.name,
            calories: input.calories,
            meal_type: input.meal_type,
            quantity: input.quantity,
            timestamp,
        };

        self.records.insert(0, record);
        &self.records[0]
    }

    /// All records, newest-first.
    pub fn all(&self) -> &[FoodRecord] {
        &self.records
    }
}
