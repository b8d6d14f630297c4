use conectapetz_common::{
    model::{IdGenerator, ModelValidationError, auth::PasswordHashingError},
    outcome::{NoChange, Outcome},
};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("A stored value could not be (de)serialized: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Hashing(#[from] PasswordHashingError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// The keys everything is stored under.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum StorageKey {
    Users,
    CurrentUser,
    Posts,
    KanbanData,
}

impl StorageKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StorageKey::Users => "conectapetz_users",
            StorageKey::CurrentUser => "conectapetz_currentUser",
            StorageKey::Posts => "conectapetz_posts",
            StorageKey::KanbanData => "conectapetz_kanbanData",
        }
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key-value store of JSON documents in a single SQLite table.
///
/// Mutations take [`DbClient::write_lock`] for their whole read-modify-write, so
/// two requests never interleave on the same key. The guard also hands out ids.
#[derive(Debug)]
pub struct DbClient {
    pool: SqlitePool,
    write_lock: Mutex<IdGenerator>,
    seed_defaults: bool,
}

/// The outcome of a mutation together with the collection as it is stored now.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Applied<T, S> {
    pub outcome: Outcome<T>,
    pub state: S,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(IdGenerator::new()),
            seed_defaults: true,
        }
    }

    /// Whether empty collections start out with the welcome posts and the
    /// starter board. On by default.
    #[must_use]
    pub fn with_seed_defaults(mut self, seed_defaults: bool) -> Self {
        self.seed_defaults = seed_defaults;
        self
    }

    pub(crate) fn seeds_defaults(&self) -> bool {
        self.seed_defaults
    }

    /// Opens (creating if needed) the database at `url` and makes sure the table
    /// exists. `sqlite::memory:` gives a fresh private store.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // One long-lived connection keeps in-memory databases alive and
        // matches SQLite's single writer.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let client = Self::new(pool);
        client.migrate().await?;
        Ok(client)
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub(crate) async fn write_lock(&self) -> MutexGuard<'_, IdGenerator> {
        self.write_lock.lock().await
    }

    /// The stored JSON text, untouched.
    pub async fn get_raw(&self, key: StorageKey) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "
            SELECT value
            FROM kv_entries
            WHERE key = ?
            ",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    pub async fn set_raw(&self, key: StorageKey, value: &str) -> Result<()> {
        sqlx::query(
            "
            INSERT INTO kv_entries (key, value)
            VALUES (?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(key.as_str())
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Like [`DbClient::get`], but reports why nothing was read.
    pub async fn try_get<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };

        // A stored `null` reads like a missing key.
        let value = serde_json::from_str::<Option<T>>(&raw)?;
        Ok(value)
    }

    pub async fn try_set<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw).await?;

        debug!(%key, bytes = raw.len(), "Stored value");
        Ok(())
    }

    /// The value under `key`, or `None` when it is missing or unreadable.
    pub async fn get<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        self.try_get(key).await.unwrap_or_else(|err| {
            warn!(%key, error = %err, "Reading stored value failed");
            None
        })
    }

    /// Stores `value` under `key`. Returns whether that worked.
    pub async fn set<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> bool {
        match self.try_set(key, value).await {
            Ok(()) => true,
            Err(err) => {
                warn!(%key, error = %err, "Storing value failed");
                false
            }
        }
    }

    pub async fn remove(&self, key: StorageKey) -> bool {
        let result = sqlx::query(
            "
            DELETE FROM kv_entries
            WHERE key = ?
            ",
        )
        .bind(key.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(%key, "Removed value");
                true
            }
            Err(err) => {
                warn!(%key, error = %err, "Removing value failed");
                false
            }
        }
    }

    /// The value under `key`. When the key is missing or holds `null`, `default`
    /// is stored and returned. A value that can't be read is left untouched and
    /// reported as an error.
    pub async fn init_if_empty<T, F>(&self, key: StorageKey, default: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.try_get(key).await {
            Ok(Some(existing)) => Ok(existing),
            Ok(None) => {
                let value = default();
                self.set(key, &value).await;
                Ok(value)
            }
            Err(err) => {
                warn!(%key, error = %err, "Stored value is unreadable, leaving it as it is");
                Err(err)
            }
        }
    }

    /// Runs one read-modify-write of the collection under `key` while holding the
    /// write lock. The collection is only written back when `mutation` reports a
    /// change; if that write fails, the stored collection is returned unchanged.
    /// An unreadable collection is never passed to `mutation`; the result then
    /// carries an empty collection.
    pub(crate) async fn apply<S, T, E>(
        &self,
        key: StorageKey,
        default: impl FnOnce() -> S,
        mutation: impl FnOnce(&mut S, &mut IdGenerator) -> Result<Outcome<T>, E>,
    ) -> Result<Applied<T, S>, E>
    where
        S: Serialize + DeserializeOwned + Clone + Default,
    {
        let mut ids = self.write_lock().await;
        let Ok(mut state) = self.init_if_empty(key, default).await else {
            return Ok(Applied {
                outcome: Outcome::Unchanged(NoChange::Unreadable),
                state: S::default(),
            });
        };
        let stored = state.clone();

        let outcome = mutation(&mut state, &mut *ids)?;
        if let Outcome::Unchanged(reason) = &outcome {
            debug!(%key, %reason, "Nothing to store");
            return Ok(Applied { outcome, state });
        }

        if self.set(key, &state).await {
            Ok(Applied { outcome, state })
        } else {
            Ok(Applied {
                outcome: Outcome::Unchanged(NoChange::NotPersisted),
                state: stored,
            })
        }
    }
}
