//! Explicit client context: storage plus auth over one key-value store.

use std::path::Path;
use std::sync::Arc;

use crate::auth::LocalAuth;
use crate::config;
use crate::db::{DatabaseError, KeyValueStore, LocalDb, MemoryStore, SqliteStore};

#[derive(Debug, Clone)]
pub struct Client {
    db: LocalDb,
    auth: LocalAuth,
}

impl Client {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let db = LocalDb::new(store);
        let auth = LocalAuth::new(db.clone());
        Self { db, auth }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(Arc::new(SqliteStore::open(path)?)))
    }

    /// Client over the store file in the application data directory.
    pub fn open_default() -> Result<Self, DatabaseError> {
        let path = config::store_path().ok_or(DatabaseError::NoDataDir)?;
        tracing::info!(path = %path.display(), "Opening default store");
        Self::open(&path)
    }

    pub fn db(&self) -> &LocalDb {
        &self.db
    }

    pub fn auth(&self) -> &LocalAuth {
        &self.auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_and_auth_share_the_store() {
        let client = Client::in_memory();
        client.auth().sign_up("ada@example.com", "pw", "Ada").unwrap();
        assert!(client.db().store().get("users").unwrap().is_some());
        assert!(client.db().store().get("profiles").unwrap().is_some());
    }

    #[test]
    fn open_persists_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");
        let user = {
            let client = Client::open(&path).unwrap();
            client.auth().sign_up("ada@example.com", "pw", "Ada").unwrap()
        };

        let client = Client::open(&path).unwrap();
        assert_eq!(client.auth().current_user().unwrap(), Some(user));
    }
}
