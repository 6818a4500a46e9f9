pub mod collection;
pub mod kv;
pub mod query;
pub mod sqlite;

pub use collection::*;
pub use kv::*;
pub use query::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: no {collection} row with {column} = {value}")]
    NotFound {
        collection: String,
        column: String,
        value: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Internal lock error")]
    LockPoisoned,

    #[error("Cannot determine application data directory")]
    NoDataDir,
}
