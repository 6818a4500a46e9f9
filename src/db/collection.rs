//! Typed collections over the flat key-value namespace.
//!
//! Each collection is one JSON array stored under the collection's name.
//! Reads decode the array into typed records; writes go through the raw
//! JSON rows so fields this crate does not model survive a rewrite.
//!
//! Every operation is a full read-modify-write of the collection. There is
//! no locking across operations.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::query::{order_keys, Bound, Column, Scalar, Select};
use super::{DatabaseError, KeyValueStore, MemoryStore, SqliteStore};

// ═══════════════════════════════════════════
// Collection names
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionName {
    Users,
    CurrentUser,
    Profiles,
    Pucais,
    Moods,
    Meals,
}

impl CollectionName {
    pub const ALL: [CollectionName; 6] = [
        CollectionName::Users,
        CollectionName::CurrentUser,
        CollectionName::Profiles,
        CollectionName::Pucais,
        CollectionName::Moods,
        CollectionName::Meals,
    ];

    /// Storage key of the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::CurrentUser => "current_user",
            Self::Profiles => "profiles",
            Self::Pucais => "pucais",
            Self::Moods => "moods",
            Self::Meals => "meals",
        }
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════
// Record traits
// ═══════════════════════════════════════════

/// A typed record stored in one collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: CollectionName;

    /// Columns usable in filters and orderings.
    type Field: Column;

    /// Input shape for insert/upsert. May omit `id` and `created_at`.
    type Draft: Draft;

    fn id(&self) -> &str;

    fn value(&self, field: Self::Field) -> Scalar;
}

/// Record input that can check itself before it is written.
pub trait Draft: Serialize {
    fn validate(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

// ═══════════════════════════════════════════
// LocalDb — explicit storage context
// ═══════════════════════════════════════════

/// Storage context handed to every caller. Cheap to clone.
#[derive(Clone)]
pub struct LocalDb {
    store: Arc<dyn KeyValueStore>,
}

impl LocalDb {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Context over a fresh process-local store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Context over a SQLite store file.
    pub fn open(path: &std::path::Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(Arc::new(SqliteStore::open(path)?)))
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn collection<R: Record>(&self) -> Collection<'_, R> {
        Collection {
            db: self,
            _record: PhantomData,
        }
    }
}

impl std::fmt::Debug for LocalDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalDb").finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════
// Collection — query and write operations
// ═══════════════════════════════════════════

pub struct Collection<'a, R: Record> {
    db: &'a LocalDb,
    _record: PhantomData<R>,
}

impl<'a, R: Record> Collection<'a, R> {
    fn key(&self) -> &'static str {
        R::COLLECTION.as_str()
    }

    /// All records, ordered and limited.
    pub fn select(&self, select: &Select<R::Field>) -> Result<Vec<R>, DatabaseError> {
        self.logged("select", || {
            let records = self.load()?;
            tracing::debug!(collection = self.key(), total = records.len(), "Fetched collection");
            Ok(apply_select(records, select))
        })
    }

    /// Records where `field` equals `value`, ordered and limited.
    pub fn select_eq(
        &self,
        field: R::Field,
        value: impl Into<Scalar>,
        select: &Select<R::Field>,
    ) -> Result<Vec<R>, DatabaseError> {
        let value = value.into();
        self.logged("select_eq", || {
            let records = self.load()?;
            let total = records.len();
            let matching: Vec<R> = records
                .into_iter()
                .filter(|r| r.value(field).matches(&value))
                .collect();
            tracing::debug!(
                collection = self.key(),
                column = field.name(),
                %value,
                total,
                matched = matching.len(),
                "Filtered collection"
            );
            Ok(apply_select(matching, select))
        })
    }

    /// First record where `field` equals `value`.
    pub fn select_single(
        &self,
        field: R::Field,
        value: impl Into<Scalar>,
    ) -> Result<R, DatabaseError> {
        let value = value.into();
        self.logged("select_single", || {
            self.load()?
                .into_iter()
                .find(|r| r.value(field).matches(&value))
                .ok_or_else(|| DatabaseError::NotFound {
                    collection: self.key().to_string(),
                    column: field.name().to_string(),
                    value: value.to_string(),
                })
        })
    }

    /// Records where `field` equals `value` and both inclusive bounds hold.
    pub fn select_range(
        &self,
        field: R::Field,
        value: impl Into<Scalar>,
        lower: &Bound<R::Field>,
        upper: &Bound<R::Field>,
    ) -> Result<Vec<R>, DatabaseError> {
        let value = value.into();
        self.logged("select_range", || {
            let records = self.load()?;
            Ok(records
                .into_iter()
                .filter(|r| {
                    r.value(field).matches(&value)
                        && r.value(lower.field)
                            .compare(&lower.value)
                            .is_some_and(|o| o.is_ge())
                        && r.value(upper.field)
                            .compare(&upper.value)
                            .is_some_and(|o| o.is_le())
                })
                .collect())
        })
    }

    /// Number of decodable records.
    pub fn count(&self) -> Result<usize, DatabaseError> {
        self.logged("count", || Ok(self.load()?.len()))
    }

    /// Insert drafts, assigning `id` and `created_at` where missing.
    ///
    /// Either every draft is stored or none is.
    pub fn insert(&self, drafts: &[R::Draft]) -> Result<Vec<R>, DatabaseError> {
        self.logged("insert", || {
            if drafts.is_empty() {
                tracing::warn!(collection = self.key(), "Insert called with no records");
                return Ok(Vec::new());
            }

            let mut new_rows = Vec::with_capacity(drafts.len());
            let mut inserted = Vec::with_capacity(drafts.len());
            for draft in drafts {
                draft.validate()?;
                let mut row = to_object(draft)?;
                fill_missing(&mut row, "id", || Value::String(generate_id()));
                fill_missing(&mut row, "created_at", || Value::String(now_iso()));
                let row = Value::Object(row);
                inserted.push(decode_row::<R>(&row)?);
                new_rows.push(row);
            }

            let mut rows = self.load_rows()?;
            rows.extend(new_rows);
            self.save_rows(&rows)?;

            tracing::info!(
                collection = self.key(),
                inserted = inserted.len(),
                total = rows.len(),
                "Inserted records"
            );
            Ok(inserted)
        })
    }

    /// Merge `draft` into the row with the same id, or insert it.
    pub fn upsert(&self, draft: &R::Draft) -> Result<R, DatabaseError> {
        self.logged("upsert", || {
            draft.validate()?;
            let patch = to_object(draft)?;
            let mut rows = self.load_rows()?;
            let now = now_iso();

            let existing = patch
                .get("id")
                .and_then(Value::as_str)
                .and_then(|id| rows.iter().position(|row| row_id(row) == Some(id)));

            let (index, merged) = match existing {
                Some(index) => {
                    let mut merged = rows[index].as_object().cloned().unwrap_or_default();
                    merged.extend(patch);
                    merged.insert("updated_at".into(), Value::String(now));
                    (Some(index), Value::Object(merged))
                }
                None => {
                    let mut row = patch;
                    fill_missing(&mut row, "id", || Value::String(generate_id()));
                    fill_missing(&mut row, "created_at", || Value::String(now.clone()));
                    row.insert("updated_at".into(), Value::String(now));
                    (None, Value::Object(row))
                }
            };

            let record = decode_row::<R>(&merged)?;
            match index {
                Some(i) => rows[i] = merged,
                None => rows.push(merged),
            }
            self.save_rows(&rows)?;

            tracing::info!(
                collection = self.key(),
                id = record.id(),
                replaced = index.is_some(),
                "Upserted record"
            );
            Ok(record)
        })
    }

    /// Merge `patch` into the first record where `field` equals `value`.
    /// Returns `None` when nothing matches.
    pub fn update_eq<P: Serialize>(
        &self,
        field: R::Field,
        value: impl Into<Scalar>,
        patch: &P,
    ) -> Result<Option<R>, DatabaseError> {
        let value = value.into();
        self.logged("update_eq", || {
            let mut rows = self.load_rows()?;
            let Some(index) = rows.iter().position(|row| {
                decode_row::<R>(row).is_ok_and(|r| r.value(field).matches(&value))
            }) else {
                tracing::debug!(
                    collection = self.key(),
                    column = field.name(),
                    %value,
                    "Update matched no record"
                );
                return Ok(None);
            };

            let mut merged = rows[index].as_object().cloned().unwrap_or_default();
            merged.extend(to_object(patch)?);
            merged.insert("updated_at".into(), Value::String(now_iso()));
            let merged = Value::Object(merged);

            let record = decode_row::<R>(&merged)?;
            rows[index] = merged;
            self.save_rows(&rows)?;
            Ok(Some(record))
        })
    }

    /// Replace the whole collection with `records`.
    pub(crate) fn replace_all(&self, records: &[R]) -> Result<(), DatabaseError> {
        self.logged("replace_all", || {
            let rows = records
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()?;
            self.save_rows(&rows)
        })
    }

    /// Remove the collection key entirely.
    pub(crate) fn clear(&self) -> Result<(), DatabaseError> {
        self.logged("clear", || self.db.store().remove(self.key()))
    }

    // ── storage helpers ─────────────────────────────────

    fn load(&self) -> Result<Vec<R>, DatabaseError> {
        let rows = self.load_rows()?;
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match decode_row::<R>(row) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(
                    collection = self.key(),
                    index,
                    error = %e,
                    "Skipping row that does not decode"
                ),
            }
        }
        Ok(records)
    }

    /// Raw rows of the collection. Anything that is not a JSON array is
    /// reset to `[]`.
    fn load_rows(&self) -> Result<Vec<Value>, DatabaseError> {
        let Some(raw) = self.db.store().get(self.key())? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(_) => {
                tracing::warn!(collection = self.key(), "Stored data is not an array, resetting");
                self.save_rows(&[])?;
                Ok(Vec::new())
            }
            Err(e) => {
                tracing::warn!(
                    collection = self.key(),
                    error = %e,
                    "Stored data is not valid JSON, resetting"
                );
                self.save_rows(&[])?;
                Ok(Vec::new())
            }
        }
    }

    fn save_rows(&self, rows: &[Value]) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(rows)?;
        self.db.store().set(self.key(), &json)?;
        tracing::debug!(collection = self.key(), items = rows.len(), "Saved collection");
        Ok(())
    }

    fn logged<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce() -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        f().inspect_err(|e| match e {
            DatabaseError::NotFound { .. } => {
                tracing::debug!(collection = self.key(), operation, error = %e, "No match")
            }
            DatabaseError::Validation(_) => {
                tracing::warn!(collection = self.key(), operation, error = %e, "Rejected input")
            }
            _ => tracing::error!(collection = self.key(), operation, error = %e, "Storage operation failed"),
        })
    }
}

fn apply_select<R: Record>(mut records: Vec<R>, select: &Select<R::Field>) -> Vec<R> {
    if let Some(order) = select.order {
        records.sort_by(|a, b| order_keys(&a.value(order.field), &b.value(order.field), order.direction));
    }
    if let Some(limit) = select.limit {
        records.truncate(limit);
    }
    records
}

fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, DatabaseError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::Validation(format!(
            "record must serialize to a JSON object, got {other}"
        ))),
    }
}

fn decode_row<R: Record>(row: &Value) -> Result<R, DatabaseError> {
    R::deserialize(row).map_err(|e| DatabaseError::Validation(e.to_string()))
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn fill_missing(row: &mut Map<String, Value>, key: &str, default: impl FnOnce() -> Value) {
    let missing = match row.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    };
    if missing {
        row.insert(key.to_string(), default());
    }
}

/// Opaque, never-reused record identifier.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time as an ISO-8601 UTC string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
