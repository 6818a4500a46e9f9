use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{CollectionName, Column, DatabaseError, Draft, Record, Scalar};

pub const MOOD_MIN: i32 = 1;
pub const MOOD_MAX: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mood {
    pub id: String,
    pub user_id: String,
    /// Rating from 1 (very bad) to 5 (very good).
    pub amount: i32,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodField {
    Id,
    UserId,
    Amount,
    CreatedAt,
}

impl Column for MoodField {
    fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::Amount => "amount",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMood {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub amount: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Draft for NewMood {
    fn validate(&self) -> Result<(), DatabaseError> {
        if self.user_id.trim().is_empty() {
            return Err(DatabaseError::Validation("user_id is required".into()));
        }
        if !(MOOD_MIN..=MOOD_MAX).contains(&self.amount) {
            return Err(DatabaseError::Validation(format!(
                "Mood rating must be between {MOOD_MIN} and {MOOD_MAX}, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

impl Record for Mood {
    const COLLECTION: CollectionName = CollectionName::Moods;
    type Field = MoodField;
    type Draft = NewMood;

    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: MoodField) -> Scalar {
        match field {
            MoodField::Id => Scalar::from(&self.id),
            MoodField::UserId => Scalar::from(&self.user_id),
            MoodField::Amount => Scalar::from(self.amount),
            MoodField::CreatedAt => Scalar::from(self.created_at),
        }
    }
}

/// Human label for a mood rating.
pub fn mood_label(amount: i32) -> &'static str {
    match amount {
        1 => "Very bad",
        2 => "Bad",
        3 => "Neutral",
        4 => "Good",
        5 => "Very good",
        _ => "Unknown",
    }
}

pub fn mood_emoji(amount: i32) -> &'static str {
    match amount {
        1 => "😢",
        2 => "😞",
        4 => "😊",
        5 => "😄",
        _ => "😐",
    }
}
