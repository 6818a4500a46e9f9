use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::enums::MealType;
use crate::db::{CollectionName, Column, DatabaseError, Draft, Record, Scalar};

/// `HH:MM`, optional seconds, optional UTC offset (`18:30:00+02`).
static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):[0-5]\d(:[0-5]\d)?([+-]\d{2}(:?\d{2})?)?$")
        .expect("valid time-of-day regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub time: String,
    #[serde(rename = "type", default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealField {
    Id,
    UserId,
    Name,
    Time,
    Type,
    CreatedAt,
}

impl Column for MealField {
    fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::Name => "name",
            Self::Time => "time",
            Self::Type => "type",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub time: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Whether `time` is a valid time-of-day string.
pub fn is_valid_time_of_day(time: &str) -> bool {
    TIME_OF_DAY.is_match(time.trim())
}

impl Draft for NewMeal {
    fn validate(&self) -> Result<(), DatabaseError> {
        if self.user_id.trim().is_empty() {
            return Err(DatabaseError::Validation("user_id is required".into()));
        }
        if self.name.trim().is_empty() {
            return Err(DatabaseError::Validation("Meal name is required".into()));
        }
        if self.name.len() > 200 {
            return Err(DatabaseError::Validation("Meal name too long".into()));
        }
        if !is_valid_time_of_day(&self.time) {
            return Err(DatabaseError::Validation(format!(
                "Invalid meal time: {:?} (expected HH:MM)",
                self.time
            )));
        }
        Ok(())
    }
}

impl Record for Meal {
    const COLLECTION: CollectionName = CollectionName::Meals;
    type Field = MealField;
    type Draft = NewMeal;

    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: MealField) -> Scalar {
        match field {
            MealField::Id => Scalar::from(&self.id),
            MealField::UserId => Scalar::from(&self.user_id),
            MealField::Name => Scalar::from(&self.name),
            MealField::Time => Scalar::from(&self.time),
            MealField::Type => Scalar::from(self.meal_type.map(|t| t.as_str())),
            MealField::CreatedAt => Scalar::from(self.created_at),
        }
    }
}
