use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{CollectionName, Column, DatabaseError, Draft, Record, Scalar};
use crate::scoring::{self, ScoreItem};

/// One PUCAI assessment. Sub-scores hold the chosen option value of each
/// question; `sum` holds the points total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomScore {
    pub id: String,
    pub user_id: String,
    pub stomachache: i32,
    pub rectal_bleeding: i32,
    pub texture: i32,
    pub frequency: i32,
    pub nightly_bowel_movements: i32,
    pub level_of_activity: i32,
    pub sum: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreField {
    Id,
    UserId,
    Sum,
    CreatedAt,
}

impl Column for ScoreField {
    fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::Sum => "sum",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSymptomScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub stomachache: i32,
    pub rectal_bleeding: i32,
    pub texture: i32,
    pub frequency: i32,
    pub nightly_bowel_movements: i32,
    pub level_of_activity: i32,
    pub sum: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewSymptomScore {
    pub fn value_of(&self, item: ScoreItem) -> i32 {
        match item {
            ScoreItem::Stomachache => self.stomachache,
            ScoreItem::RectalBleeding => self.rectal_bleeding,
            ScoreItem::Texture => self.texture,
            ScoreItem::Frequency => self.frequency,
            ScoreItem::NightlyBowelMovements => self.nightly_bowel_movements,
            ScoreItem::LevelOfActivity => self.level_of_activity,
        }
    }
}

impl Draft for NewSymptomScore {
    fn validate(&self) -> Result<(), DatabaseError> {
        if self.user_id.trim().is_empty() {
            return Err(DatabaseError::Validation("user_id is required".into()));
        }
        let mut total = 0;
        for item in ScoreItem::ALL {
            let value = self.value_of(item);
            let points = u8::try_from(value)
                .ok()
                .and_then(|v| scoring::points_for(item, v))
                .ok_or_else(|| {
                    DatabaseError::Validation(format!(
                        "Invalid value {value} for {}",
                        item.as_str()
                    ))
                })?;
            total += points as i32;
        }
        if total != self.sum {
            return Err(DatabaseError::Validation(format!(
                "Score sum {} does not match computed total {total}",
                self.sum
            )));
        }
        Ok(())
    }
}

impl Record for SymptomScore {
    const COLLECTION: CollectionName = CollectionName::Pucais;
    type Field = ScoreField;
    type Draft = NewSymptomScore;

    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: ScoreField) -> Scalar {
        match field {
            ScoreField::Id => Scalar::from(&self.id),
            ScoreField::UserId => Scalar::from(&self.user_id),
            ScoreField::Sum => Scalar::from(self.sum),
            ScoreField::CreatedAt => Scalar::from(self.created_at),
        }
    }
}
