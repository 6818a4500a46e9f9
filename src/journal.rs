//! Journal entries for the signed-in user: PUCAI assessments, moods, meals.
//!
//! Each function resolves the current user, builds the record draft, and
//! inserts it stamped with the current time. Draft validation happens in
//! the storage layer before anything is written.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::client::Client;
use crate::db::{DatabaseError, LocalDb, Order, Select};
use crate::models::{
    Meal, MealField, MealType, Mood, MoodField, NewMeal, NewMood, ScoreField, SymptomScore, User,
};
use crate::scoring::{ActivityLevel, PucaiAnswers, ScoringError};

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("No user is signed in")]
    NotSignedIn,

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

// ═══════════════════════════════════════════
// Input types
// ═══════════════════════════════════════════

/// Meal as entered by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealEntry {
    pub name: String,
    pub time: String,
    pub meal_type: Option<MealType>,
    pub ingredients: Option<String>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

impl MealEntry {
    /// Entry prefilled with the current local time of day.
    pub fn starting_now() -> Self {
        Self {
            time: current_time_of_day(),
            ..Default::default()
        }
    }
}

/// Saved assessment together with its activity category.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedScore {
    pub score: SymptomScore,
    pub level: ActivityLevel,
}

// ═══════════════════════════════════════════
// Recording
// ═══════════════════════════════════════════

pub fn record_symptom_score(
    client: &Client,
    answers: &PucaiAnswers,
) -> Result<RecordedScore, JournalError> {
    let user = signed_in(client)?;
    let mut draft = answers.to_draft(&user.id)?;
    draft.created_at = Some(Utc::now());

    let score = insert_one(client.db().collection::<SymptomScore>().insert(&[draft])?)?;
    let level = ActivityLevel::from_score(f64::from(score.sum));
    tracing::info!(sum = score.sum, level = level.label(), "Recorded PUCAI score");
    Ok(RecordedScore { score, level })
}

pub fn record_mood(client: &Client, amount: i32, notes: Option<&str>) -> Result<Mood, JournalError> {
    let user = signed_in(client)?;
    let draft = NewMood {
        id: None,
        user_id: user.id,
        amount,
        notes: non_empty(notes),
        created_at: Some(Utc::now()),
    };

    let mood = insert_one(client.db().collection::<Mood>().insert(&[draft])?)?;
    tracing::info!(amount = mood.amount, "Recorded mood");
    Ok(mood)
}

pub fn record_meal(client: &Client, entry: &MealEntry) -> Result<Meal, JournalError> {
    let user = signed_in(client)?;
    let draft = NewMeal {
        id: None,
        user_id: user.id,
        name: entry.name.trim().to_string(),
        time: entry.time.trim().to_string(),
        meal_type: entry.meal_type,
        ingredients: non_empty(entry.ingredients.as_deref()),
        notes: non_empty(entry.notes.as_deref()),
        image_url: non_empty(entry.image_url.as_deref()),
        created_at: Some(Utc::now()),
    };

    let meal = insert_one(client.db().collection::<Meal>().insert(&[draft])?)?;
    tracing::info!(meal_type = ?meal.meal_type, "Recorded meal");
    Ok(meal)
}

// ═══════════════════════════════════════════
// History
// ═══════════════════════════════════════════

/// Most recent assessments of `user_id`, newest first.
pub fn recent_scores(
    db: &LocalDb,
    user_id: &str,
    limit: usize,
) -> Result<Vec<SymptomScore>, DatabaseError> {
    db.collection::<SymptomScore>().select_eq(
        ScoreField::UserId,
        user_id,
        &Select::ordered(Order::desc(ScoreField::CreatedAt)).limit(limit),
    )
}

/// Most recent moods of `user_id`, newest first.
pub fn recent_moods(db: &LocalDb, user_id: &str, limit: usize) -> Result<Vec<Mood>, DatabaseError> {
    db.collection::<Mood>().select_eq(
        MoodField::UserId,
        user_id,
        &Select::ordered(Order::desc(MoodField::CreatedAt)).limit(limit),
    )
}

/// Most recent meals of `user_id`, newest first.
pub fn recent_meals(db: &LocalDb, user_id: &str, limit: usize) -> Result<Vec<Meal>, DatabaseError> {
    db.collection::<Meal>().select_eq(
        MealField::UserId,
        user_id,
        &Select::ordered(Order::desc(MealField::CreatedAt)).limit(limit),
    )
}

// ── helpers ─────────────────────────────────────────

fn signed_in(client: &Client) -> Result<User, JournalError> {
    client.auth().current_user()?.ok_or(JournalError::NotSignedIn)
}

fn insert_one<R>(mut inserted: Vec<R>) -> Result<R, JournalError> {
    inserted
        .pop()
        .ok_or_else(|| DatabaseError::Validation("Insert returned no record".into()).into())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Local time of day as `HH:MM`.
pub fn current_time_of_day() -> String {
    Local::now().format("%H:%M").to_string()
}
