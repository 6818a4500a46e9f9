use crate::db::{DatabaseError, LocalDb, Order, Select};
use crate::models::{Meal, MealField, Mood, MoodField, ScoreField, SymptomScore};

/// All entries of one user, newest first.
#[derive(Debug, Clone, Default)]
pub struct TimelineSources {
    pub scores: Vec<SymptomScore>,
    pub moods: Vec<Mood>,
    pub meals: Vec<Meal>,
}

pub(super) fn fetch_sources(db: &LocalDb, user_id: &str) -> Result<TimelineSources, DatabaseError> {
    let scores = db.collection::<SymptomScore>().select_eq(
        ScoreField::UserId,
        user_id,
        &Select::ordered(Order::desc(ScoreField::CreatedAt)),
    )?;
    let moods = db.collection::<Mood>().select_eq(
        MoodField::UserId,
        user_id,
        &Select::ordered(Order::desc(MoodField::CreatedAt)),
    )?;
    let meals = db.collection::<Meal>().select_eq(
        MealField::UserId,
        user_id,
        &Select::ordered(Order::desc(MealField::CreatedAt)),
    )?;

    Ok(TimelineSources {
        scores,
        moods,
        meals,
    })
}
