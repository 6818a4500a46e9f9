//! Landing view for a signed-in user.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::client::Client;
use crate::db::{Bound, DatabaseError, Order, Select};
use crate::models::{Meal, MealField, Mood, MoodField, Profile, ScoreField, SymptomScore, User};
use crate::profile::load_profile;
use crate::scoring::ActivityLevel;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum DashboardState {
    SignedOut,
    NeedsOnboarding(User),
    Ready(Box<DashboardData>),
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub user: User,
    pub profile: Profile,
    pub latest_score: Option<SymptomScore>,
    pub activity: Option<ActivityLevel>,
    pub todays_meals: Vec<Meal>,
    pub latest_mood: Option<Mood>,
    /// The latest score was recorded today.
    pub score_done_today: bool,
    /// The latest mood was recorded today.
    pub mood_done_today: bool,
}

/// Collect the dashboard for `today` (a UTC calendar date).
pub fn load_dashboard(client: &Client, today: NaiveDate) -> Result<DashboardState, DashboardError> {
    let Some(user) = client.auth().current_user()? else {
        return Ok(DashboardState::SignedOut);
    };

    let profile = match load_profile(client.db(), &user.id) {
        Ok(profile) if profile.onboarding_completed => profile,
        Ok(_) | Err(DatabaseError::NotFound { .. }) => {
            tracing::debug!(user_id = %user.id, "Profile not onboarded");
            return Ok(DashboardState::NeedsOnboarding(user));
        }
        Err(e) => return Err(e.into()),
    };

    let db = client.db();
    let latest_score = db
        .collection::<SymptomScore>()
        .select_eq(
            ScoreField::UserId,
            &user.id,
            &Select::ordered(Order::desc(ScoreField::CreatedAt)).limit(1),
        )?
        .pop();

    let (start, end) = day_bounds(today);
    let mut todays_meals = db.collection::<Meal>().select_range(
        MealField::UserId,
        &user.id,
        &Bound::new(MealField::CreatedAt, start),
        &Bound::new(MealField::CreatedAt, end),
    )?;
    todays_meals.sort_by_key(|m| m.created_at);

    let latest_mood = db
        .collection::<Mood>()
        .select_eq(
            MoodField::UserId,
            &user.id,
            &Select::ordered(Order::desc(MoodField::CreatedAt)).limit(1),
        )?
        .pop();

    let activity = latest_score
        .as_ref()
        .map(|s| ActivityLevel::from_score(f64::from(s.sum)));
    let score_done_today = latest_score
        .as_ref()
        .is_some_and(|s| s.created_at.date_naive() == today);
    let mood_done_today = latest_mood
        .as_ref()
        .is_some_and(|m| m.created_at.date_naive() == today);

    tracing::debug!(
        user_id = %user.id,
        meals = todays_meals.len(),
        has_score = latest_score.is_some(),
        has_mood = latest_mood.is_some(),
        "Dashboard loaded"
    );

    Ok(DashboardState::Ready(Box::new(DashboardData {
        user,
        profile,
        latest_score,
        activity,
        todays_meals,
        latest_mood,
        score_done_today,
        mood_done_today,
    })))
}

/// First and last instant of `day` in UTC, both inclusive.
fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = day
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN))
        .and_utc();
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewMeal, NewMood, NewSymptomScore};
    use crate::profile::{complete_onboarding, OnboardingForm};
    use chrono::TimeZone;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, m, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn onboarded_client() -> (Client, User) {
        let client = Client::in_memory();
        let user = client.auth().sign_up("ada@example.com", "pw", "Ada").unwrap();
        complete_onboarding(&client, &OnboardingForm::default()).unwrap();
        (client, user)
    }

    fn meal(user: &str, name: &str, created_at: DateTime<Utc>) -> NewMeal {
        NewMeal {
            id: None,
            user_id: user.into(),
            name: name.into(),
            time: "12:00".into(),
            meal_type: None,
            ingredients: None,
            notes: None,
            image_url: None,
            created_at: Some(created_at),
        }
    }

    #[test]
    fn signed_out_state() {
        let client = Client::in_memory();
        assert!(matches!(
            load_dashboard(&client, today()).unwrap(),
            DashboardState::SignedOut
        ));
    }

    #[test]
    fn fresh_sign_up_needs_onboarding() {
        let client = Client::in_memory();
        let user = client.auth().sign_up("ada@example.com", "pw", "Ada").unwrap();
        match load_dashboard(&client, today()).unwrap() {
            DashboardState::NeedsOnboarding(u) => assert_eq!(u, user),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn empty_dashboard_after_onboarding() {
        let (client, _) = onboarded_client();
        let DashboardState::Ready(data) = load_dashboard(&client, today()).unwrap() else {
            panic!("expected ready dashboard");
        };
        assert!(data.latest_score.is_none());
        assert!(data.activity.is_none());
        assert!(data.todays_meals.is_empty());
        assert!(data.latest_mood.is_none());
        assert!(!data.score_done_today);
        assert!(!data.mood_done_today);
    }

    #[test]
    fn ready_dashboard_collects_latest_and_today() {
        let (client, user) = onboarded_client();
        let db = client.db();

        db.collection::<SymptomScore>()
            .insert(&[
                NewSymptomScore {
                    id: None,
                    user_id: user.id.clone(),
                    stomachache: 0,
                    rectal_bleeding: 0,
                    texture: 0,
                    frequency: 0,
                    nightly_bowel_movements: 0,
                    level_of_activity: 0,
                    sum: 0,
                    created_at: Some(at(8, 9, 0)),
                },
                NewSymptomScore {
                    id: None,
                    user_id: user.id.clone(),
                    stomachache: 3,
                    rectal_bleeding: 3,
                    texture: 2,
                    frequency: 3,
                    nightly_bowel_movements: 1,
                    level_of_activity: 2,
                    sum: 90,
                    created_at: Some(at(9, 9, 0)),
                },
            ])
            .unwrap();

        db.collection::<Meal>()
            .insert(&[
                meal(&user.id, "yesterday", at(9, 23, 59)),
                meal(&user.id, "dinner", at(10, 19, 0)),
                meal(&user.id, "breakfast", at(10, 0, 0)),
                meal("someone-else", "other", at(10, 12, 0)),
                meal(&user.id, "tomorrow", at(11, 0, 0)),
            ])
            .unwrap();

        db.collection::<Mood>()
            .insert(&[
                NewMood {
                    id: None,
                    user_id: user.id.clone(),
                    amount: 2,
                    notes: None,
                    created_at: Some(at(7, 8, 0)),
                },
                NewMood {
                    id: None,
                    user_id: user.id.clone(),
                    amount: 5,
                    notes: None,
                    created_at: Some(at(9, 8, 0)),
                },
            ])
            .unwrap();

        let DashboardState::Ready(data) = load_dashboard(&client, today()).unwrap() else {
            panic!("expected ready dashboard");
        };
        assert_eq!(data.latest_score.as_ref().map(|s| s.sum), Some(90));
        assert_eq!(data.activity, Some(ActivityLevel::Severe));
        let names: Vec<_> = data.todays_meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["breakfast", "dinner"]);
        assert_eq!(data.latest_mood.as_ref().map(|m| m.amount), Some(5));
        // both latest entries are from yesterday
        assert!(!data.score_done_today);
        assert!(!data.mood_done_today);
    }

    // ── Done today ──────────────────────────────────────────────────────────

    #[test]
    fn done_today_follows_latest_entry_date() {
        let (client, user) = onboarded_client();
        let db = client.db();

        db.collection::<SymptomScore>()
            .insert(&[NewSymptomScore {
                id: None,
                user_id: user.id.clone(),
                stomachache: 0,
                rectal_bleeding: 0,
                texture: 0,
                frequency: 0,
                nightly_bowel_movements: 0,
                level_of_activity: 0,
                sum: 0,
                created_at: Some(at(10, 7, 30)),
            }])
            .unwrap();
        db.collection::<Mood>()
            .insert(&[NewMood {
                id: None,
                user_id: user.id.clone(),
                amount: 4,
                notes: None,
                created_at: Some(at(9, 22, 0)),
            }])
            .unwrap();

        let DashboardState::Ready(data) = load_dashboard(&client, today()).unwrap() else {
            panic!("expected ready dashboard");
        };
        assert!(data.score_done_today);
        assert!(!data.mood_done_today);

        let tomorrow = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let DashboardState::Ready(data) = load_dashboard(&client, tomorrow).unwrap() else {
            panic!("expected ready dashboard");
        };
        assert!(!data.score_done_today);
    }

    #[test]
    fn day_bounds_cover_whole_day() {
        let (start, end) = day_bounds(today());
        assert_eq!(start, at(10, 0, 0));
        assert!(end > Utc.with_ymd_and_hms(2025, 3, 10, 23, 59, 59).unwrap());
        assert!(end < at(11, 0, 0));
    }
}
