//! Per-day series of PUCAI totals, moods, and meal counts over a 7, 30, or
//! 90 day window, with window averages.

mod aggregates;
mod fetch;
mod types;

pub use aggregates::*;
pub use fetch::TimelineSources;
pub use types::*;

use chrono::NaiveDate;

use crate::db::{DatabaseError, LocalDb};

/// Load the timeline of `user_id` for the window ending on `today` (UTC).
pub fn load_timeline(
    db: &LocalDb,
    user_id: &str,
    window: TimelineWindow,
    today: NaiveDate,
) -> Result<Timeline, DatabaseError> {
    let sources = fetch::fetch_sources(db, user_id)?;
    tracing::debug!(
        user_id,
        days = window.days(),
        scores = sources.scores.len(),
        moods = sources.moods.len(),
        meals = sources.meals.len(),
        "Assembling timeline"
    );
    Ok(assemble(&sources, window, today))
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Meal, Mood, NewMeal, NewMood, NewSymptomScore, SymptomScore};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, d, h, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()
    }

    fn score(user: &str, stomachache: i32, created_at: DateTime<Utc>) -> NewSymptomScore {
        NewSymptomScore {
            id: None,
            user_id: user.into(),
            stomachache,
            rectal_bleeding: 0,
            texture: 0,
            frequency: 0,
            nightly_bowel_movements: 0,
            level_of_activity: 0,
            sum: stomachache * 5,
            created_at: Some(created_at),
        }
    }

    fn mood(user: &str, amount: i32, created_at: DateTime<Utc>) -> NewMood {
        NewMood {
            id: None,
            user_id: user.into(),
            amount,
            notes: None,
            created_at: Some(created_at),
        }
    }

    fn meal(user: &str, created_at: DateTime<Utc>) -> NewMeal {
        NewMeal {
            id: None,
            user_id: user.into(),
            name: "Rice".into(),
            time: "12:00".into(),
            meal_type: None,
            ingredients: None,
            notes: None,
            image_url: None,
            created_at: Some(created_at),
        }
    }

    fn seeded_db() -> LocalDb {
        let db = LocalDb::in_memory();
        db.collection::<SymptomScore>()
            .insert(&[
                score("u1", 1, at(14, 8)),
                score("u1", 3, at(14, 20)),
                score("u1", 2, at(10, 9)),
                // outside the week
                score("u1", 3, at(1, 9)),
                score("u2", 3, at(14, 9)),
            ])
            .unwrap();
        db.collection::<Mood>()
            .insert(&[mood("u1", 2, at(13, 7)), mood("u1", 5, at(13, 21)), mood("u1", 3, at(8, 7))])
            .unwrap();
        db.collection::<Meal>()
            .insert(&[meal("u1", at(14, 8)), meal("u1", at(14, 12)), meal("u1", at(12, 12))])
            .unwrap();
        db
    }

    #[test]
    fn week_has_seven_days_ending_today() {
        let timeline = load_timeline(&seeded_db(), "u1", TimelineWindow::Week, today()).unwrap();
        assert_eq!(timeline.days.len(), 7);
        assert_eq!(timeline.days[0].date, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
        assert_eq!(timeline.days[6].date, today());
    }

    #[test]
    fn latest_entry_of_each_day_wins() {
        let timeline = load_timeline(&seeded_db(), "u1", TimelineWindow::Week, today()).unwrap();
        let day = |d: u32| {
            timeline
                .days
                .iter()
                .find(|p| p.date == NaiveDate::from_ymd_opt(2025, 6, d).unwrap())
                .unwrap()
        };

        assert_eq!(day(14).score, Some(15));
        assert_eq!(day(10).score, Some(10));
        assert_eq!(day(13).mood, Some(5));
        assert_eq!(day(8).mood, Some(3));
        assert_eq!(day(14).meals, 2);
        assert_eq!(day(12).meals, 1);
        assert_eq!(day(11), &DayPoint {
            date: NaiveDate::from_ymd_opt(2025, 6, 11).unwrap(),
            score: None,
            mood: None,
            meals: 0,
        });
    }

    #[test]
    fn averages_over_present_days() {
        let timeline = load_timeline(&seeded_db(), "u1", TimelineWindow::Week, today()).unwrap();
        let averages = &timeline.averages;
        assert_eq!(averages.avg_score, Some(12.5));
        assert_eq!(averages.avg_mood, Some(4.0));
        assert_eq!(averages.total_meals, 3);
        assert!((averages.meals_per_day - 3.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn longer_window_reaches_older_entries() {
        let timeline = load_timeline(&seeded_db(), "u1", TimelineWindow::Month, today()).unwrap();
        assert_eq!(timeline.days.len(), 30);
        let first_of_june = timeline
            .days
            .iter()
            .find(|p| p.date == NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .unwrap();
        assert_eq!(first_of_june.score, Some(15));
        assert_eq!(timeline.averages.avg_score, Some((15.0 + 10.0 + 15.0) / 3.0));
    }

    #[test]
    fn empty_user_has_no_averages() {
        let timeline =
            load_timeline(&seeded_db(), "nobody", TimelineWindow::Quarter, today()).unwrap();
        assert_eq!(timeline.days.len(), 90);
        assert!(timeline.averages.avg_score.is_none());
        assert!(timeline.averages.avg_mood.is_none());
        assert_eq!(timeline.averages.total_meals, 0);
        assert_eq!(timeline.averages.meals_per_day, 0.0);
    }

    #[test]
    fn total_entries_ignores_window() {
        let timeline = load_timeline(&seeded_db(), "u1", TimelineWindow::Week, today()).unwrap();
        // 4 scores, 3 moods, 3 meals; the June 1 score is outside the week
        assert_eq!(timeline.total_entries, 10);
    }

    #[test]
    fn recent_activity_merges_kinds_newest_first() {
        let timeline = load_timeline(&seeded_db(), "u1", TimelineWindow::Week, today()).unwrap();
        let feed = &timeline.recent_activity;
        assert_eq!(feed.len(), RECENT_ACTIVITY_LIMIT);
        assert!(feed.windows(2).all(|w| w[0].created_at() >= w[1].created_at()));

        assert!(matches!(&feed[0], TimelineEntry::Score(s) if s.sum == 15));
        assert!(matches!(feed[1], TimelineEntry::Meal(_)));
        assert!(matches!(feed[2], TimelineEntry::Score(_)));
        assert!(matches!(feed[3], TimelineEntry::Meal(_)));
        assert!(matches!(&feed[4], TimelineEntry::Mood(m) if m.amount == 5));
        assert!(matches!(&feed[9], TimelineEntry::Score(s) if s.created_at == at(1, 9)));
    }

    #[test]
    fn recent_activity_respects_limit() {
        let sources = fetch::fetch_sources(&seeded_db(), "u1").unwrap();
        let feed = sources.recent_activity(3);
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].created_at(), at(14, 20));
        assert!(sources.recent_activity(0).is_empty());
        assert!(TimelineSources::default().recent_activity(10).is_empty());
    }

    #[test]
    fn window_days() {
        assert_eq!(TimelineWindow::default(), TimelineWindow::Week);
        assert_eq!(TimelineWindow::from_days(30), Some(TimelineWindow::Month));
        assert_eq!(TimelineWindow::Quarter.days(), 90);
        assert!(TimelineWindow::from_days(14).is_none());
    }
}
