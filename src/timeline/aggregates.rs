use chrono::{Duration, NaiveDate};

use super::fetch::TimelineSources;
use super::types::*;

/// Builds one point per day from `today - (days - 1)` to `today`.
///
/// Sources must be ordered newest first; the first entry of a day is taken
/// as that day's value.
pub fn assemble(sources: &TimelineSources, window: TimelineWindow, today: NaiveDate) -> Timeline {
    let days = window.days();
    let first_day = today - Duration::days(i64::from(days) - 1);

    let points: Vec<DayPoint> = first_day
        .iter_days()
        .take(days as usize)
        .map(|date| DayPoint {
            date,
            score: sources
                .scores
                .iter()
                .find(|s| s.created_at.date_naive() == date)
                .map(|s| s.sum),
            mood: sources
                .moods
                .iter()
                .find(|m| m.created_at.date_naive() == date)
                .map(|m| m.amount),
            meals: sources
                .meals
                .iter()
                .filter(|m| m.created_at.date_naive() == date)
                .count(),
        })
        .collect();

    let averages = averages(&points, window);
    Timeline {
        window,
        days: points,
        averages,
        total_entries: sources.total_entries(),
        recent_activity: sources.recent_activity(RECENT_ACTIVITY_LIMIT),
    }
}

impl TimelineSources {
    pub fn total_entries(&self) -> usize {
        self.scores.len() + self.moods.len() + self.meals.len()
    }

    /// Scores, moods, and meals merged newest first, at most `limit`.
    /// Entries with equal timestamps keep the order scores, moods, meals.
    pub fn recent_activity(&self, limit: usize) -> Vec<TimelineEntry> {
        let mut entries: Vec<TimelineEntry> = self
            .scores
            .iter()
            .cloned()
            .map(TimelineEntry::Score)
            .chain(self.moods.iter().cloned().map(TimelineEntry::Mood))
            .chain(self.meals.iter().cloned().map(TimelineEntry::Meal))
            .collect();
        entries.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        entries.truncate(limit);
        entries
    }
}

pub fn averages(points: &[DayPoint], window: TimelineWindow) -> TimelineAverages {
    let total_meals = points.iter().map(|p| p.meals).sum();
    TimelineAverages {
        avg_score: mean(points.iter().filter_map(|p| p.score)),
        avg_mood: mean(points.iter().filter_map(|p| p.mood)),
        total_meals,
        meals_per_day: total_meals as f64 / f64::from(window.days()),
    }
}

fn mean(values: impl Iterator<Item = i32>) -> Option<f64> {
    let (sum, count) = values.fold((0i64, 0u32), |(s, c), v| (s + i64::from(v), c + 1));
    (count > 0).then(|| sum as f64 / f64::from(count))
}
