use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Meal, Mood, SymptomScore};

/// Number of entries in the recent activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Length of the timeline window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineWindow {
    #[default]
    Week,
    Month,
    Quarter,
}

impl TimelineWindow {
    pub fn days(&self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }

    pub fn from_days(days: u32) -> Option<Self> {
        match days {
            7 => Some(Self::Week),
            30 => Some(Self::Month),
            90 => Some(Self::Quarter),
            _ => None,
        }
    }
}

/// One calendar day (UTC) of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPoint {
    pub date: NaiveDate,
    /// Latest PUCAI total recorded that day.
    pub score: Option<i32>,
    /// Latest mood rating recorded that day.
    pub mood: Option<i32>,
    pub meals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineAverages {
    /// Mean over days that have a score.
    pub avg_score: Option<f64>,
    /// Mean over days that have a mood.
    pub avg_mood: Option<f64>,
    pub total_meals: usize,
    /// Total meals divided by the window length.
    pub meals_per_day: f64,
}

/// One journal entry of any kind, for the activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entry", rename_all = "snake_case")]
pub enum TimelineEntry {
    Score(SymptomScore),
    Mood(Mood),
    Meal(Meal),
}

impl TimelineEntry {
    pub fn id(&self) -> &str {
        match self {
            Self::Score(s) => &s.id,
            Self::Mood(m) => &m.id,
            Self::Meal(m) => &m.id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Score(s) => s.created_at,
            Self::Mood(m) => m.created_at,
            Self::Meal(m) => m.created_at,
        }
    }
}

/// Complete timeline payload, oldest day first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub window: TimelineWindow,
    pub days: Vec<DayPoint>,
    pub averages: TimelineAverages,
    /// All entries of the user regardless of window.
    pub total_entries: usize,
    /// Newest entries of every kind, newest first.
    pub recent_activity: Vec<TimelineEntry>,
}
