//! PUCAI (Pediatric Ulcerative Colitis Activity Index) scoring.
//!
//! The question table is data: each item lists its answer options and the
//! points each option contributes. Sub-scores are stored as option values,
//! the total as points.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::NewSymptomScore;

// ═══════════════════════════════════════════
// Question table
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreItem {
    Stomachache,
    RectalBleeding,
    Texture,
    Frequency,
    NightlyBowelMovements,
    LevelOfActivity,
}

impl ScoreItem {
    pub const ALL: [ScoreItem; 6] = [
        ScoreItem::Stomachache,
        ScoreItem::RectalBleeding,
        ScoreItem::Texture,
        ScoreItem::Frequency,
        ScoreItem::NightlyBowelMovements,
        ScoreItem::LevelOfActivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stomachache => "stomachache",
            Self::RectalBleeding => "rectal_bleeding",
            Self::Texture => "texture",
            Self::Frequency => "frequency",
            Self::NightlyBowelMovements => "nightly_bowel_movements",
            Self::LevelOfActivity => "level_of_activity",
        }
    }

    pub fn question(&self) -> &'static ScoreQuestion {
        // ALL and PUCAI_QUESTIONS share the same order.
        &PUCAI_QUESTIONS[*self as usize]
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreOption {
    pub value: u8,
    pub points: u32,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreQuestion {
    pub item: ScoreItem,
    pub title: &'static str,
    pub description: &'static str,
    pub options: &'static [ScoreOption],
}

const fn opt(value: u8, points: u32, label: &'static str) -> ScoreOption {
    ScoreOption {
        value,
        points,
        label,
    }
}

pub static PUCAI_QUESTIONS: [ScoreQuestion; 6] = [
    ScoreQuestion {
        item: ScoreItem::Stomachache,
        title: "Abdominal pain",
        description: "How strong was your abdominal pain over the last 3 days?",
        options: &[
            opt(0, 0, "No pain"),
            opt(1, 5, "Mild pain"),
            opt(2, 10, "Moderate pain"),
            opt(3, 15, "Severe pain"),
        ],
    },
    ScoreQuestion {
        item: ScoreItem::RectalBleeding,
        title: "Rectal bleeding",
        description: "How much blood was in your stool over the last 3 days?",
        options: &[
            opt(0, 0, "No blood"),
            opt(1, 10, "Small amounts, in less than 50% of stools"),
            opt(2, 20, "Small amounts, in most stools"),
            opt(3, 30, "Large amounts of blood"),
        ],
    },
    ScoreQuestion {
        item: ScoreItem::Texture,
        title: "Stool consistency",
        description: "What was the consistency of most stools over the last 3 days?",
        options: &[
            opt(0, 0, "Formed"),
            opt(1, 5, "Partially formed"),
            opt(2, 10, "Completely unformed"),
        ],
    },
    ScoreQuestion {
        item: ScoreItem::Frequency,
        title: "Stool frequency",
        description: "How many stools per day did you have over the last 3 days?",
        options: &[
            opt(0, 0, "0–2 per day"),
            opt(1, 5, "3–5 per day"),
            opt(2, 10, "6–8 per day"),
            opt(3, 15, "More than 8 per day"),
        ],
    },
    ScoreQuestion {
        item: ScoreItem::NightlyBowelMovements,
        title: "Nocturnal stools",
        description: "Did you have bowel movements at night over the last 3 days?",
        options: &[opt(0, 0, "No"), opt(1, 10, "Yes")],
    },
    ScoreQuestion {
        item: ScoreItem::LevelOfActivity,
        title: "Activity level",
        description: "How limited was your activity over the last 3 days?",
        options: &[
            opt(0, 0, "No limitation"),
            opt(1, 5, "Occasional limitation"),
            opt(2, 10, "Severely restricted"),
        ],
    },
];

/// Points for `value` on `item`, or `None` if the option does not exist.
pub fn points_for(item: ScoreItem, value: u8) -> Option<u32> {
    item.question()
        .options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.points)
}

/// Highest achievable total.
pub fn max_points() -> u32 {
    PUCAI_QUESTIONS
        .iter()
        .map(|q| q.options.iter().map(|o| o.points).max().unwrap_or(0))
        .sum()
}

// ═══════════════════════════════════════════
// Answers
// ═══════════════════════════════════════════

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScoringError {
    #[error("Question not answered: {0}")]
    MissingAnswer(&'static str),

    #[error("Invalid answer {value} for {item}")]
    InvalidOption { item: &'static str, value: u8 },
}

/// Chosen option value per question. `None` means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PucaiAnswers {
    pub stomachache: Option<u8>,
    pub rectal_bleeding: Option<u8>,
    pub texture: Option<u8>,
    pub frequency: Option<u8>,
    pub nightly_bowel_movements: Option<u8>,
    pub level_of_activity: Option<u8>,
}

impl PucaiAnswers {
    pub fn get(&self, item: ScoreItem) -> Option<u8> {
        match item {
            ScoreItem::Stomachache => self.stomachache,
            ScoreItem::RectalBleeding => self.rectal_bleeding,
            ScoreItem::Texture => self.texture,
            ScoreItem::Frequency => self.frequency,
            ScoreItem::NightlyBowelMovements => self.nightly_bowel_movements,
            ScoreItem::LevelOfActivity => self.level_of_activity,
        }
    }

    pub fn set(&mut self, item: ScoreItem, value: u8) {
        let slot = match item {
            ScoreItem::Stomachache => &mut self.stomachache,
            ScoreItem::RectalBleeding => &mut self.rectal_bleeding,
            ScoreItem::Texture => &mut self.texture,
            ScoreItem::Frequency => &mut self.frequency,
            ScoreItem::NightlyBowelMovements => &mut self.nightly_bowel_movements,
            ScoreItem::LevelOfActivity => &mut self.level_of_activity,
        };
        *slot = Some(value);
    }

    pub fn is_complete(&self) -> bool {
        ScoreItem::ALL.iter().all(|item| self.get(*item).is_some())
    }

    /// Total points. Every question must be answered with a listed option.
    pub fn total_points(&self) -> Result<u32, ScoringError> {
        let mut total = 0;
        for item in ScoreItem::ALL {
            let value = self
                .get(item)
                .ok_or(ScoringError::MissingAnswer(item.as_str()))?;
            total += points_for(item, value).ok_or(ScoringError::InvalidOption {
                item: item.as_str(),
                value,
            })?;
        }
        Ok(total)
    }

    /// Build the record draft for `user_id`.
    pub fn to_draft(&self, user_id: &str) -> Result<NewSymptomScore, ScoringError> {
        let sum = self.total_points()?;
        let value = |item: ScoreItem| i32::from(self.get(item).unwrap_or(0));
        Ok(NewSymptomScore {
            id: None,
            user_id: user_id.to_string(),
            stomachache: value(ScoreItem::Stomachache),
            rectal_bleeding: value(ScoreItem::RectalBleeding),
            texture: value(ScoreItem::Texture),
            frequency: value(ScoreItem::Frequency),
            nightly_bowel_movements: value(ScoreItem::NightlyBowelMovements),
            level_of_activity: value(ScoreItem::LevelOfActivity),
            sum: sum as i32,
            created_at: None,
        })
    }
}

// ═══════════════════════════════════════════
// Activity categories
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Remission,
    Mild,
    Moderate,
    Severe,
}

impl ActivityLevel {
    /// <10 remission, <35 mild, <65 moderate, otherwise severe.
    pub fn from_score(score: f64) -> Self {
        if score < 10.0 {
            Self::Remission
        } else if score < 35.0 {
            Self::Mild
        } else if score < 65.0 {
            Self::Moderate
        } else {
            Self::Severe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Remission => "Remission",
            Self::Mild => "Mild activity",
            Self::Moderate => "Moderate activity",
            Self::Severe => "Severe activity",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Remission => "#10b981",
            Self::Mild => "#f59e0b",
            Self::Moderate => "#f97316",
            Self::Severe => "#ef4444",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_answered(values: [u8; 6]) -> PucaiAnswers {
        let mut answers = PucaiAnswers::default();
        for (item, value) in ScoreItem::ALL.into_iter().zip(values) {
            answers.set(item, value);
        }
        answers
    }

    #[test]
    fn table_order_matches_items() {
        for item in ScoreItem::ALL {
            assert_eq!(item.question().item, item);
        }
    }

    #[test]
    fn points_lookup() {
        assert_eq!(points_for(ScoreItem::RectalBleeding, 2), Some(20));
        assert_eq!(points_for(ScoreItem::NightlyBowelMovements, 1), Some(10));
        assert_eq!(points_for(ScoreItem::Texture, 3), None);
    }

    #[test]
    fn max_is_90() {
        assert_eq!(max_points(), 90);
    }

    #[test]
    fn total_of_mixed_answers() {
        // 5 + 10 + 0 + 10 + 10 + 5
        let answers = all_answered([1, 1, 0, 2, 1, 1]);
        assert_eq!(answers.total_points().unwrap(), 40);
    }

    #[test]
    fn incomplete_answers_rejected() {
        let mut answers = PucaiAnswers::default();
        answers.set(ScoreItem::Stomachache, 1);
        assert!(!answers.is_complete());
        assert_eq!(
            answers.total_points(),
            Err(ScoringError::MissingAnswer("rectal_bleeding"))
        );
    }

    #[test]
    fn invalid_option_rejected() {
        let answers = all_answered([0, 0, 0, 0, 2, 0]);
        assert_eq!(
            answers.total_points(),
            Err(ScoringError::InvalidOption {
                item: "nightly_bowel_movements",
                value: 2
            })
        );
    }

    #[test]
    fn draft_carries_values_and_sum() {
        let draft = all_answered([3, 0, 2, 1, 0, 1]).to_draft("u1").unwrap();
        assert_eq!(draft.stomachache, 3);
        assert_eq!(draft.texture, 2);
        assert_eq!(draft.sum, 15 + 10 + 5 + 5);
        assert_eq!(draft.user_id, "u1");
    }

    #[test]
    fn activity_thresholds() {
        assert_eq!(ActivityLevel::from_score(0.0), ActivityLevel::Remission);
        assert_eq!(ActivityLevel::from_score(9.0), ActivityLevel::Remission);
        assert_eq!(ActivityLevel::from_score(10.0), ActivityLevel::Mild);
        assert_eq!(ActivityLevel::from_score(34.9), ActivityLevel::Mild);
        assert_eq!(ActivityLevel::from_score(35.0), ActivityLevel::Moderate);
        assert_eq!(ActivityLevel::from_score(65.0), ActivityLevel::Severe);
        assert_eq!(ActivityLevel::Severe.color(), "#ef4444");
    }
}
