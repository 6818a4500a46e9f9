use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{Gender, Language};
use crate::db::{CollectionName, Column, DatabaseError, Draft, Record, Scalar};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_in_cm: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_of_diagnosis: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_medication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default)]
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Id,
    Email,
    Language,
    OnboardingCompleted,
    YearOfDiagnosis,
    CreatedAt,
    UpdatedAt,
}

impl Column for ProfileField {
    fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Email => "email",
            Self::Language => "language",
            Self::OnboardingCompleted => "onboarding_completed",
            Self::YearOfDiagnosis => "year_of_diagnosis",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Partial profile used for upserts and patches. Absent fields leave the
/// stored value untouched. `Some(None)` on a clearable field writes null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub gender: Option<Option<Gender>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub age: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub weight: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub height_in_cm: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub year_of_diagnosis: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub current_medication: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "clearable")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding_completed: Option<bool>,
}

/// A present key, null included, becomes `Some`.
fn clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl Draft for ProfileChanges {
    fn validate(&self) -> Result<(), DatabaseError> {
        if let Some(ref email) = self.email {
            if email.trim().is_empty() {
                return Err(DatabaseError::Validation("Email must not be empty".into()));
            }
        }
        if let Some(Some(age)) = self.age {
            if !(0..=150).contains(&age) {
                return Err(DatabaseError::Validation(format!("Age out of range: {age}")));
            }
        }
        if let Some(Some(weight)) = self.weight {
            if !(weight > 0.0 && weight < 1000.0) {
                return Err(DatabaseError::Validation(format!("Weight out of range: {weight}")));
            }
        }
        if let Some(Some(height)) = self.height_in_cm {
            if !(1..=300).contains(&height) {
                return Err(DatabaseError::Validation(format!(
                    "Height out of range: {height}"
                )));
            }
        }
        if let Some(Some(year)) = self.year_of_diagnosis {
            let current_year = Utc::now().year();
            if !(1900..=current_year).contains(&year) {
                return Err(DatabaseError::Validation(format!(
                    "Year of diagnosis out of range: {year}"
                )));
            }
        }
        Ok(())
    }
}

impl Record for Profile {
    const COLLECTION: CollectionName = CollectionName::Profiles;
    type Field = ProfileField;
    type Draft = ProfileChanges;

    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: ProfileField) -> Scalar {
        match field {
            ProfileField::Id => Scalar::from(&self.id),
            ProfileField::Email => Scalar::from(&self.email),
            ProfileField::Language => Scalar::from(self.language.map(|l| l.as_str())),
            ProfileField::OnboardingCompleted => Scalar::from(self.onboarding_completed),
            ProfileField::YearOfDiagnosis => Scalar::from(self.year_of_diagnosis),
            ProfileField::CreatedAt => Scalar::from(self.created_at),
            ProfileField::UpdatedAt => Scalar::from(self.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_changes_serialize_to_empty_object() {
        let json = serde_json::to_value(ProfileChanges::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn minimal_profile_deserializes_with_defaults() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":"u1","email":"a@example.com","created_at":"2025-01-01T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert!(!profile.onboarding_completed);
        assert!(profile.language.is_none());
        assert!(profile.updated_at.is_none());
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let bad_age = ProfileChanges {
            age: Some(Some(-1)),
            ..Default::default()
        };
        assert!(bad_age.validate().is_err());

        let bad_year = ProfileChanges {
            year_of_diagnosis: Some(Some(1800)),
            ..Default::default()
        };
        assert!(bad_year.validate().is_err());

        let ok = ProfileChanges {
            age: Some(Some(34)),
            weight: Some(Some(61.5)),
            height_in_cm: Some(Some(170)),
            year_of_diagnosis: Some(Some(2019)),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let cleared = ProfileChanges {
            age: Some(None),
            weight: Some(None),
            ..Default::default()
        };
        assert!(cleared.validate().is_ok());
    }

    // ── Clearing ────────────────────────────────────────────────────────────

    #[test]
    fn cleared_fields_serialize_as_null() {
        let json = serde_json::to_value(ProfileChanges {
            weight: Some(None),
            notes: Some(Some("ok".into())),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "weight": null, "notes": "ok" }));
    }

    #[test]
    fn null_and_missing_keys_deserialize_differently() {
        let changes: ProfileChanges = serde_json::from_str(r#"{"age":null,"notes":"x"}"#).unwrap();
        assert_eq!(changes.age, Some(None));
        assert_eq!(changes.notes, Some(Some("x".into())));
        assert_eq!(changes.weight, None);
    }

    #[test]
    fn language_field_value() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":"u1","email":"a@example.com","language":"fr","created_at":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(profile.value(ProfileField::Language), Scalar::from("fr"));
    }
}
