//! Profile onboarding, editing, and language preference.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{AuthError, UserMetadataUpdate};
use crate::client::Client;
use crate::db::{DatabaseError, LocalDb};
use crate::models::{Gender, Language, Profile, ProfileChanges, ProfileField, User};

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("No user is signed in")]
    NotSignedIn,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// First-run questions asked after sign-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardingForm {
    pub age: Option<i32>,
    pub year_of_diagnosis: Option<i32>,
    pub current_medication: Option<String>,
    pub notes: Option<String>,
}

/// Editable profile page. `email` falls back to the account email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub height_in_cm: Option<i32>,
    pub year_of_diagnosis: Option<i32>,
    pub current_medication: Option<String>,
    pub notes: Option<String>,
    pub language: Option<Language>,
}

pub fn load_profile(db: &LocalDb, user_id: &str) -> Result<Profile, DatabaseError> {
    db.collection::<Profile>().select_single(ProfileField::Id, user_id)
}

pub fn complete_onboarding(client: &Client, form: &OnboardingForm) -> Result<Profile, ProfileError> {
    let user = signed_in(client)?;
    let profile = client.db().collection::<Profile>().upsert(&ProfileChanges {
        id: Some(user.id.clone()),
        email: Some(user.email.clone()),
        age: form.age.map(Some),
        year_of_diagnosis: form.year_of_diagnosis.map(Some),
        current_medication: trimmed(form.current_medication.as_deref()).map(Some),
        notes: trimmed(form.notes.as_deref()).map(Some),
        onboarding_completed: Some(true),
        ..Default::default()
    })?;

    tracing::info!(user_id = %user.id, "Onboarding completed");
    Ok(profile)
}

/// Rename the user, then merge the form into their profile. Empty form
/// fields clear the stored value; email and language are only overwritten.
pub fn save_profile(client: &Client, form: &ProfileForm) -> Result<Profile, ProfileError> {
    let mut user = signed_in(client)?;

    if let Some(name) = trimmed(form.name.as_deref()) {
        if let Some(updated) = client.auth().update_user(&UserMetadataUpdate { name: Some(name) })? {
            user = updated;
        }
    }

    let email = trimmed(form.email.as_deref()).unwrap_or_else(|| user.email.clone());
    let profile = client.db().collection::<Profile>().upsert(&ProfileChanges {
        id: Some(user.id.clone()),
        email: Some(email),
        name: user.user_metadata.name.clone(),
        gender: Some(form.gender),
        date_of_birth: Some(form.date_of_birth),
        age: Some(form.age),
        weight: Some(form.weight),
        height_in_cm: Some(form.height_in_cm),
        year_of_diagnosis: Some(form.year_of_diagnosis),
        current_medication: Some(trimmed(form.current_medication.as_deref())),
        notes: Some(trimmed(form.notes.as_deref())),
        language: form.language,
        ..Default::default()
    })?;

    tracing::info!(user_id = %user.id, "Profile saved");
    Ok(profile)
}

/// Store the preferred UI language. `None` when the user has no profile.
pub fn set_language(
    db: &LocalDb,
    user_id: &str,
    language: Language,
) -> Result<Option<Profile>, DatabaseError> {
    let patch = ProfileChanges {
        language: Some(language),
        ..Default::default()
    };
    db.collection::<Profile>()
        .update_eq(ProfileField::Id, user_id, &patch)
}

/// Stored language of the user, or the default when unset.
pub fn language_of(db: &LocalDb, user_id: &str) -> Result<Language, DatabaseError> {
    match load_profile(db, user_id) {
        Ok(profile) => Ok(profile.language.unwrap_or_default()),
        Err(DatabaseError::NotFound { .. }) => Ok(Language::default()),
        Err(e) => Err(e),
    }
}

/// Up to two uppercase initials of `name`.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

fn signed_in(client: &Client) -> Result<User, ProfileError> {
    client.auth().current_user()?.ok_or(ProfileError::NotSignedIn)
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
