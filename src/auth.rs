//! Local authentication over the `users` and `current_user` collections.
//!
//! Credentials are matched in plaintext. The signed-in user is the single
//! element of `current_user`; signing out removes that key.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{DatabaseError, LocalDb, Select};
use crate::models::{NewUser, Profile, ProfileChanges, StoredUser, User, UserField, UserMetadata};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("E-mail already registered: {0}")]
    DuplicateEmail(String),

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Fields of `user_metadata` a caller may change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadataUpdate {
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LocalAuth {
    db: LocalDb,
}

impl LocalAuth {
    pub fn new(db: LocalDb) -> Self {
        Self { db }
    }

    /// Register a new user, sign them in, and create their profile.
    pub fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DatabaseError::Validation("Email and password are required".into()).into());
        }

        let users = self.db.collection::<StoredUser>();
        match users.select_single(UserField::Email, email) {
            Ok(_) => {
                tracing::warn!("Sign-up rejected, e-mail already registered");
                return Err(AuthError::DuplicateEmail(email.to_string()));
            }
            Err(DatabaseError::NotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        let name = name.trim();
        let draft = NewUser {
            id: None,
            email: email.to_string(),
            password: password.to_string(),
            user_metadata: UserMetadata {
                name: (!name.is_empty()).then(|| name.to_string()),
            },
        };
        let stored = users
            .insert(std::slice::from_ref(&draft))?
            .pop()
            .ok_or_else(|| DatabaseError::Validation("User insert returned nothing".into()))?;
        let user = stored.public();

        self.db.collection::<User>().replace_all(std::slice::from_ref(&user))?;

        self.db.collection::<Profile>().upsert(&ProfileChanges {
            id: Some(user.id.clone()),
            email: Some(user.email.clone()),
            name: user.user_metadata.name.clone(),
            onboarding_completed: Some(false),
            ..Default::default()
        })?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Sign in with an exact email and password match.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .db
            .collection::<StoredUser>()
            .select_eq(UserField::Email, email, &Select::default())?
            .into_iter()
            .find(|u| u.password == password)
            .map(|u| u.public())
            .ok_or_else(|| {
                tracing::warn!("Sign-in rejected");
                AuthError::InvalidCredentials
            })?;

        self.db.collection::<User>().replace_all(std::slice::from_ref(&user))?;
        tracing::info!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.db.collection::<User>().clear()?;
        tracing::info!("User signed out");
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self
            .db
            .collection::<User>()
            .select(&Select::default().limit(1))?
            .pop())
    }

    /// Merge `update` into the signed-in user and its stored credentials.
    /// Returns `None` when nobody is signed in. A missing or blank name
    /// writes nothing.
    pub fn update_user(&self, update: &UserMetadataUpdate) -> Result<Option<User>, AuthError> {
        let Some(mut user) = self.current_user()? else {
            tracing::debug!("update_user called while signed out");
            return Ok(None);
        };

        let Some(name) = update
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        else {
            return Ok(Some(user));
        };
        user.user_metadata.name = Some(name.to_string());

        self.db.collection::<User>().replace_all(std::slice::from_ref(&user))?;
        let patch = serde_json::json!({ "user_metadata": user.user_metadata });
        let stored = self
            .db
            .collection::<StoredUser>()
            .update_eq(UserField::Id, &user.id, &patch)?;
        if stored.is_none() {
            tracing::warn!(user_id = %user.id, "Current user has no stored credentials");
        }

        Ok(Some(user))
    }
}
