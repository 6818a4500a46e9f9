use serde::{Deserialize, Serialize};

use crate::db::{CollectionName, Column, Draft, Record, Scalar};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The signed-in user as exposed to callers. Never carries a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl User {
    pub fn display_name(&self) -> Option<&str> {
        self.user_metadata.name.as_deref()
    }
}

/// Entry of the `users` collection: the user plus its plaintext credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl StoredUser {
    pub fn public(&self) -> User {
        User {
            id: self.id.clone(),
            email: self.email.clone(),
            user_metadata: self.user_metadata.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Id,
    Email,
}

impl Column for UserField {
    fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Email => "email",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub password: String,
    pub user_metadata: UserMetadata,
}

impl Draft for NewUser {}

impl Draft for User {}

impl Record for StoredUser {
    const COLLECTION: CollectionName = CollectionName::Users;
    type Field = UserField;
    type Draft = NewUser;

    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: UserField) -> Scalar {
        match field {
            UserField::Id => Scalar::from(&self.id),
            UserField::Email => Scalar::from(&self.email),
        }
    }
}

impl Record for User {
    const COLLECTION: CollectionName = CollectionName::CurrentUser;
    type Field = UserField;
    type Draft = User;

    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: UserField) -> Scalar {
        match field {
            UserField::Id => Scalar::from(&self.id),
            UserField::Email => Scalar::from(&self.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_view_drops_password() {
        let stored = StoredUser {
            id: "u1".into(),
            email: "a@example.com".into(),
            password: "secret".into(),
            user_metadata: UserMetadata {
                name: Some("Ada".into()),
            },
        };
        let user = stored.public();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(user.display_name(), Some("Ada"));
    }

    #[test]
    fn user_without_metadata_deserializes() {
        let user: User = serde_json::from_str(r#"{"id":"u1","email":"a@example.com"}"#).unwrap();
        assert!(user.display_name().is_none());
    }
}
