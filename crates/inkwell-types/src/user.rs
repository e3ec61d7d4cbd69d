use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::UserId;
use crate::input::{FieldReader, RawInput, ValidationError};

pub const MIN_USERNAME_CHARS: usize = 3;

const USERNAME_TOO_SHORT: &str = "Username must be at least 3 characters";
const EMAIL_INVALID: &str = "Please enter a valid email address";
const IMMUTABLE: &str = "Cannot be changed through a profile update";

/// Opaque credential material produced by the authentication collaborator.
///
/// Inkwell never hashes, compares or prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(material: impl Into<String>) -> Self {
        Self(material.into())
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// A registered account as the store holds it.
///
/// Deliberately not `Serialize`: convert to [`PublicUser`] before anything
/// leaves the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password: PasswordHash,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn to_public(&self) -> PublicUser {
        PublicUser::from(self.clone())
    }
}

/// A user with the password stripped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            location: user.location,
            website: user.website,
            avatar_url: user.avatar_url,
        }
    }
}

/// Case-insensitive equality used for username and email lookups.
pub fn eq_case_insensitive(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

// ---------------------------------------------------------------------------
// NewUser
// ---------------------------------------------------------------------------

/// A validated registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    username: String,
    email: String,
    password: PasswordHash,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: PasswordHash,
    ) -> Result<Self, ValidationError> {
        let mut map = Map::new();
        map.insert("username".into(), Value::String(username.into()));
        map.insert("email".into(), Value::String(email.into()));

        let mut reader = FieldReader::new(map);
        let username = reader.required_str("username", MIN_USERNAME_CHARS, USERNAME_TOO_SHORT);
        let email = read_email(&mut reader, true);
        reader.finish()?;

        match (username, email) {
            (Some(username), Some(email)) => Ok(Self {
                username,
                email,
                password,
                first_name: None,
                last_name: None,
            }),
            _ => Err(ValidationError::single("body", "Required")),
        }
    }

    pub fn with_names(
        mut self,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        self.first_name = first_name.filter(|s| !s.is_empty());
        self.last_name = last_name.filter(|s| !s.is_empty());
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Materialize the stored entity. Profile fields other than the names
    /// start absent.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: None,
            location: None,
            website: None,
            avatar_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// UserPatch
// ---------------------------------------------------------------------------

/// A validated profile update.
///
/// `id`, `username` and `password` can never be part of it. Optional profile
/// fields take `Some(None)` to clear a value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPatch {
    email: Option<String>,
    first_name: Option<Option<String>>,
    last_name: Option<Option<String>>,
    bio: Option<Option<String>>,
    location: Option<Option<String>>,
    website: Option<Option<String>>,
    avatar_url: Option<Option<String>>,
}

impl UserPatch {
    pub fn parse(raw: RawInput<'_>) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(raw.object()?);
        for field in ["id", "username", "password"] {
            reader.forbid(field, IMMUTABLE);
        }
        let email = read_email(&mut reader, false);
        let mut profile = |field: &str| reader.nullable_str(field).map(|v| v.filter(|s| !s.is_empty()));
        let first_name = profile("firstName");
        let last_name = profile("lastName");
        let bio = profile("bio");
        let location = profile("location");
        let website = profile("website");
        let avatar_url = profile("avatarUrl");
        reader.finish()?;
        Ok(Self {
            email,
            first_name,
            last_name,
            bio,
            location,
            website,
            avatar_url,
        })
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_bio(mut self, bio: Option<String>) -> Self {
        self.bio = Some(bio);
        self
    }

    /// The new email, if this patch changes it.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Shallow-merge into `user`.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        let slots = [
            (&self.first_name, &mut user.first_name),
            (&self.last_name, &mut user.last_name),
            (&self.bio, &mut user.bio),
            (&self.location, &mut user.location),
            (&self.website, &mut user.website),
            (&self.avatar_url, &mut user.avatar_url),
        ];
        for (patch, slot) in slots {
            if let Some(value) = patch {
                slot.clone_from(value);
            }
        }
    }
}

fn read_email(reader: &mut FieldReader, required: bool) -> Option<String> {
    let email = if required {
        reader.required_str("email", 0, EMAIL_INVALID)
    } else {
        reader.optional_str("email", 0, EMAIL_INVALID)
    }?;
    if looks_like_email(&email) {
        Some(email)
    } else {
        reader.violation("email", EMAIL_INVALID);
        None
    }
}

fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
