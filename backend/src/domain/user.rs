//! User account model.
//!
//! Accounts are created once at signup and never updated or deleted. The
//! password hash never leaves the persistence boundary as part of [`User`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Database-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Public profile of a registered user.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use snippetbox::domain::{User, UserId};
///
/// let user = User::new(UserId::new(1), "Alice", "alice@example.com", Utc::now());
/// assert_eq!(user.name(), "Alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    created: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created,
        }
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// Signup input. The plaintext password is wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
    password: Zeroizing<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: &str) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: Zeroizing::new(password.to_owned()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
