//! Snippet entity and its value types.
//!
//! Snippets are immutable once stored and disappear from every read once
//! their expiry passes. The row itself is never deleted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use thiserror::Error;

/// Maximum number of snippets returned by the home listing.
pub const LATEST_SNIPPETS_LIMIT: usize = 10;

/// Maximum title length, counted in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Errors raised when parsing a [`SnippetId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnippetIdError {
    /// The raw value is not an integer.
    #[error("snippet id must be an integer")]
    NotNumeric,
    /// Identifiers start at 1.
    #[error("snippet id must be at least 1, got {0}")]
    NotPositive(i64),
}

/// Database-assigned snippet identifier (always >= 1).
///
/// # Examples
/// ```
/// use snippetbox::domain::SnippetId;
///
/// let id: SnippetId = "42".parse().expect("valid id");
/// assert_eq!(id.get(), 42);
/// assert!("0".parse::<SnippetId>().is_err());
/// assert!("abc".parse::<SnippetId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SnippetId(i64);

impl SnippetId {
    /// Validate a raw identifier.
    pub fn new(raw: i64) -> Result<Self, SnippetIdError> {
        if raw < 1 {
            return Err(SnippetIdError::NotPositive(raw));
        }
        Ok(Self(raw))
    }

    /// The raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SnippetId {
    type Err = SnippetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.parse::<i64>().map_err(|_| SnippetIdError::NotNumeric)?;
        Self::new(raw)
    }
}

/// Error returned when an expiry choice is not one of the permitted values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expiry must be one of 1, 7 or 365 days, got {0:?}")]
pub struct ExpiryDaysError(pub String);

/// Permitted snippet lifetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryDays {
    /// One day.
    OneDay,
    /// One week.
    OneWeek,
    /// One year; preselected on the create form.
    #[default]
    OneYear,
}

impl ExpiryDays {
    /// Form values accepted for the `expires` field.
    pub const PERMITTED: [&'static str; 3] = ["365", "7", "1"];

    /// Number of days the snippet stays visible.
    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::OneDay => 1,
            Self::OneWeek => 7,
            Self::OneYear => 365,
        }
    }

    /// Form value for this choice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1",
            Self::OneWeek => "7",
            Self::OneYear => "365",
        }
    }

    /// Expiry instant for a snippet created at `created`.
    #[must_use]
    pub fn expiry_from(self, created: DateTime<Utc>) -> DateTime<Utc> {
        created + TimeDelta::days(self.days())
    }
}

impl FromStr for ExpiryDays {
    type Err = ExpiryDaysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::OneDay),
            "7" => Ok(Self::OneWeek),
            "365" => Ok(Self::OneYear),
            other => Err(ExpiryDaysError(other.to_owned())),
        }
    }
}

/// A stored snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub id: SnippetId,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl Snippet {
    /// Whether the snippet is still visible at `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }
}

/// Validated input for creating a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnippet {
    pub title: String,
    pub content: String,
    pub expires: ExpiryDays,
}

impl NewSnippet {
    pub fn new(title: impl Into<String>, content: impl Into<String>, expires: ExpiryDays) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            expires,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("1", Ok(1))]
    #[case("123", Ok(123))]
    #[case("0", Err(SnippetIdError::NotPositive(0)))]
    #[case("-4", Err(SnippetIdError::NotPositive(-4)))]
    #[case("abc", Err(SnippetIdError::NotNumeric))]
    #[case("", Err(SnippetIdError::NotNumeric))]
    #[case("1.5", Err(SnippetIdError::NotNumeric))]
    fn snippet_id_parsing(#[case] raw: &str, #[case] expected: Result<i64, SnippetIdError>) {
        assert_eq!(raw.parse::<SnippetId>().map(SnippetId::get), expected);
    }

    #[rstest]
    #[case("1", ExpiryDays::OneDay)]
    #[case("7", ExpiryDays::OneWeek)]
    #[case("365", ExpiryDays::OneYear)]
    fn expiry_days_accepts_permitted_values(#[case] raw: &str, #[case] expected: ExpiryDays) {
        let parsed: ExpiryDays = raw.parse().expect("permitted value");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_str(), raw);
        assert!(ExpiryDays::PERMITTED.contains(&raw));
    }

    #[rstest]
    #[case("2")]
    #[case("367")]
    #[case(" 7")]
    fn expiry_days_rejects_other_values(#[case] raw: &str) {
        assert!(raw.parse::<ExpiryDays>().is_err());
    }

    #[test]
    fn expiry_is_computed_from_creation_time() {
        let created = Utc.with_ymd_and_hms(2024, 2, 28, 12, 0, 0).single().expect("valid");
        let expires = ExpiryDays::OneWeek.expiry_from(created);
        assert_eq!(
            expires,
            Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).single().expect("valid")
        );
    }

    #[test]
    fn snippet_is_live_strictly_before_expiry() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("valid");
        let snippet = Snippet {
            id: SnippetId::new(1).expect("valid id"),
            title: "An old silent pond".to_owned(),
            content: "A frog jumps into the pond".to_owned(),
            created,
            expires: ExpiryDays::OneDay.expiry_from(created),
        };
        assert!(snippet.is_live_at(created));
        assert!(!snippet.is_live_at(snippet.expires));
    }
}
