//! Submitted-form wrapper with composable field rules.
//!
//! A [`Form`] holds the first submitted value per field and accumulates
//! field-keyed error messages. Rules never clear earlier errors; handlers run
//! the rules they need and then check [`Form::valid`].
//!
//! ```
//! use snippetbox::inbound::http::validation::Form;
//!
//! let mut form = Form::new([("title".to_owned(), "  ".to_owned())]);
//! form.required(&["title", "content"]);
//! assert!(!form.valid());
//! assert_eq!(form.errors_for("content"), ["This field cannot be blank"]);
//! ```

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;

pub const BLANK_MESSAGE: &str = "This field cannot be blank";
pub const NOT_PERMITTED_MESSAGE: &str = "The field is invalid";
pub const PATTERN_MESSAGE: &str = "This is invalid";

/// Pattern accepted for email addresses.
const EMAIL_PATTERN: &str =
    r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$";

/// Compiled email address pattern, built once at startup.
#[derive(Debug, Clone)]
pub struct EmailPattern(Regex);

impl EmailPattern {
    /// # Errors
    ///
    /// Returns the regex compile error; the pattern is constant so this only
    /// fails if the regex engine rejects it.
    pub fn new() -> Result<Self, regex::Error> {
        Regex::new(EMAIL_PATTERN).map(Self)
    }

    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

/// Form values plus accumulated validation errors.
#[derive(Debug, Clone, Default)]
pub struct Form {
    values: BTreeMap<String, String>,
    errors: BTreeMap<String, Vec<String>>,
}

impl Form {
    /// Build from decoded `application/x-www-form-urlencoded` pairs. When a
    /// field repeats, the first value wins.
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut values = BTreeMap::new();
        for (field, value) in pairs {
            values.entry(field).or_insert(value);
        }
        Self {
            values,
            errors: BTreeMap::new(),
        }
    }

    /// Submitted value, or `""` when the field was absent.
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    /// Record an error against `field`.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Flag every field whose trimmed value is empty.
    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.get(field).trim().is_empty() {
                self.add_error(field, BLANK_MESSAGE);
            }
        }
    }

    /// Flag a non-empty value longer than `max` characters.
    pub fn max_length(&mut self, field: &str, max: usize) {
        let value = self.get(field);
        if !value.is_empty() && value.chars().count() > max {
            self.add_error(
                field,
                format!("This field is too long (maximum is {max} characters)"),
            );
        }
    }

    /// Flag a non-empty value shorter than `min` characters.
    pub fn min_length(&mut self, field: &str, min: usize) {
        let value = self.get(field);
        if !value.is_empty() && value.chars().count() < min {
            self.add_error(
                field,
                format!("This field is too short (minimum is {min} characters)"),
            );
        }
    }

    /// Flag a non-empty value outside `permitted`.
    pub fn permitted_values(&mut self, field: &str, permitted: &[&str]) {
        let value = self.get(field);
        if !value.is_empty() && !permitted.contains(&value) {
            self.add_error(field, NOT_PERMITTED_MESSAGE);
        }
    }

    /// Flag a non-empty value that does not match `pattern`.
    pub fn matches_pattern(&mut self, field: &str, pattern: &Regex) {
        let value = self.get(field);
        if !value.is_empty() && !pattern.is_match(value) {
            self.add_error(field, PATTERN_MESSAGE);
        }
    }

    /// True when no rule has recorded an error.
    pub fn valid(&self) -> bool {
        self.errors.values().all(Vec::is_empty)
    }

    /// Errors recorded for `field`, in rule order.
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[][..], Vec::as_slice)
    }

    /// Template-facing snapshot: values and the first error per field.
    pub fn view(&self) -> FormView {
        FormView {
            values: self.values.clone(),
            errors: self
                .errors
                .iter()
                .filter_map(|(field, messages)| {
                    messages.first().map(|first| (field.clone(), first.clone()))
                })
                .collect(),
        }
    }
}

/// What templates see of a [`Form`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormView {
    pub values: BTreeMap<String, String>,
    pub errors: BTreeMap<String, String>,
}
