//! Login credentials.
//!
//! Inbound adapters validate form input, then build [`LoginCredentials`]
//! before handing them to a [`LoginService`](crate::domain::ports::LoginService).

use std::fmt;

use thiserror::Error;
use zeroize::Zeroizing;

/// Error returned when login input is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Email and password pair submitted on the login form.
///
/// ## Invariants
/// - `email` is trimmed and non-empty.
/// - `password` is non-empty and kept verbatim, whitespace included.
///
/// # Examples
/// ```
/// use snippetbox::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice@example.com ", "pa55word!")
///     .expect("valid credentials");
/// assert_eq!(creds.email(), "alice@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Build credentials from raw form values.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
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

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("alice@example.com", "", LoginValidationError::EmptyPassword)]
    fn incomplete_credentials_are_rejected(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  alice@example.com  ", "secret")]
    #[case("bob@example.com", "  padded password  ")]
    fn email_is_trimmed_but_password_is_not(#[case] email: &str, #[case] password: &str) {
        let creds =
            LoginCredentials::try_from_parts(email, password).expect("valid inputs succeed");
        assert_eq!(creds.email(), email.trim());
        assert_eq!(creds.password(), password);
    }

    #[test]
    fn debug_output_omits_password() {
        let creds = LoginCredentials::try_from_parts("a@b.c", "topsecret").expect("valid");
        assert!(!format!("{creds:?}").contains("topsecret"));
    }
}
