//! Request middleware.
//!
//! Purpose: cross-cutting request concerns. From the outside in, every
//! request passes request logging, panic recovery, security headers, CSRF
//! verification, the cookie session and session authentication; the login
//! gate wraps individual routes.

pub mod authenticate;
pub mod csrf;
pub mod recover;
pub mod security_headers;
pub mod trace;

pub use authenticate::{AuthenticatedUser, Authenticate, CurrentUser, RequireAuthentication};
pub use csrf::{CsrfProtection, CsrfToken};
pub use recover::RecoverPanic;
pub use security_headers::security_headers;
pub use trace::Trace;
