//! Domain primitives, services and ports.
//!
//! Purpose: hold the snippet and account rules independently of HTTP and
//! SQL. Inbound adapters call the driving ports in [`ports`]; outbound
//! adapters implement the driven ones.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure type.
//! - Snippet, SnippetId, ExpiryDays, NewSnippet: snippet model.
//! - User, UserId, NewUser, LoginCredentials: account model.
//! - SnippetService, AccountService: port implementations.
//! - CredentialHasher: Argon2id password hashing.
//! - TraceId: request correlation identifier.

mod account_service;
mod auth;
pub mod error;
mod password;
pub mod ports;
mod snippet;
mod snippet_service;
mod trace_id;
mod user;

pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::password::{CredentialHasher, PasswordHashError};
pub use self::snippet::{
    ExpiryDays, ExpiryDaysError, LATEST_SNIPPETS_LIMIT, NewSnippet, Snippet, SnippetId,
    SnippetIdError, TITLE_MAX_CHARS,
};
pub use self::snippet_service::SnippetService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{NewUser, User, UserId};
