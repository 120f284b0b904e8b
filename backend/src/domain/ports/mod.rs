//! Domain ports defining the edges of the hexagon.
//!
//! Driving ports (`SnippetCommand`, `SnippetQuery`, `UserRegistration`,
//! `LoginService`, `UserProfileQuery`) are called by inbound adapters. Driven
//! ports (`SnippetRepository`, `UserRepository`) are implemented by outbound
//! adapters and expose typed errors instead of framework errors.

mod macros;
mod login_service;
mod snippet_command;
mod snippet_query;
mod snippet_repository;
mod user_profile_query;
mod user_registration;
mod user_repository;

pub(crate) use macros::define_port_error;

pub use login_service::LoginService;
pub use snippet_command::SnippetCommand;
pub use snippet_query::SnippetQuery;
pub use snippet_repository::{NewSnippetRecord, SnippetRepository, SnippetRepositoryError};
pub use user_profile_query::UserProfileQuery;
pub use user_registration::UserRegistration;
pub use user_repository::{NewUserRecord, StoredCredentials, UserRepository, UserRepositoryError};

#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use snippet_command::MockSnippetCommand;
#[cfg(test)]
pub use snippet_query::MockSnippetQuery;
#[cfg(test)]
pub use snippet_repository::MockSnippetRepository;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
#[cfg(test)]
pub use user_registration::MockUserRegistration;
#[cfg(test)]
pub use user_repository::MockUserRepository;
