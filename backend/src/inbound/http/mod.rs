//! HTTP inbound adapter serving the HTML pages.

use actix_web::web;

pub mod error;
pub mod render;
pub mod session;
pub mod session_config;
pub mod snippets;
pub mod state;
pub mod templates;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::HttpResult;

/// Register every page handler.
///
/// `/snippet/create` is registered ahead of `/snippet/{id}` so the literal
/// path wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(snippets::home)
        .service(snippets::create_snippet_form)
        .service(snippets::create_snippet)
        .service(snippets::show_snippet)
        .service(users::signup_form)
        .service(users::signup)
        .service(users::login_form)
        .service(users::login)
        .service(users::logout);
}
