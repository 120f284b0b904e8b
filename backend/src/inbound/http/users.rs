//! Account pages.
//!
//! ```text
//! GET  /user/signup   registration form
//! POST /user/signup   register, then redirect to login
//! GET  /user/login    login form
//! POST /user/login    authenticate, then redirect to the create form
//! POST /user/logout   end the session (login required)
//! ```

use actix_web::{HttpResponse, get, post, web};
use tracing::info;

use crate::domain::{Error, ErrorCode, LoginCredentials, NewUser};
use crate::middleware::{CsrfToken, CurrentUser, RequireAuthentication};

use super::HttpResult;
use super::render::{render_page, see_other};
use super::session::SessionContext;
use super::state::HttpState;
use super::templates::{Page, TemplateData};
use super::validation::Form;

pub const SIGNUP_FLASH: &str = "Your signup was successful. Please log in.";
pub const LOGOUT_FLASH: &str = "You've been logged out successfully!";
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Address is already in use";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Email or Password is incorrect";

const NAME_MAX_CHARS: usize = 255;
const EMAIL_MAX_CHARS: usize = 255;
const PASSWORD_MIN_CHARS: usize = 10;

/// Form key for errors that belong to no single field.
const GENERIC_ERROR_KEY: &str = "generic";

#[get("/user/signup")]
pub async fn signup_form(
    state: web::Data<HttpState>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    session: SessionContext,
) -> HttpResult<HttpResponse> {
    render_page(
        &state,
        &session,
        viewer.as_ref(),
        &csrf,
        Page::Signup,
        TemplateData::default(),
    )
}

/// Register an account.
///
/// A duplicate email re-renders the form with a message on the `email`
/// field; success flashes a prompt to log in.
#[post("/user/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    session: SessionContext,
    payload: web::Form<Vec<(String, String)>>,
) -> HttpResult<HttpResponse> {
    let mut form = Form::new(payload.into_inner());
    form.required(&["name", "email", "password"]);
    form.max_length("name", NAME_MAX_CHARS);
    form.max_length("email", EMAIL_MAX_CHARS);
    form.matches_pattern("email", state.email_pattern.regex());
    form.min_length("password", PASSWORD_MIN_CHARS);

    if form.valid() {
        let user = NewUser::new(form.get("name"), form.get("email"), form.get("password"));
        match state.registration.register(user).await {
            Ok(user_id) => {
                info!(%user_id, "account registered");
                session.put_flash(SIGNUP_FLASH)?;
                return Ok(see_other("/user/login"));
            }
            Err(error) if error.code() == ErrorCode::Conflict => {
                form.add_error("email", DUPLICATE_EMAIL_MESSAGE);
            }
            Err(error) => return Err(error),
        }
    }

    render_page(
        &state,
        &session,
        viewer.as_ref(),
        &csrf,
        Page::Signup,
        TemplateData::with_form(form.view()),
    )
}

#[get("/user/login")]
pub async fn login_form(
    state: web::Data<HttpState>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    session: SessionContext,
) -> HttpResult<HttpResponse> {
    render_page(
        &state,
        &session,
        viewer.as_ref(),
        &csrf,
        Page::Login,
        TemplateData::default(),
    )
}

/// Authenticate and start a session.
///
/// Unknown emails and wrong passwords get the same generic message. On
/// success the session is renewed before the user id is stored.
#[post("/user/login")]
pub async fn login(
    state: web::Data<HttpState>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    session: SessionContext,
    payload: web::Form<Vec<(String, String)>>,
) -> HttpResult<HttpResponse> {
    let mut form = Form::new(payload.into_inner());
    form.required(&["email", "password"]);
    form.matches_pattern("email", state.email_pattern.regex());

    if form.valid() {
        let credentials = LoginCredentials::try_from_parts(form.get("email"), form.get("password"))
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        match state.login.authenticate(&credentials).await {
            Ok(user_id) => {
                session.renew();
                session.persist_user(user_id)?;
                info!(%user_id, "user logged in");
                return Ok(see_other("/snippet/create"));
            }
            Err(error) if error.code() == ErrorCode::Unauthorized => {
                form.add_error(GENERIC_ERROR_KEY, INVALID_CREDENTIALS_MESSAGE);
            }
            Err(error) => return Err(error),
        }
    }

    render_page(
        &state,
        &session,
        viewer.as_ref(),
        &csrf,
        Page::Login,
        TemplateData::with_form(form.view()),
    )
}

#[post("/user/logout", wrap = "RequireAuthentication")]
pub async fn logout(session: SessionContext) -> HttpResult<HttpResponse> {
    session.renew();
    session.forget_user();
    session.put_flash(LOGOUT_FLASH)?;
    Ok(see_other("/"))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
