//! Snippet pages.
//!
//! ```text
//! GET  /                 latest snippets
//! GET  /snippet/create   creation form (login required)
//! POST /snippet/create   submit a snippet (login required)
//! GET  /snippet/{id}     one snippet
//! ```

use actix_web::{HttpResponse, get, post, web};
use tracing::info;

use crate::domain::{Error, ExpiryDays, NewSnippet, SnippetId, TITLE_MAX_CHARS};
use crate::middleware::{AuthenticatedUser, CsrfToken, CurrentUser, RequireAuthentication};

use super::HttpResult;
use super::render::{render_page, see_other};
use super::session::SessionContext;
use super::state::HttpState;
use super::templates::{Page, TemplateData};
use super::validation::Form;

pub const CREATED_FLASH: &str = "Snippet successfully created!";

/// Home page listing the latest live snippets.
#[get("/")]
pub async fn home(
    state: web::Data<HttpState>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    session: SessionContext,
) -> HttpResult<HttpResponse> {
    let snippets = state.snippets_query.latest().await?;
    render_page(
        &state,
        &session,
        viewer.as_ref(),
        &csrf,
        Page::Home,
        TemplateData::with_snippets(snippets),
    )
}

/// Show one snippet. Malformed, unknown and expired ids are all `404`.
#[get("/snippet/{id}")]
pub async fn show_snippet(
    state: web::Data<HttpState>,
    CurrentUser(viewer): CurrentUser,
    csrf: CsrfToken,
    session: SessionContext,
    path: web::Path<String>,
) -> HttpResult<HttpResponse> {
    let raw = path.into_inner();
    let id: SnippetId = raw
        .parse()
        .map_err(|_| Error::not_found(format!("no snippet with id {raw:?}")))?;
    let snippet = state.snippets_query.get(id).await?;
    render_page(
        &state,
        &session,
        viewer.as_ref(),
        &csrf,
        Page::ShowSnippet,
        TemplateData::with_snippet(snippet),
    )
}

#[get("/snippet/create", wrap = "RequireAuthentication")]
pub async fn create_snippet_form(
    state: web::Data<HttpState>,
    AuthenticatedUser(viewer): AuthenticatedUser,
    csrf: CsrfToken,
    session: SessionContext,
) -> HttpResult<HttpResponse> {
    render_page(
        &state,
        &session,
        Some(&viewer),
        &csrf,
        Page::CreateSnippet,
        TemplateData::default(),
    )
}

/// Validate and store a snippet, then redirect to it.
///
/// Invalid input re-renders the form with the submitted values and the
/// first error per field.
#[post("/snippet/create", wrap = "RequireAuthentication")]
pub async fn create_snippet(
    state: web::Data<HttpState>,
    AuthenticatedUser(viewer): AuthenticatedUser,
    csrf: CsrfToken,
    session: SessionContext,
    payload: web::Form<Vec<(String, String)>>,
) -> HttpResult<HttpResponse> {
    let mut form = Form::new(payload.into_inner());
    form.required(&["title", "content", "expires"]);
    form.max_length("title", TITLE_MAX_CHARS);
    form.permitted_values("expires", &ExpiryDays::PERMITTED);

    if !form.valid() {
        return render_page(
            &state,
            &session,
            Some(&viewer),
            &csrf,
            Page::CreateSnippet,
            TemplateData::with_form(form.view()),
        );
    }

    let expires = form
        .get("expires")
        .parse::<ExpiryDays>()
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let id = state
        .snippets
        .create(NewSnippet::new(form.get("title"), form.get("content"), expires))
        .await?;
    info!(snippet_id = %id, author = %viewer.id(), "snippet created");

    session.put_flash(CREATED_FLASH)?;
    Ok(see_other(&format!("/snippet/{id}")))
}
