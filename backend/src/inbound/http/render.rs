//! Page rendering and redirect helpers shared by the HTML handlers.

use actix_web::HttpResponse;
use actix_web::http::header::{self, ContentType};
use chrono::Datelike;

use crate::domain::User;
use crate::middleware::CsrfToken;

use super::HttpResult;
use super::session::SessionContext;
use super::state::HttpState;
use super::templates::{Page, TemplateData};

/// Fill the request-wide template fields and render `page` as a `200 OK`.
///
/// `viewer` is the signed-in user, if any. The pending flash message is
/// consumed here, so it shows exactly once.
pub fn render_page(
    state: &HttpState,
    session: &SessionContext,
    viewer: Option<&User>,
    csrf: &CsrfToken,
    page: Page,
    mut data: TemplateData,
) -> HttpResult<HttpResponse> {
    data.current_year = state.clock.utc().year();
    data.flash = session.take_flash();
    data.csrf_token = csrf.as_str().to_owned();
    if let Some(user) = viewer {
        data.is_authenticated = true;
        data.user_name = Some(user.name().to_owned());
    }

    let html = state.templates.render(page, &data)?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html))
}

/// `303 See Other` to `location`.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
