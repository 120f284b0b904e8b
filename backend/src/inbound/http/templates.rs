//! Pre-parsed HTML templates.
//!
//! Every page template, the shared layout and the partials are compiled into
//! the binary and parsed once when the [`TemplateCache`] is built. Rendering
//! afterwards only reads the cache, so it can be shared across workers.

use chrono::{DateTime, Utc};
use minijinja::{Environment, ErrorKind};
use serde::Serialize;

use crate::domain::{Error, Snippet};

use super::validation::FormView;

/// Templates keyed by name, with their sources.
const SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../ui/html/base.html")),
    (
        "partials/nav.html",
        include_str!("../../../ui/html/partials/nav.html"),
    ),
    (
        "partials/footer.html",
        include_str!("../../../ui/html/partials/footer.html"),
    ),
    ("home.html", include_str!("../../../ui/html/home.html")),
    ("show.html", include_str!("../../../ui/html/show.html")),
    ("create.html", include_str!("../../../ui/html/create.html")),
    ("signup.html", include_str!("../../../ui/html/signup.html")),
    ("login.html", include_str!("../../../ui/html/login.html")),
];

/// The renderable pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    ShowSnippet,
    CreateSnippet,
    Signup,
    Login,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::ShowSnippet,
        Page::CreateSnippet,
        Page::Signup,
        Page::Login,
    ];

    pub fn template_name(self) -> &'static str {
        match self {
            Page::Home => "home.html",
            Page::ShowSnippet => "show.html",
            Page::CreateSnippet => "create.html",
            Page::Signup => "signup.html",
            Page::Login => "login.html",
        }
    }
}

/// Failure parsing the embedded templates.
#[derive(Debug, thiserror::Error)]
#[error("failed to load template {name}: {source}")]
pub struct TemplateError {
    name: &'static str,
    #[source]
    source: minijinja::Error,
}

/// Everything a page template can read.
///
/// Handlers fill the page-specific fields; the request-wide ones
/// (`current_year`, `flash`, `is_authenticated`, `user_name`, `csrf_token`)
/// are set by `render::render_page`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub user_name: Option<String>,
    pub csrf_token: String,
    pub form: FormView,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
}

impl TemplateData {
    pub fn with_form(form: FormView) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn with_snippet(snippet: Snippet) -> Self {
        Self {
            snippet: Some(snippet),
            ..Self::default()
        }
    }

    pub fn with_snippets(snippets: Vec<Snippet>) -> Self {
        Self {
            snippets,
            ..Self::default()
        }
    }
}

/// Format an RFC 3339 timestamp as `02 Jan 2006 at 15:04` in UTC.
fn human_date(value: String) -> Result<String, minijinja::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|parsed| {
            parsed
                .with_timezone(&Utc)
                .format("%d %b %Y at %H:%M")
                .to_string()
        })
        .map_err(|err| {
            minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("human_date expects an RFC 3339 timestamp: {err}"),
            )
        })
}

/// Name-keyed cache of parsed templates.
pub struct TemplateCache {
    env: Environment<'static>,
}

impl TemplateCache {
    /// Parse every embedded template.
    ///
    /// # Errors
    ///
    /// [`TemplateError`] naming the first template that fails to parse or
    /// a page that cannot be resolved.
    pub fn new() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.add_filter("human_date", human_date);
        for &(name, text) in SOURCES {
            env.add_template(name, text)
                .map_err(|source| TemplateError { name, source })?;
        }
        for page in Page::ALL {
            let name = page.template_name();
            env.get_template(name)
                .map_err(|source| TemplateError { name, source })?;
        }
        Ok(Self { env })
    }

    /// Render `page` with `data`.
    ///
    /// # Errors
    ///
    /// An internal [`Error`] when rendering fails at runtime, e.g. a filter
    /// rejecting its input.
    pub fn render(&self, page: Page, data: &TemplateData) -> Result<String, Error> {
        let name = page.template_name();
        self.env
            .get_template(name)
            .and_then(|template| template.render(data))
            .map_err(|err| Error::internal(format!("render {name}: {err:#}")))
    }
}
