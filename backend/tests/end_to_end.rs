//! End-to-end browser flows through the full middleware chain.
//!
//! The app runs over in-memory repositories with CSRF protection, the
//! cookie session and the login gate all active. A small cookie jar carries
//! cookies between requests the way a browser would.

use std::collections::HashMap;
use std::path::PathBuf;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{test, web};

use snippetbox::server::{AppDependencies, build_app};
use snippetbox::test_support::{MemoryHarness, memory_harness};

struct Page {
    status: StatusCode,
    location: Option<String>,
    headers: header::HeaderMap,
    body: String,
}

impl Page {
    /// The masked CSRF token embedded in the page's forms.
    fn csrf_token(&self) -> String {
        const MARKER: &str = r#"name="csrf_token" value=""#;
        let start = self.body.find(MARKER).expect("page has a CSRF field") + MARKER.len();
        let rest = self.body.get(start..).expect("token follows marker");
        let end = rest.find('"').expect("token is quoted");
        rest.get(..end).expect("token slice").to_owned()
    }
}

#[derive(Default)]
struct Browser {
    jar: HashMap<String, Cookie<'static>>,
}

impl Browser {
    async fn send<S, B>(&mut self, app: &S, request: test::TestRequest) -> Page
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let request = self
            .jar
            .values()
            .fold(request, |request, cookie| request.cookie(cookie.clone()));
        let res = test::call_service(app, request.to_request()).await;

        for cookie in res.response().cookies() {
            if cookie.value().is_empty() {
                self.jar.remove(cookie.name());
            } else {
                self.jar
                    .insert(cookie.name().to_owned(), cookie.into_owned());
            }
        }
        let status = res.status();
        let headers = res.headers().clone();
        let location = headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
        Page {
            status,
            location,
            headers,
            body,
        }
    }

    async fn get<S, B>(&mut self, app: &S, uri: &str) -> Page
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        self.send(app, test::TestRequest::get().uri(uri)).await
    }

    /// Load `form_page`, then submit `fields` plus its CSRF token to `action`.
    async fn submit<S, B>(
        &mut self,
        app: &S,
        form_page: &str,
        action: &str,
        fields: &[(&str, &str)],
    ) -> Page
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let page = self.get(app, form_page).await;
        assert_eq!(page.status, StatusCode::OK, "{form_page} renders");
        let token = page.csrf_token();
        let mut form: Vec<(&str, &str)> = fields.to_vec();
        form.push(("csrf_token", token.as_str()));
        self.send(app, test::TestRequest::post().uri(action).set_form(&form))
            .await
    }
}

fn dependencies(harness: &MemoryHarness) -> AppDependencies {
    AppDependencies {
        http_state: web::Data::new(harness.state.clone()),
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("ui/static"),
        session_lifetime_hours: 12,
    }
}

const ALICE: [(&str, &str); 3] = [
    ("name", "Alice"),
    ("email", "alice@example.com"),
    ("password", "pa55word!!"),
];

#[actix_web::test]
async fn signup_login_and_create_a_snippet() {
    let harness = memory_harness();
    let app = test::init_service(build_app(dependencies(&harness))).await;
    let mut browser = Browser::default();

    let signup = browser
        .submit(&app, "/user/signup", "/user/signup", &ALICE)
        .await;
    assert_eq!(signup.status, StatusCode::SEE_OTHER);
    assert_eq!(signup.location.as_deref(), Some("/user/login"));
    assert_eq!(harness.users.len(), 1);

    let anonymous_create = browser
        .submit(
            &app,
            "/user/login",
            "/snippet/create",
            &[("title", "sneaky"), ("content", "no"), ("expires", "7")],
        )
        .await;
    assert_eq!(anonymous_create.status, StatusCode::SEE_OTHER);
    assert_eq!(anonymous_create.location.as_deref(), Some("/user/login"));
    assert!(harness.snippets.is_empty());

    let login = browser
        .submit(
            &app,
            "/user/login",
            "/user/login",
            &[("email", "alice@example.com"), ("password", "pa55word!!")],
        )
        .await;
    assert_eq!(login.status, StatusCode::SEE_OTHER);
    assert_eq!(login.location.as_deref(), Some("/snippet/create"));

    let created = browser
        .submit(
            &app,
            "/snippet/create",
            "/snippet/create",
            &[
                ("title", "O snail"),
                ("content", "Climb Mount Fuji,\nBut slowly, slowly!"),
                ("expires", "7"),
            ],
        )
        .await;
    assert_eq!(created.status, StatusCode::SEE_OTHER);
    assert_eq!(created.location.as_deref(), Some("/snippet/1"));
    assert_eq!(harness.snippets.len(), 1);

    let shown = browser.get(&app, "/snippet/1").await;
    assert_eq!(shown.status, StatusCode::OK);
    assert!(shown.body.contains("O snail"));
    assert!(shown.body.contains("Snippet successfully created!"));

    let home = browser.get(&app, "/").await;
    assert!(home.body.contains(r#"href="/snippet/1""#));
}

#[actix_web::test]
async fn login_with_wrong_password_stays_on_the_form() {
    let harness = memory_harness();
    let app = test::init_service(build_app(dependencies(&harness))).await;
    let mut browser = Browser::default();

    browser
        .submit(&app, "/user/signup", "/user/signup", &ALICE)
        .await;
    let login = browser
        .submit(
            &app,
            "/user/login",
            "/user/login",
            &[("email", "alice@example.com"), ("password", "not-the-password")],
        )
        .await;

    assert_eq!(login.status, StatusCode::OK);
    assert!(login.body.contains("Email or Password is incorrect"));

    let gated = browser.get(&app, "/snippet/create").await;
    assert_eq!(gated.status, StatusCode::SEE_OTHER);
    assert_eq!(gated.location.as_deref(), Some("/user/login"));
}

#[actix_web::test]
async fn posts_without_a_csrf_token_are_rejected() {
    let harness = memory_harness();
    let app = test::init_service(build_app(dependencies(&harness))).await;
    let mut browser = Browser::default();

    browser.get(&app, "/user/signup").await;
    let res = browser
        .send(
            &app,
            test::TestRequest::post().uri("/user/signup").set_form(ALICE),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(harness.users.is_empty());
}

#[actix_web::test]
async fn every_response_carries_security_headers() {
    let harness = memory_harness();
    let app = test::init_service(build_app(dependencies(&harness))).await;
    let mut browser = Browser::default();

    for uri in ["/", "/no/such/page", "/snippet/999"] {
        let page = browser.get(&app, uri).await;
        assert_eq!(
            page.headers
                .get("x-frame-options")
                .and_then(|value| value.to_str().ok()),
            Some("deny"),
            "{uri}"
        );
        assert!(page.headers.contains_key("x-xss-protection"), "{uri}");
    }
}

#[actix_web::test]
async fn unknown_routes_and_missing_snippets_are_404() {
    let harness = memory_harness();
    let app = test::init_service(build_app(dependencies(&harness))).await;
    let mut browser = Browser::default();

    let unknown = browser.get(&app, "/no/such/page").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body, "Not Found");

    let missing = browser.get(&app, "/snippet/999").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn static_assets_are_served() {
    let harness = memory_harness();
    let app = test::init_service(build_app(dependencies(&harness))).await;
    let mut browser = Browser::default();

    let css = browser.get(&app, "/static/css/main.css").await;
    assert_eq!(css.status, StatusCode::OK);
}
