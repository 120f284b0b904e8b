//! Double-submit-cookie CSRF protection.
//!
//! Each browser gets a random 32-byte token in the `csrf_token` cookie.
//! Pages embed a masked copy (a fresh one-time pad followed by the token
//! XOR the pad, hex encoded) so the value differs on every render. Requests
//! with an unsafe method must echo a masked or raw copy either in the
//! `X-CSRF-Token` header or in a `csrf_token` form field; anything else is
//! answered with `400 Bad Request` before it reaches a handler.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::http::header::ContentType;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::debug;

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_FIELD: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";
const TOKEN_LEN: usize = 32;
const COOKIE_MAX_AGE_DAYS: i64 = 365;
const URLENCODED: &str = "application/x-www-form-urlencoded";

type Token = [u8; TOKEN_LEN];

/// Masked token for the current request, for embedding in forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Wrap an already-masked token.
    pub(crate) fn from_masked(masked: String) -> Self {
        Self(masked)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for CsrfToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CsrfToken>()
                .cloned()
                .ok_or_else(|| actix_web::error::ErrorInternalServerError("CSRF middleware missing")),
        )
    }
}

fn random_token() -> Token {
    let mut token = [0_u8; TOKEN_LEN];
    OsRng.fill_bytes(&mut token);
    token
}

fn decode_token(raw: &str) -> Option<Token> {
    hex::decode(raw).ok()?.try_into().ok()
}

fn mask(token: &Token) -> String {
    let pad = random_token();
    let mut out = Vec::with_capacity(TOKEN_LEN * 2);
    out.extend_from_slice(&pad);
    out.extend(pad.iter().zip(token).map(|(p, t)| p ^ t));
    hex::encode(out)
}

/// Recover the real token from a submitted masked or raw value.
fn unmask(submitted: &str) -> Option<Token> {
    let bytes = hex::decode(submitted.trim()).ok()?;
    match bytes.len() {
        TOKEN_LEN => bytes.try_into().ok(),
        len if len == TOKEN_LEN * 2 => {
            let (pad, masked) = bytes.split_at(TOKEN_LEN);
            let mut token = [0_u8; TOKEN_LEN];
            for (slot, (p, m)) in token.iter_mut().zip(pad.iter().zip(masked)) {
                *slot = p ^ m;
            }
            Some(token)
        }
        _ => None,
    }
}

fn tokens_match(expected: &Token, submitted: &Token) -> bool {
    expected
        .iter()
        .zip(submitted)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// CSRF middleware; `cookie_secure` controls the cookie's `Secure` flag.
#[derive(Clone, Copy, Debug)]
pub struct CsrfProtection {
    cookie_secure: bool,
}

impl CsrfProtection {
    pub fn new(cookie_secure: bool) -> Self {
        Self { cookie_secure }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CsrfProtection
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CsrfMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CsrfMiddleware {
            service: Rc::new(service),
            cookie_secure: self.cookie_secure,
        }))
    }
}

pub struct CsrfMiddleware<S> {
    service: Rc<S>,
    cookie_secure: bool,
}

/// Pull the submitted token from the header or, for urlencoded bodies, the
/// form field. The body is put back so handlers can still extract it.
async fn submitted_token(req: &mut ServiceRequest) -> Result<Option<String>, Error> {
    if let Some(value) = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        return Ok(Some(value.to_owned()));
    }
    if req.content_type() != URLENCODED {
        return Ok(None);
    }

    let body = req.extract::<web::Bytes>().await?;
    let token = url::form_urlencoded::parse(&body)
        .find(|(name, _)| name == CSRF_FIELD)
        .map(|(_, value)| value.into_owned());

    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(body);
    req.set_payload(payload.into());
    Ok(token)
}

fn reject<B>(req: ServiceRequest, reason: &'static str) -> ServiceResponse<EitherBody<B>> {
    debug!(reason, method = %req.method(), uri = %req.uri(), "CSRF check failed");
    let response = HttpResponse::BadRequest()
        .content_type(ContentType::plaintext())
        .body("Bad Request");
    req.into_response(response).map_into_right_body()
}

impl<S, B> Service<ServiceRequest> for CsrfMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let cookie_secure = self.cookie_secure;
        let existing = req
            .cookie(CSRF_COOKIE)
            .and_then(|cookie| decode_token(cookie.value()));

        Box::pin(async move {
            let (token, issue_cookie) = match existing {
                Some(token) => (token, false),
                None => (random_token(), true),
            };

            if !is_safe(req.method()) {
                if issue_cookie {
                    return Ok(reject(req, "missing CSRF cookie"));
                }
                let submitted = match submitted_token(&mut req).await {
                    Ok(submitted) => submitted,
                    Err(error) => return Ok(req.error_response(error).map_into_right_body()),
                };
                let verified = submitted
                    .as_deref()
                    .and_then(unmask)
                    .is_some_and(|candidate| tokens_match(&token, &candidate));
                if !verified {
                    return Ok(reject(req, "CSRF token missing or mismatched"));
                }
            }

            req.extensions_mut().insert(CsrfToken::from_masked(mask(&token)));
            let mut res = service.call(req).await?;
            if issue_cookie {
                let cookie = Cookie::build(CSRF_COOKIE, hex::encode(token))
                    .path("/")
                    .http_only(true)
                    .secure(cookie_secure)
                    .same_site(SameSite::Lax)
                    .max_age(CookieDuration::days(COOKIE_MAX_AGE_DAYS))
                    .finish();
                res.response_mut().add_cookie(&cookie)?;
            }
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    async fn echo_form(form: web::Form<Vec<(String, String)>>) -> HttpResponse {
        let title = form
            .iter()
            .find(|(name, _)| name == "title")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        HttpResponse::Ok().body(title)
    }

    async fn show_token(token: CsrfToken) -> HttpResponse {
        HttpResponse::Ok().body(token.as_str().to_owned())
    }

    macro_rules! csrf_app {
        () => {
            actix_test::init_service(
                App::new()
                    .wrap(CsrfProtection::new(false))
                    .route("/form", web::get().to(show_token))
                    .route("/form", web::post().to(echo_form)),
            )
            .await
        };
    }

    #[rstest]
    fn masked_tokens_differ_but_unmask_to_the_same_value() {
        let token = random_token();
        let first = mask(&token);
        let second = mask(&token);

        assert_ne!(first, second);
        assert_eq!(unmask(&first), Some(token));
        assert_eq!(unmask(&second), Some(token));
    }

    #[rstest]
    #[case::not_hex("zz")]
    #[case::wrong_length("abcd")]
    fn malformed_submissions_do_not_unmask(#[case] raw: &str) {
        assert_eq!(unmask(raw), None);
    }

    #[actix_web::test]
    async fn get_issues_cookie_and_exposes_masked_token() {
        let app = csrf_app!();
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/form").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == CSRF_COOKIE)
            .expect("csrf cookie issued");
        assert!(cookie.http_only().unwrap_or(false));
        let cookie_token = decode_token(cookie.value()).expect("cookie holds a token");

        let body = actix_test::read_body(res).await;
        let masked = std::str::from_utf8(&body).expect("utf8");
        assert_eq!(unmask(masked), Some(cookie_token));
    }

    #[actix_web::test]
    async fn post_with_matching_form_field_reaches_handler_with_body_intact() {
        let app = csrf_app!();
        let token = random_token();
        let payload = format!("title=Hello&{CSRF_FIELD}={}", mask(&token));

        let req = actix_test::TestRequest::post()
            .uri("/form")
            .cookie(Cookie::new(CSRF_COOKIE, hex::encode(token)))
            .insert_header(ContentType::form_url_encoded())
            .set_payload(payload)
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        assert_eq!(body, "Hello");
    }

    #[actix_web::test]
    async fn post_with_header_token_is_accepted() {
        let app = csrf_app!();
        let token = random_token();

        let req = actix_test::TestRequest::post()
            .uri("/form")
            .cookie(Cookie::new(CSRF_COOKIE, hex::encode(token)))
            .insert_header((CSRF_HEADER, mask(&token)))
            .insert_header(ContentType::form_url_encoded())
            .set_payload("title=Hi")
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn post_without_cookie_is_rejected() {
        let app = csrf_app!();
        let req = actix_test::TestRequest::post()
            .uri("/form")
            .insert_header(ContentType::form_url_encoded())
            .set_payload(format!("title=x&{CSRF_FIELD}={}", mask(&random_token())))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn post_with_foreign_token_is_rejected() {
        let app = csrf_app!();
        let req = actix_test::TestRequest::post()
            .uri("/form")
            .cookie(Cookie::new(CSRF_COOKIE, hex::encode(random_token())))
            .insert_header(ContentType::form_url_encoded())
            .set_payload(format!("title=x&{CSRF_FIELD}={}", mask(&random_token())))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn post_without_token_is_rejected() {
        let app = csrf_app!();
        let req = actix_test::TestRequest::post()
            .uri("/form")
            .cookie(Cookie::new(CSRF_COOKIE, hex::encode(random_token())))
            .insert_header(ContentType::form_url_encoded())
            .set_payload("title=x")
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
