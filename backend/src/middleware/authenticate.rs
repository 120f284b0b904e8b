//! Session authentication.
//!
//! [`Authenticate`] runs on every request inside the session middleware. It
//! resolves the session's user id claim to a [`User`] and stores it in the
//! request extensions; handlers read it back through [`CurrentUser`] or
//! [`AuthenticatedUser`]. [`RequireAuthentication`] wraps the routes that
//! need a signed-in user and redirects everyone else to the login page.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{Error, ErrorCode, User};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Where anonymous visitors to gated routes are sent.
pub const LOGIN_PATH: &str = "/user/login";

/// The signed-in user for this request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| Error::unauthorized("login required").into()),
        )
    }
}

/// The signed-in user, or `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<AuthenticatedUser>()
            .map(|AuthenticatedUser(user)| user.clone());
        ready(Ok(Self(user)))
    }
}

/// Resolve the session user and attach it to the request.
///
/// A claim naming a user that no longer exists is dropped and the request
/// continues anonymously. Any other lookup failure fails the request.
#[derive(Clone, Copy, Debug, Default)]
pub struct Authenticate;

impl<S, B> Transform<S, ServiceRequest> for Authenticate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthenticateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticateMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthenticateMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthenticateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let session = SessionContext::new(req.get_session());
            if let Some(user_id) = session.user_id() {
                let Some(state) = req.app_data::<web::Data<HttpState>>().cloned() else {
                    let error = Error::internal("HTTP state not registered");
                    return Ok(req.error_response(error).map_into_right_body());
                };
                match state.profile.fetch_profile(user_id).await {
                    Ok(user) => {
                        req.extensions_mut().insert(AuthenticatedUser(user));
                    }
                    Err(error) if error.code() == ErrorCode::NotFound => {
                        debug!(%user_id, "session names an unknown user; continuing anonymously");
                        session.forget_user();
                    }
                    Err(error) => return Ok(req.error_response(error).map_into_right_body()),
                }
            }
            service.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}

/// Gate for routes that need a signed-in user.
///
/// Anonymous requests get `303 See Other` to [`LOGIN_PATH`] without reaching
/// the handler. Responses that do pass are marked `Cache-Control: no-store`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequireAuthentication;

impl<S, B> Transform<S, ServiceRequest> for RequireAuthentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequireAuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthenticationMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireAuthenticationMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let signed_in = req.extensions().contains::<AuthenticatedUser>();
            if !signed_in {
                debug!(uri = %req.uri(), "redirecting anonymous request to login");
                let response = HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, LOGIN_PATH))
                    .finish();
                return Ok(req.into_response(response).map_into_right_body());
            }

            let mut res = service.call(req).await?;
            res.headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            Ok(res.map_into_left_body())
        })
    }
}
