//! Panic recovery.
//!
//! A panicking handler would otherwise take down its worker. [`RecoverPanic`]
//! catches the unwind, logs the payload and fails the request with a `500`
//! that closes the connection and still carries the security headers.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::http::{Method, Uri, header::ContentType};
use actix_web::{Error, HttpResponse};
use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::error;

use super::security_headers::{FRAME_OPTIONS, XSS_PROTECTION};
use crate::domain::TraceId;

/// Panic-catching middleware. Wrap it inside [`super::Trace`] so the log
/// line carries the trace id.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecoverPanic;

impl<S, B> Transform<S, ServiceRequest> for RecoverPanic
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RecoverPanicMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RecoverPanicMiddleware { service }))
    }
}

pub struct RecoverPanicMiddleware<S> {
    service: S,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Log the panic and build the error the server answers with.
///
/// The request itself has moved into the inner service, so only its method
/// and URI survive for logging.
fn recovered(method: &Method, uri: &Uri, payload: &(dyn Any + Send)) -> Error {
    error!(
        trace_id = ?TraceId::current().map(|id| id.to_string()),
        %method,
        %uri,
        panic = panic_message(payload),
        "handler panicked"
    );
    let response = HttpResponse::InternalServerError()
        .force_close()
        .insert_header(XSS_PROTECTION)
        .insert_header(FRAME_OPTIONS)
        .content_type(ContentType::plaintext())
        .body("Internal Server Error");
    InternalError::from_response("handler panicked", response).into()
}

impl<S, B> Service<ServiceRequest> for RecoverPanicMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let fut = match std::panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req))) {
            Ok(fut) => fut,
            Err(payload) => {
                let error = recovered(&method, &uri, payload.as_ref());
                return Box::pin(async move { Err(error) });
            }
        };

        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(recovered(&method, &uri, payload.as_ref())),
            }
        })
    }
}
