//! Typed access to the cookie session.
//!
//! Handlers and middleware use [`SessionContext`] instead of raw keys: it
//! stores the authenticated user id and the read-once flash message.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "authenticated_user_id";
pub(crate) const FLASH_KEY: &str = "flash";

/// Wrapper exposing the session operations the app needs.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record `user_id` as the authenticated user.
    pub fn persist_user(&self, user_id: UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.get())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The authenticated user id claim, if any.
    ///
    /// A claim that fails to decode is treated as absent.
    pub fn user_id(&self) -> Option<UserId> {
        match self.0.get::<i64>(USER_ID_KEY) {
            Ok(id) => id.map(UserId::new),
            Err(error) => {
                warn!(%error, "discarding undecodable user id in session");
                None
            }
        }
    }

    /// Drop the authenticated user claim.
    pub fn forget_user(&self) {
        self.0.remove(USER_ID_KEY);
    }

    /// Issue a fresh session cookie, keeping the current state.
    pub fn renew(&self) {
        self.0.renew();
    }

    /// Store a message to show on the next rendered page.
    pub fn put_flash(&self, message: &str) -> Result<(), Error> {
        self.0
            .insert(FLASH_KEY, message)
            .map_err(|error| Error::internal(format!("failed to store flash: {error}")))
    }

    /// Remove and return the pending flash message.
    pub fn take_flash(&self) -> Option<String> {
        match self.0.remove_as::<String>(FLASH_KEY) {
            Some(Ok(message)) => Some(message),
            Some(Err(raw)) => {
                warn!(raw = %raw, "discarding undecodable flash message");
                None
            }
            None => None,
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
