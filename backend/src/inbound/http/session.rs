//! Session helpers keeping handlers free of framework-specific logic.
//!
//! The cookie session only ever carries the caller's user id. Issuing it is
//! left to whichever login flow fronts this API; handlers only read it.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes the session as domain values.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap the underlying Actix session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store `user_id` as the authenticated caller.
    ///
    /// # Errors
    /// Returns an internal error if the session cannot be serialised.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Caller id stored in the session, if any.
    ///
    /// A value that is not a UUID is treated as absent.
    ///
    /// # Errors
    /// Returns an internal error if the session cannot be read.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|value| {
            UserId::new(value)
                .inspect_err(|error| warn!(%error, "invalid user id in session cookie"))
                .ok()
        }))
    }

    /// Caller id, or `401 Unauthorized` when the session has none.
    ///
    /// # Errors
    /// Returns an `unauthorized` error for anonymous sessions.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(Self::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    const USER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user_id()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    async fn sign_in(session: SessionContext) -> Result<HttpResponse, Error> {
        session.persist_user(&UserId::new(USER).expect("fixture id"))?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn tamper(session: Session) -> HttpResponse {
        session
            .insert(USER_ID_KEY, "not-a-uuid")
            .expect("set invalid user id");
        HttpResponse::Ok().finish()
    }

    #[rstest]
    #[case("/sign-in", StatusCode::OK)]
    #[case("/tamper", StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn whoami_reflects_stored_id(#[case] setup: &str, #[case] expected: StatusCode) {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/sign-in", web::get().to(sign_in))
                .route("/tamper", web::get().to(tamper))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let set = test::call_service(&app, test::TestRequest::get().uri(setup).to_request()).await;
        let cookie = session_cookie(&set);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), expected);
        if expected == StatusCode::OK {
            assert_eq!(test::read_body(res).await, USER);
        }
    }

    #[actix_web::test]
    async fn anonymous_session_is_unauthorised() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
