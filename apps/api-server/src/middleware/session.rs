//! Session cookie extractors.

use std::future::{Ready, ready};

use actix_web::cookie::{Cookie, time::Duration};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use chapel_core::domain::{Session, SessionGrant, SessionToken};
use futures::future::LocalBoxFuture;

use crate::config::SessionConfig;
use crate::middleware::error::AppError;
use crate::state::AppState;

/// The session token presented by the client, if any.
///
/// Never fails: a missing cookie and a value we could not have issued both extract as
/// `None`. Whether the token names a live session is for the [`SessionAuthority`] to say.
///
/// [`SessionAuthority`]: chapel_core::SessionAuthority
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<SessionToken>);

impl CurrentSession {
    pub fn token(&self) -> Option<&SessionToken> {
        self.0.as_ref()
    }
}

impl FromRequest for CurrentSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .app_data::<web::Data<AppState>>()
            .and_then(|state| req.cookie(&state.session_cookie.cookie_name))
            .and_then(|cookie| SessionToken::parse(cookie.value()));

        ready(Ok(CurrentSession(token)))
    }
}

/// A live admin session. Extraction fails with 401 otherwise.
///
/// actix polls all extractors of a handler together, so a handler using this must not
/// take any other extractor that can fail; parse the body after the gate instead.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl FromRequest for AdminSession {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let current = CurrentSession::from_request(req, payload).into_inner();

        Box::pin(async move {
            let Some(state) = state else {
                return Err(AppError::Internal("AppState not registered".to_string()));
            };
            let token = current.ok().and_then(|c| c.0);

            let session = state.auth.require_admin(token.as_ref()).await?;
            Ok(AdminSession(session))
        })
    }
}

/// The cookie carrying a freshly granted session.
pub fn session_cookie(config: &SessionConfig, grant: &SessionGrant) -> Cookie<'static> {
    let mut cookie = base_cookie(config, grant.token.as_str().to_string());
    cookie.set_max_age(Duration::hours(config.ttl_hours));
    cookie
}

/// A cookie that makes the browser forget the session.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(config, String::new());
    cookie.make_removal();
    cookie
}

fn base_cookie(config: &SessionConfig, value: String) -> Cookie<'static> {
    let mut builder = Cookie::build(config.cookie_name.clone(), value)
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site);

    if let Some(domain) = &config.cookie_domain {
        builder = builder.domain(domain.clone());
    }

    builder.finish()
}
