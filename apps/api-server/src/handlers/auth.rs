//! Admin session handlers.

use actix_web::{HttpResponse, web};

use chapel_shared::SuccessResponse;
use chapel_shared::dto::{AuthStatusResponse, LoginRequest};

use crate::middleware::error::AppResult;
use crate::middleware::session::{CurrentSession, removal_cookie, session_cookie};
use crate::state::AppState;

/// POST /api/login
///
/// Always issues a new token; a session the caller already held is destroyed.
pub async fn login(
    state: web::Data<AppState>,
    current: CurrentSession,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let grant = state
        .auth
        .login(current.token(), &req.username, &req.password)
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state.session_cookie, &grant))
        .json(SuccessResponse::with_message("Login successful")))
}

/// POST /api/logout
pub async fn logout(
    state: web::Data<AppState>,
    current: CurrentSession,
) -> AppResult<HttpResponse> {
    state.auth.logout(current.token()).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(&state.session_cookie))
        .json(SuccessResponse::with_message("Logout successful")))
}

/// GET /api/check-auth
pub async fn check_auth(
    state: web::Data<AppState>,
    current: CurrentSession,
) -> AppResult<HttpResponse> {
    let authenticated = state.auth.check(current.token()).await?;
    Ok(HttpResponse::Ok().json(AuthStatusResponse { authenticated }))
}
