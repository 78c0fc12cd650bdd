//! Post handlers. Reads are public; writes require [`AdminSession`].
//!
//! Write handlers take no fallible extractor besides the session: the path id and the
//! body are parsed only once the gate has passed.

use actix_web::{HttpRequest, HttpResponse, web};
use futures::TryStreamExt;
use serde::de::DeserializeOwned;

use chapel_core::domain::PostDraft;
use chapel_shared::SuccessResponse;
use chapel_shared::dto::PostPayload;

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::session::AdminSession;
use crate::state::AppState;

/// Largest JSON body accepted for a post.
const BODY_LIMIT: usize = 256 * 1024;

fn draft(payload: PostPayload) -> PostDraft {
    PostDraft {
        title: payload.title,
        content: payload.content,
        image_url: payload.image_url,
        date: payload.date,
    }
}

/// A non-numeric id names no post.
fn post_id(req: &HttpRequest) -> AppResult<i32> {
    req.match_info()
        .get("id")
        .and_then(|raw| raw.parse().ok())
        .ok_or(AppError::NotFound("Post"))
}

async fn read_json<T: DeserializeOwned>(mut payload: web::Payload) -> AppResult<T> {
    let mut body = Vec::new();
    while let Some(chunk) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    {
        if body.len() + chunk.len() > BODY_LIMIT {
            return Err(AppError::BadRequest("Request body too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }

    serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts
pub async fn create_post(
    _admin: AdminSession,
    state: web::Data<AppState>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let body: PostPayload = read_json(payload).await?;
    let post = state.posts.create(draft(body)).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    _admin: AdminSession,
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let id = post_id(&req)?;
    let body: PostPayload = read_json(payload).await?;
    let post = state.posts.update(id, draft(body)).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    _admin: AdminSession,
    state: web::Data<AppState>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    state.posts.delete(post_id(&req)?).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse::with_message("Post deleted")))
}
