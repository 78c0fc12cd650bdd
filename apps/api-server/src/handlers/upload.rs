//! Image upload handler.

use actix_multipart::{Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use futures::TryStreamExt;
use uuid::Uuid;

use chapel_shared::dto::UploadResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::session::AdminSession;
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

/// Accepted content types and the extension stored files get.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {err}"))
}

struct Upload {
    content_type: String,
    bytes: Vec<u8>,
    named: bool,
}

/// POST /api/upload
///
/// Takes the `image` part, or failing that the first `image/*` part.
pub async fn upload_image(
    _admin: AdminSession,
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let max_bytes = state.upload.max_bytes;
    let mut chosen: Option<Upload> = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let named = field.name() == Some(IMAGE_FIELD);
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_ascii_lowercase())
            .unwrap_or_default();

        let wanted = match &chosen {
            None => named || content_type.starts_with("image/"),
            Some(current) => named && !current.named,
        };
        if !wanted {
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::BadRequest(format!(
                    "Image must be at most {max_bytes} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        chosen = Some(Upload {
            content_type,
            bytes,
            named,
        });
    }

    let upload = chosen.ok_or_else(|| AppError::BadRequest("No image provided".to_string()))?;
    let ext = extension_for(&upload.content_type).ok_or_else(|| {
        AppError::BadRequest("Only JPEG, PNG, GIF and WebP images are allowed".to_string())
    })?;
    if upload.bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded image is empty".to_string()));
    }

    let name = format!("{}.{}", Uuid::new_v4().simple(), ext);
    let url = state
        .files
        .put(&name, &upload.content_type, &upload.bytes)
        .await?;

    tracing::info!(file = %name, size = upload.bytes.len(), "Image uploaded");
    Ok(HttpResponse::Ok().json(UploadResponse { url }))
}
