/// Post handlers - HTTP endpoints for post operations
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::Serialize;

use crate::app::AppState;
use crate::auth::AuthContext;
use crate::error::{AppError, Result, HOME_PATH};
use crate::models::{ImageUpload, Post, PostFilter, PostInput};
use crate::services::{SavePost, SavedPost};

/// Upper bound for a text field of the post form
const MAX_TEXT_FIELD_BYTES: usize = 256 * 1024;

#[derive(Debug, Serialize)]
pub struct SavePostResponse {
    pub message: &'static str,
    pub post: Post,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
    pub redirect: &'static str,
}

impl From<SavedPost> for SavePostResponse {
    fn from(saved: SavedPost) -> Self {
        Self {
            message: saved.kind.message(),
            redirect: format!("/posts/{}", saved.post.slug),
            post: saved.post,
        }
    }
}

/// Home listing, optionally filtered by tag id
/// GET /api/v1/posts?tag=<tag-id>
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PostFilter>,
) -> Result<HttpResponse> {
    let listing = state.post_service().home(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

/// GET /api/v1/posts/{slug}
pub async fn get_post(
    state: web::Data<AppState>,
    ctx: AuthContext,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    let detail = state
        .post_service()
        .get_post_detail(&ctx, &slug, &state.config.site)
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// GET /api/v1/posts/{slug}/edit
pub async fn get_edit_form(
    state: web::Data<AppState>,
    ctx: AuthContext,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    let form = state.post_service().load_for_edit(&ctx, &slug).await?;
    Ok(HttpResponse::Ok().json(form))
}

/// POST /api/v1/posts (multipart: title, content, tags, image)
pub async fn create_post(
    state: web::Data<AppState>,
    ctx: AuthContext,
    payload: Multipart,
) -> Result<HttpResponse> {
    let (input, image) = read_post_form(payload, state.config.storage.max_image_bytes).await?;

    let saved = state
        .post_service()
        .save_post(
            &ctx,
            SavePost {
                existing_slug: None,
                input,
                image,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(SavePostResponse::from(saved)))
}

/// PUT /api/v1/posts/{slug} (same form as create)
pub async fn update_post(
    state: web::Data<AppState>,
    ctx: AuthContext,
    slug: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let (input, image) = read_post_form(payload, state.config.storage.max_image_bytes).await?;

    let saved = state
        .post_service()
        .save_post(
            &ctx,
            SavePost {
                existing_slug: Some(slug.into_inner()),
                input,
                image,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(SavePostResponse::from(saved)))
}

/// DELETE /api/v1/posts/{slug}
pub async fn delete_post(
    state: web::Data<AppState>,
    ctx: AuthContext,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    state.post_service().delete_post(&ctx, &slug).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post deleted successfully",
        redirect: HOME_PATH,
    }))
}

/// Collect the post form from a multipart body.
///
/// Missing text fields read as empty so validation reports them. A file
/// field with no name and no bytes means no image was chosen. Each field
/// keeps at most one byte past its limit; the retained prefix is still over
/// the field's maximum, so size problems surface from validation in field
/// order instead of aborting the read.
async fn read_post_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> Result<(PostInput, Option<ImageUpload>)> {
    let mut input = PostInput::default();
    let mut image: Option<ImageUpload> = None;

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let limit = if name == "image" {
            max_image_bytes
        } else {
            MAX_TEXT_FIELD_BYTES
        };
        let keep = limit.saturating_add(1);

        let mut data = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("Field read error: {}", e)))?;
            let room = keep - data.len();
            if chunk.len() > room {
                truncated = true;
            }
            data.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        match name.as_str() {
            "title" => input.title = text_field(&name, data, truncated)?,
            "content" => input.content = text_field(&name, data, truncated)?,
            "tags" => input.tags = text_field(&name, data, truncated)?,
            "image" => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

                image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: data,
                });
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    Ok((input, image))
}

/// Decode a text field. A truncated field may end mid-character; that tail is dropped.
fn text_field(name: &str, mut data: Vec<u8>, truncated: bool) -> Result<String> {
    if truncated {
        if let Err(err) = std::str::from_utf8(&data) {
            if err.error_len().is_none() {
                data.truncate(err.valid_up_to());
            }
        }
    }
    String::from_utf8(data)
        .map_err(|_| AppError::BadRequest(format!("Field '{}' is not valid UTF-8", name)))
}
