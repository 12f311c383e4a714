use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::error::Result;

/// GET /api/v1/tags
pub async fn list_tags(state: web::Data<AppState>) -> Result<HttpResponse> {
    let tags = state.post_service().list_tags().await?;
    Ok(HttpResponse::Ok().json(tags))
}
