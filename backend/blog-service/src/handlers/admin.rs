/// Admin handlers
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthContext;
use crate::error::Result;
use crate::handlers::posts::MessageResponse;

/// GET /api/v1/admin/dashboard
pub async fn admin_dashboard(
    state: web::Data<AppState>,
    ctx: AuthContext,
) -> Result<HttpResponse> {
    let dashboard = state.admin_service().dashboard(&ctx).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

/// DELETE /api/v1/admin/posts/{post_id}
pub async fn admin_delete_post(
    state: web::Data<AppState>,
    ctx: AuthContext,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .admin_service()
        .delete_post(&ctx, post_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Post deleted successfully",
        redirect: "/admin",
    }))
}
