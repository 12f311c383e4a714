use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::{AuthContext, SessionUser};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<SessionUser>,
    pub is_admin: bool,
    pub sign_in_path: String,
}

/// Current caller, for the navigation bar
/// GET /api/v1/session
pub async fn get_session(state: web::Data<AppState>, ctx: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(SessionResponse {
        user: ctx.user,
        is_admin: ctx.is_admin,
        sign_in_path: state.config.auth.sign_in_path.clone(),
    })
}
