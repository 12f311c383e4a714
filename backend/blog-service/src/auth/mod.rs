/// Per-request caller identity
///
/// [`crate::middleware::JwtAuthMiddleware`] puts a [`SessionUser`] into the
/// request extensions when a valid bearer token is present. The
/// [`AuthContext`] extractor adds the admin flag from `user_roles` and is what
/// handlers pass down to services.
pub mod permissions;

pub use permissions::{can_modify_post, ensure_admin, ensure_can_modify};

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{AppError, Result, DEFAULT_SIGN_IN_PATH};
use crate::models::AppRole;

/// Authenticated user taken from the access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Who is calling, whether they are an admin, and where to send them to sign in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user: Option<SessionUser>,
    pub is_admin: bool,
    pub sign_in_path: String,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            is_admin: false,
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
        }
    }

    pub fn signed_in(user: SessionUser, is_admin: bool) -> Self {
        Self {
            user: Some(user),
            is_admin,
            ..Self::anonymous()
        }
    }

    pub fn with_sign_in_path(mut self, sign_in_path: impl Into<String>) -> Self {
        self.sign_in_path = sign_in_path.into();
        self
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }

    /// The signed-in user, or `Unauthorized` pointing at the sign-in page
    pub fn require_user(&self) -> Result<&SessionUser> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::sign_in_required(&self.sign_in_path))
    }
}

impl FromRequest for AuthContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<SessionUser>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let Some(state) = state else {
                return Err(AppError::Internal("application state missing".into()).into());
            };
            let sign_in_path = state.config.auth.sign_in_path.clone();

            let Some(user) = user else {
                return Ok(AuthContext::anonymous().with_sign_in_path(sign_in_path));
            };

            let is_admin = match state.store.has_role(user.id, AppRole::Admin).await {
                Ok(is_admin) => is_admin,
                Err(err) => {
                    tracing::warn!(user_id = %user.id, "role lookup failed, treating as non-admin: {}", err);
                    false
                }
            };

            Ok(AuthContext::signed_in(user, is_admin).with_sign_in_path(sign_in_path))
        })
    }
}
