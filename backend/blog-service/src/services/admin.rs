/// Admin dashboard and moderation
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{ensure_admin, AuthContext};
use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::metrics::posts::POST_DELETE_TOTAL;
use crate::models::{PostWithAuthor, Profile};

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub posts: Vec<PostWithAuthor>,
    pub users: Vec<Profile>,
}

pub struct AdminService {
    store: Arc<dyn BlogStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// All posts and all users, newest first, fetched concurrently
    pub async fn dashboard(&self, ctx: &AuthContext) -> Result<AdminDashboard> {
        ensure_admin(ctx)?;

        let (posts, users) = tokio::try_join!(
            self.store.list_posts(Default::default()),
            self.store.list_profiles()
        )?;

        Ok(AdminDashboard { posts, users })
    }

    pub async fn delete_post(&self, ctx: &AuthContext, post_id: Uuid) -> Result<()> {
        ensure_admin(ctx)?;

        if !self.store.delete_post(post_id).await? {
            return Err(AppError::NotFound("Post not found".into()));
        }

        POST_DELETE_TOTAL.with_label_values(&["admin"]).inc();
        tracing::info!(%post_id, admin_id = ?ctx.user_id(), "post deleted by admin");
        Ok(())
    }
}
