/// PostgreSQL implementation of the store traits
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{post_repo, profile_repo, role_repo, tag_repo, BlogStore, BlogTx};
use crate::error::Result;
use crate::models::{
    AppRole, NewPost, Post, PostChanges, PostFilter, PostRecord, PostWithAuthor, Profile, Tag,
};

#[derive(Clone)]
pub struct PgBlogStore {
    pool: PgPool,
}

impl PgBlogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogStore for PgBlogStore {
    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<PostWithAuthor>> {
        Ok(post_repo::list_posts_with_authors(&self.pool, filter).await?)
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<PostRecord>> {
        let Some(row) = post_repo::find_post_with_author_by_slug(&self.pool, slug).await? else {
            return Ok(None);
        };
        let tags = tag_repo::tags_for_post(&self.pool, row.post.id).await?;

        Ok(Some(PostRecord {
            post: row.post,
            author: row.author,
            tags,
        }))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        Ok(tag_repo::list_tags(&self.pool).await?)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        Ok(profile_repo::list_profiles(&self.pool).await?)
    }

    async fn has_role(&self, user_id: Uuid, role: AppRole) -> Result<bool> {
        Ok(role_repo::has_role(&self.pool, user_id, role).await?)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Ok(post_repo::delete_post(&self.pool, id).await?)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn BlogTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgBlogTx { tx }))
    }
}

/// Open transaction; rolled back by sqlx when dropped uncommitted
pub struct PgBlogTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BlogTx for PgBlogTx {
    async fn insert_post(&mut self, post: &NewPost) -> Result<Post> {
        Ok(post_repo::insert_post(&mut *self.tx, post).await?)
    }

    async fn update_post_by_slug(
        &mut self,
        slug: &str,
        changes: &PostChanges,
    ) -> Result<Option<Post>> {
        Ok(post_repo::update_post_by_slug(&mut *self.tx, slug, changes).await?)
    }

    async fn delete_post_tags(&mut self, post_id: Uuid) -> Result<()> {
        tag_repo::delete_post_tags(&mut *self.tx, post_id).await?;
        Ok(())
    }

    async fn find_tag_by_slug(&mut self, slug: &str) -> Result<Option<Tag>> {
        Ok(tag_repo::find_tag_by_slug(&mut *self.tx, slug).await?)
    }

    async fn insert_tag(&mut self, name: &str, slug: &str) -> Result<Tag> {
        Ok(tag_repo::insert_tag(&mut *self.tx, name, slug).await?)
    }

    async fn insert_post_tag(&mut self, post_id: Uuid, tag_id: Uuid) -> Result<()> {
        Ok(tag_repo::insert_post_tag(&mut *self.tx, post_id, tag_id).await?)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        Ok(self.tx.commit().await?)
    }
}
