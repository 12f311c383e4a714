/// Database access layer
///
/// Services talk to the relational backend through [`BlogStore`] for reads
/// and single-statement writes, and through [`BlogTx`] for the writes of a
/// post save, which commit or roll back together. [`pg::PgBlogStore`] is the
/// PostgreSQL implementation; the repo modules hold its queries.
use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    AppRole, NewPost, Post, PostChanges, PostFilter, PostRecord, PostWithAuthor, Profile, Tag,
};

pub mod migrations;
pub mod pg;
pub mod post_repo;
pub mod profile_repo;
pub mod role_repo;
pub mod tag_repo;

pub use pg::{PgBlogStore, PgBlogTx};

#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Posts with their authors, newest first
    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<PostWithAuthor>>;

    /// A post with author and tags (tags ordered by name)
    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<PostRecord>>;

    /// All tags ordered by name
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    /// All profiles, newest first
    async fn list_profiles(&self) -> Result<Vec<Profile>>;

    async fn has_role(&self, user_id: Uuid, role: AppRole) -> Result<bool>;

    /// Returns false when no row matched
    async fn delete_post(&self, id: Uuid) -> Result<bool>;

    /// Cheap connectivity check for readiness checks
    async fn ping(&self) -> Result<()>;

    /// Open a transaction for a post save
    async fn begin(&self) -> Result<Box<dyn BlogTx>>;
}

/// Writes of one post save. Dropping without [`BlogTx::commit`] rolls back.
#[async_trait]
pub trait BlogTx: Send {
    async fn insert_post(&mut self, post: &NewPost) -> Result<Post>;

    /// Update title, content and image of the post with `slug`
    async fn update_post_by_slug(&mut self, slug: &str, changes: &PostChanges)
        -> Result<Option<Post>>;

    async fn delete_post_tags(&mut self, post_id: Uuid) -> Result<()>;

    async fn find_tag_by_slug(&mut self, slug: &str) -> Result<Option<Tag>>;

    /// Create a tag, or return the existing one with the same slug
    async fn insert_tag(&mut self, name: &str, slug: &str) -> Result<Tag>;

    async fn insert_post_tag(&mut self, post_id: Uuid, tag_id: Uuid) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
