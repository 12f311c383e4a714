/// Post service - post save, detail, edit form, listing and deletion
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::auth::{can_modify_post, ensure_can_modify, AuthContext};
use crate::config::SiteConfig;
use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::metrics::posts::{
    IMAGE_CLEANUP_TOTAL, POST_DELETE_TOTAL, POST_SAVE_DURATION_SECONDS, POST_SAVE_TOTAL,
    TAGS_CREATED_TOTAL,
};
use crate::models::{
    AuthorSummary, ImageUpload, NewPost, Post, PostChanges, PostFilter, PostInput, PostRecord,
    Tag,
};
use crate::seo::PostSeo;
use crate::services::tag_sync::sync_post_tags;
use crate::slug::slugify;
use crate::storage::{object_path, ObjectStorage};
use crate::tags::{join_names, TagUpdate};

/// A create (no slug) or an edit of the post with `existing_slug`
#[derive(Debug, Clone)]
pub struct SavePost {
    pub existing_slug: Option<String>,
    pub input: PostInput,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveKind {
    Created,
    Updated,
}

impl SaveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveKind::Created => "create",
            SaveKind::Updated => "update",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SaveKind::Created => "Post created successfully",
            SaveKind::Updated => "Post updated successfully",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavedPost {
    pub post: Post,
    pub kind: SaveKind,
}

/// Author as shown next to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    pub full_name: Option<String>,
    pub email: String,
    pub display_name: String,
}

impl From<&AuthorSummary> for AuthorView {
    fn from(author: &AuthorSummary) -> Self {
        Self {
            full_name: author.full_name.clone(),
            email: author.email.clone(),
            display_name: author.display_name().to_string(),
        }
    }
}

/// Home listing card
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub featured_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: AuthorView,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeListing {
    pub posts: Vec<PostSummary>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub author: AuthorView,
    pub tags: Vec<Tag>,
    pub can_edit: bool,
    pub seo: PostSeo,
}

/// Values that prefill the edit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditForm {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub featured_image_url: Option<String>,
    pub tags: String,
}

pub struct PostService {
    store: Arc<dyn BlogStore>,
    storage: Arc<dyn ObjectStorage>,
    max_image_bytes: usize,
}

impl PostService {
    pub fn new(
        store: Arc<dyn BlogStore>,
        storage: Arc<dyn ObjectStorage>,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            store,
            storage,
            max_image_bytes,
        }
    }

    /// Create or update a post together with its tags.
    ///
    /// Input is validated before any I/O. The image, if any, is uploaded
    /// before the row writes; the post row and its tag associations are then
    /// written in one transaction. When that transaction fails the uploaded
    /// object is deleted again.
    pub async fn save_post(&self, ctx: &AuthContext, request: SavePost) -> Result<SavedPost> {
        let kind = if request.existing_slug.is_some() {
            SaveKind::Updated
        } else {
            SaveKind::Created
        };
        let start = Instant::now();

        let result = self.save_post_inner(ctx, request, kind).await;

        POST_SAVE_DURATION_SECONDS
            .with_label_values(&[kind.as_str()])
            .observe(start.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { "success" } else { "error" };
        POST_SAVE_TOTAL
            .with_label_values(&[kind.as_str(), outcome])
            .inc();

        result
    }

    async fn save_post_inner(
        &self,
        ctx: &AuthContext,
        request: SavePost,
        kind: SaveKind,
    ) -> Result<SavedPost> {
        let SavePost {
            existing_slug,
            input,
            image,
        } = request;

        let tags = input.check()?;
        if let Some(image) = &image {
            image.check(self.max_image_bytes)?;
        }

        let user = ctx.require_user()?;

        let existing = match &existing_slug {
            Some(slug) => {
                let record = self
                    .store
                    .find_post_by_slug(slug)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
                ensure_can_modify(ctx, &record.post)?;
                Some(record.post)
            }
            None => None,
        };

        let uploaded = match image {
            Some(image) => {
                let path = object_path(user.id, &image.extension());
                self.storage
                    .upload(&path, image.bytes, &image.content_type)
                    .await?;
                tracing::info!(user_id = %user.id, %path, "featured image uploaded");
                Some(path)
            }
            None => None,
        };

        let featured_image_url = match &uploaded {
            Some(path) => Some(self.storage.public_url(path)),
            None => existing.as_ref().and_then(|p| p.featured_image_url.clone()),
        };

        let written = self
            .write_post(user.id, existing.as_ref(), &input, featured_image_url, &tags)
            .await;

        match written {
            Ok((post, tags_created)) => {
                TAGS_CREATED_TOTAL.inc_by(tags_created as u64);
                tracing::info!(
                    post_id = %post.id,
                    slug = %post.slug,
                    user_id = %user.id,
                    operation = kind.as_str(),
                    "post saved"
                );
                Ok(SavedPost { post, kind })
            }
            Err(err) => {
                if let Some(path) = uploaded {
                    self.remove_uploaded_image(&path).await;
                }
                Err(err)
            }
        }
    }

    /// Row writes of a save, committed together. Returns the post and the
    /// number of tags created.
    async fn write_post(
        &self,
        user_id: Uuid,
        existing: Option<&Post>,
        input: &PostInput,
        featured_image_url: Option<String>,
        tags: &TagUpdate,
    ) -> Result<(Post, usize)> {
        let mut tx = self.store.begin().await?;

        let post = match existing {
            Some(existing) => {
                let changes = PostChanges {
                    title: input.title.clone(),
                    content: input.content.clone(),
                    featured_image_url,
                };
                tx.update_post_by_slug(&existing.slug, &changes)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Post not found".into()))?
            }
            None => {
                let new_post = NewPost {
                    user_id,
                    title: input.title.clone(),
                    content: input.content.clone(),
                    slug: slugify(&input.title),
                    featured_image_url,
                };
                tx.insert_post(&new_post).await?
            }
        };

        let summary = sync_post_tags(tx.as_mut(), post.id, tags).await?;
        tx.commit().await?;

        Ok((post, summary.created))
    }

    async fn remove_uploaded_image(&self, path: &str) {
        match self.storage.delete(path).await {
            Ok(()) => {
                IMAGE_CLEANUP_TOTAL.with_label_values(&["success"]).inc();
                tracing::info!(%path, "removed image of failed save");
            }
            Err(err) => {
                IMAGE_CLEANUP_TOTAL.with_label_values(&["error"]).inc();
                tracing::warn!(%path, "failed to remove image of failed save: {}", err);
            }
        }
    }

    /// Posts newest first plus all tags, fetched concurrently.
    /// A failing tag fetch yields an empty tag list.
    pub async fn home(&self, filter: PostFilter) -> Result<HomeListing> {
        let (posts, tags) = tokio::join!(self.store.list_posts(filter), self.store.list_tags());

        let tags = tags.unwrap_or_else(|err| {
            tracing::warn!("tag list fetch failed: {}", err);
            Vec::new()
        });

        let posts = posts?
            .into_iter()
            .map(|row| PostSummary {
                excerpt: row.post.excerpt(),
                author: AuthorView::from(&row.author),
                id: row.post.id,
                title: row.post.title,
                slug: row.post.slug,
                featured_image_url: row.post.featured_image_url,
                created_at: row.post.created_at,
            })
            .collect();

        Ok(HomeListing { posts, tags })
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.store.list_tags().await
    }

    async fn load(&self, slug: &str) -> Result<PostRecord> {
        self.store
            .find_post_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".into()))
    }

    pub async fn get_post_detail(
        &self,
        ctx: &AuthContext,
        slug: &str,
        site: &SiteConfig,
    ) -> Result<PostDetail> {
        let record = self.load(slug).await?;
        let can_edit = can_modify_post(ctx, &record.post);
        let seo = PostSeo::for_post(&record.post, site);

        Ok(PostDetail {
            author: AuthorView::from(&record.author),
            tags: record.tags,
            post: record.post,
            can_edit,
            seo,
        })
    }

    pub async fn load_for_edit(&self, ctx: &AuthContext, slug: &str) -> Result<EditForm> {
        ctx.require_user()?;
        let record = self.load(slug).await?;
        ensure_can_modify(ctx, &record.post)?;

        Ok(EditForm {
            tags: join_names(record.tags.iter().map(|t| t.name.as_str())),
            slug: record.post.slug,
            title: record.post.title,
            content: record.post.content,
            featured_image_url: record.post.featured_image_url,
        })
    }

    /// Delete a post its owner or an admin asked to remove
    pub async fn delete_post(&self, ctx: &AuthContext, slug: &str) -> Result<()> {
        ctx.require_user()?;
        let record = self.load(slug).await?;
        ensure_can_modify(ctx, &record.post)?;

        if !self.store.delete_post(record.post.id).await? {
            return Err(AppError::NotFound("Post not found".into()));
        }

        POST_DELETE_TOTAL.with_label_values(&["owner"]).inc();
        tracing::info!(post_id = %record.post.id, slug = %slug, "post deleted");
        Ok(())
    }
}
