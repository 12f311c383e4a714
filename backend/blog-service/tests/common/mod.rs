//! Shared fixtures for blog-service integration tests: an in-memory store
//! with failure injection, an in-memory object store and token helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use blog_service::config::{AppConfig, AuthConfig, Config, CorsConfig, SiteConfig, StorageConfig};
use blog_service::db::{BlogStore, BlogTx};
use blog_service::error::{AppError, Result};
use blog_service::models::{
    AppRole, AuthorSummary, NewPost, Post, PostChanges, PostFilter, PostRecord, PostTag,
    PostWithAuthor, Profile, Tag,
};
use blog_service::storage::ObjectStorage;
use blog_service::AppState;
use chrono::{DateTime, Duration, TimeZone, Utc};
use crypto_core::jwt::{JwtIssuer, JwtValidator};
use crypto_core::test_keys::{PRIVATE_KEY_PEM, PUBLIC_KEY_PEM};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const STORAGE_BASE_URL: &str = "https://storage.test/post-images";

pub fn long_content() -> String {
    "Breaking coverage of the day with enough words to clear the fifty character minimum."
        .to_string()
}

// =====================================================================
// In-memory relational store
// =====================================================================

/// Operations a test can make fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ListPosts,
    ListTags,
    ListProfiles,
    HasRole,
    Begin,
    InsertPost,
    UpdatePost,
    DeletePostTags,
    InsertTag,
    InsertPostTag,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    posts: Vec<Post>,
    tags: Vec<Tag>,
    post_tags: Vec<PostTag>,
    profiles: Vec<Profile>,
    roles: Vec<(Uuid, AppRole)>,
    clock: i64,
}

impl Tables {
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(self.clock)
    }

    fn author(&self, user_id: Uuid) -> Option<AuthorSummary> {
        self.profiles
            .iter()
            .find(|p| p.id == user_id)
            .map(AuthorSummary::from)
    }
}

#[derive(Clone, Default)]
pub struct MemoryBlogStore {
    tables: Arc<Mutex<Tables>>,
    failures: Arc<Mutex<HashSet<FailPoint>>>,
}

impl MemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, point: FailPoint) {
        self.failures.lock().unwrap().insert(point);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    fn check(&self, point: FailPoint) -> Result<()> {
        check(&self.failures, point)
    }

    pub fn add_profile(&self, email: &str, full_name: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        let mut tables = self.tables.lock().unwrap();
        let created_at = tables.tick();
        tables.profiles.push(Profile {
            id,
            email: email.to_string(),
            full_name: full_name.map(str::to_string),
            created_at,
        });
        id
    }

    pub fn grant_admin(&self, user_id: Uuid) {
        self.tables
            .lock()
            .unwrap()
            .roles
            .push((user_id, AppRole::Admin));
    }

    pub fn add_tag(&self, name: &str, slug: &str) -> Tag {
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        self.tables.lock().unwrap().tags.push(tag.clone());
        tag
    }

    /// Insert a post directly, bypassing the save routine
    pub fn add_post(&self, owner: Uuid, title: &str, slug: &str, tag_ids: &[Uuid]) -> Post {
        let mut tables = self.tables.lock().unwrap();
        let now = tables.tick();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: owner,
            title: title.to_string(),
            content: long_content(),
            slug: slug.to_string(),
            featured_image_url: None,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        for tag_id in tag_ids {
            tables.post_tags.push(PostTag {
                post_id: post.id,
                tag_id: *tag_id,
            });
        }
        post
    }

    pub fn posts(&self) -> Vec<Post> {
        self.tables.lock().unwrap().posts.clone()
    }

    pub fn post_by_slug(&self, slug: &str) -> Option<Post> {
        self.posts().into_iter().find(|p| p.slug == slug)
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.tables.lock().unwrap().tags.clone()
    }

    pub fn post_tags(&self) -> Vec<PostTag> {
        self.tables.lock().unwrap().post_tags.clone()
    }

    /// Slugs of the tags attached to a post, sorted
    pub fn tag_slugs_of(&self, post_id: Uuid) -> Vec<String> {
        let tables = self.tables.lock().unwrap();
        let mut slugs: Vec<String> = tables
            .post_tags
            .iter()
            .filter(|pt| pt.post_id == post_id)
            .filter_map(|pt| tables.tags.iter().find(|t| t.id == pt.tag_id))
            .map(|t| t.slug.clone())
            .collect();
        slugs.sort();
        slugs
    }
}

fn check(failures: &Mutex<HashSet<FailPoint>>, point: FailPoint) -> Result<()> {
    if failures.lock().unwrap().contains(&point) {
        Err(AppError::Database(format!("injected failure at {:?}", point)))
    } else {
        Ok(())
    }
}

#[async_trait]
impl BlogStore for MemoryBlogStore {
    async fn list_posts(&self, filter: PostFilter) -> Result<Vec<PostWithAuthor>> {
        self.check(FailPoint::ListPosts)?;
        let tables = self.tables.lock().unwrap();

        let mut rows: Vec<PostWithAuthor> = tables
            .posts
            .iter()
            .filter(|post| match filter.tag {
                Some(tag_id) => tables
                    .post_tags
                    .iter()
                    .any(|pt| pt.post_id == post.id && pt.tag_id == tag_id),
                None => true,
            })
            .filter_map(|post| {
                tables.author(post.user_id).map(|author| PostWithAuthor {
                    post: post.clone(),
                    author,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        Ok(rows)
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<PostRecord>> {
        let tables = self.tables.lock().unwrap();
        let Some(post) = tables.posts.iter().find(|p| p.slug == slug) else {
            return Ok(None);
        };
        let Some(author) = tables.author(post.user_id) else {
            return Ok(None);
        };

        let mut tags: Vec<Tag> = tables
            .post_tags
            .iter()
            .filter(|pt| pt.post_id == post.id)
            .filter_map(|pt| tables.tags.iter().find(|t| t.id == pt.tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Some(PostRecord {
            post: post.clone(),
            author,
            tags,
        }))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.check(FailPoint::ListTags)?;
        let mut tags = self.tags();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.check(FailPoint::ListProfiles)?;
        let mut profiles = self.tables.lock().unwrap().profiles.clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn has_role(&self, user_id: Uuid, role: AppRole) -> Result<bool> {
        self.check(FailPoint::HasRole)?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.roles.contains(&(user_id, role)))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        tables.post_tags.retain(|pt| pt.post_id != id);
        Ok(tables.posts.len() < before)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn BlogTx>> {
        self.check(FailPoint::Begin)?;
        let working = self.tables.lock().unwrap().clone();
        Ok(Box::new(MemoryBlogTx {
            shared: self.tables.clone(),
            failures: self.failures.clone(),
            working,
        }))
    }
}

/// Works on a snapshot; commit swaps it in, drop discards it
pub struct MemoryBlogTx {
    shared: Arc<Mutex<Tables>>,
    failures: Arc<Mutex<HashSet<FailPoint>>>,
    working: Tables,
}

#[async_trait]
impl BlogTx for MemoryBlogTx {
    async fn insert_post(&mut self, post: &NewPost) -> Result<Post> {
        check(&self.failures, FailPoint::InsertPost)?;
        if self.working.posts.iter().any(|p| p.slug == post.slug) {
            return Err(AppError::Conflict(format!(
                "A record with the same slug already exists ({})",
                post.slug
            )));
        }

        let now = self.working.tick();
        let row = Post {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            title: post.title.clone(),
            content: post.content.clone(),
            slug: post.slug.clone(),
            featured_image_url: post.featured_image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.working.posts.push(row.clone());
        Ok(row)
    }

    async fn update_post_by_slug(
        &mut self,
        slug: &str,
        changes: &PostChanges,
    ) -> Result<Option<Post>> {
        check(&self.failures, FailPoint::UpdatePost)?;
        let now = self.working.tick();
        let Some(post) = self.working.posts.iter_mut().find(|p| p.slug == slug) else {
            return Ok(None);
        };

        post.title = changes.title.clone();
        post.content = changes.content.clone();
        post.featured_image_url = changes.featured_image_url.clone();
        post.updated_at = now;
        Ok(Some(post.clone()))
    }

    async fn delete_post_tags(&mut self, post_id: Uuid) -> Result<()> {
        check(&self.failures, FailPoint::DeletePostTags)?;
        self.working.post_tags.retain(|pt| pt.post_id != post_id);
        Ok(())
    }

    async fn find_tag_by_slug(&mut self, slug: &str) -> Result<Option<Tag>> {
        Ok(self.working.tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn insert_tag(&mut self, name: &str, slug: &str) -> Result<Tag> {
        check(&self.failures, FailPoint::InsertTag)?;
        if let Some(existing) = self.working.tags.iter().find(|t| t.slug == slug) {
            return Ok(existing.clone());
        }
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
        };
        self.working.tags.push(tag.clone());
        Ok(tag)
    }

    async fn insert_post_tag(&mut self, post_id: Uuid, tag_id: Uuid) -> Result<()> {
        check(&self.failures, FailPoint::InsertPostTag)?;
        let row = PostTag { post_id, tag_id };
        if self.working.post_tags.contains(&row) {
            return Err(AppError::Conflict("post tag exists".into()));
        }
        self.working.post_tags.push(row);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        check(&self.failures, FailPoint::Commit)?;
        let MemoryBlogTx {
            shared, working, ..
        } = *self;
        *shared.lock().unwrap() = working;
        Ok(())
    }
}

// =====================================================================
// In-memory object storage
// =====================================================================

#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    deleted: Mutex<Vec<String>>,
    fail_upload: AtomicBool,
    fail_delete: AtomicBool,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_uploads(&self) {
        self.fail_upload.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    pub fn paths(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn content_type_of(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .map(|(_, content_type)| content_type.clone())
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected upload failure".into()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", STORAGE_BASE_URL, path)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(path.to_string());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::Storage("injected delete failure".into()));
        }
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }
}

// =====================================================================
// Configuration and tokens
// =====================================================================

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            env: "test".into(),
            host: "127.0.0.1".into(),
            port: 0,
        },
        cors: CorsConfig {
            allowed_origins: "http://localhost:5173".into(),
        },
        storage: StorageConfig {
            bucket: "post-images".into(),
            region: "us-east-1".into(),
            endpoint: None,
            public_base_url: STORAGE_BASE_URL.into(),
            force_path_style: false,
            max_image_bytes: 1024,
        },
        auth: AuthConfig {
            jwt_public_key_pem: Some(PUBLIC_KEY_PEM.into()),
            sign_in_path: "/auth".into(),
        },
        site: SiteConfig {
            name: "BreakingNewsDaily".into(),
            url: "https://news.example.com".into(),
        },
    }
}

pub fn test_state(store: &MemoryBlogStore, storage: &Arc<MemoryObjectStorage>) -> AppState {
    test_state_with(store, storage, test_config())
}

pub fn test_state_with(
    store: &MemoryBlogStore,
    storage: &Arc<MemoryObjectStorage>,
    config: Config,
) -> AppState {
    AppState::new(Arc::new(store.clone()), storage.clone(), config)
}

pub fn validator() -> Arc<JwtValidator> {
    Arc::new(JwtValidator::from_rsa_pem(PUBLIC_KEY_PEM).expect("test public key"))
}

pub fn bearer(user_id: Uuid, email: &str) -> String {
    let issuer = JwtIssuer::from_rsa_pem(PRIVATE_KEY_PEM).expect("test private key");
    let token = issuer
        .access_token(user_id, email)
        .expect("token generation");
    format!("Bearer {}", token)
}
