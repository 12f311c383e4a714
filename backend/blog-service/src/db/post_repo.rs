use crate::models::{NewPost, Post, PostChanges, PostFilter, PostWithAuthor};
use sqlx::PgExecutor;
use uuid::Uuid;

const POST_COLUMNS: &str =
    "p.id, p.user_id, p.title, p.content, p.slug, p.featured_image_url, p.created_at, p.updated_at";

/// List posts newest first, joined with their author's profile.
/// With a tag filter only posts labeled with that tag are returned.
pub async fn list_posts_with_authors<'e, E>(
    executor: E,
    filter: PostFilter,
) -> Result<Vec<PostWithAuthor>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        SELECT {POST_COLUMNS}, pr.full_name, pr.email
        FROM posts p
        JOIN profiles pr ON pr.id = p.user_id
        WHERE $1::uuid IS NULL
           OR EXISTS (
               SELECT 1 FROM post_tags pt
               WHERE pt.post_id = p.id AND pt.tag_id = $1
           )
        ORDER BY p.created_at DESC
        "#
    );

    sqlx::query_as::<_, PostWithAuthor>(&sql)
        .bind(filter.tag)
        .fetch_all(executor)
        .await
}

/// Find a post by slug, joined with its author
pub async fn find_post_with_author_by_slug<'e, E>(
    executor: E,
    slug: &str,
) -> Result<Option<PostWithAuthor>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        SELECT {POST_COLUMNS}, pr.full_name, pr.email
        FROM posts p
        JOIN profiles pr ON pr.id = p.user_id
        WHERE p.slug = $1
        "#
    );

    sqlx::query_as::<_, PostWithAuthor>(&sql)
        .bind(slug)
        .fetch_optional(executor)
        .await
}

/// Insert a post. A duplicate slug fails with a unique violation.
pub async fn insert_post<'e, E>(executor: E, post: &NewPost) -> Result<Post, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (user_id, title, content, slug, featured_image_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, title, content, slug, featured_image_url, created_at, updated_at
        "#,
    )
    .bind(post.user_id)
    .bind(&post.title)
    .bind(&post.content)
    .bind(&post.slug)
    .bind(&post.featured_image_url)
    .fetch_one(executor)
    .await
}

/// Update the editable columns of the post with `slug`. Owner and slug are untouched.
pub async fn update_post_by_slug<'e, E>(
    executor: E,
    slug: &str,
    changes: &PostChanges,
) -> Result<Option<Post>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = $2, content = $3, featured_image_url = $4, updated_at = NOW()
        WHERE slug = $1
        RETURNING id, user_id, title, content, slug, featured_image_url, created_at, updated_at
        "#,
    )
    .bind(slug)
    .bind(&changes.title)
    .bind(&changes.content)
    .bind(&changes.featured_image_url)
    .fetch_optional(executor)
    .await
}

/// Delete a post; its `post_tags` rows go with it (ON DELETE CASCADE)
pub async fn delete_post<'e, E>(executor: E, post_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
