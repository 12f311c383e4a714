use crate::models::Tag;
use sqlx::PgExecutor;
use uuid::Uuid;

/// All tags ordered by name
pub async fn list_tags<'e, E>(executor: E) -> Result<Vec<Tag>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags ORDER BY name")
        .fetch_all(executor)
        .await
}

/// Tags attached to a post, ordered by name
pub async fn tags_for_post<'e, E>(executor: E, post_id: Uuid) -> Result<Vec<Tag>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.slug
        FROM tags t
        JOIN post_tags pt ON pt.tag_id = t.id
        WHERE pt.post_id = $1
        ORDER BY t.name
        "#,
    )
    .bind(post_id)
    .fetch_all(executor)
    .await
}

pub async fn find_tag_by_slug<'e, E>(executor: E, slug: &str) -> Result<Option<Tag>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Tag>("SELECT id, name, slug FROM tags WHERE slug = $1")
        .bind(slug)
        .fetch_optional(executor)
        .await
}

/// Insert a tag. If a concurrent save already created the slug, that row is
/// returned unchanged (its display name wins).
pub async fn insert_tag<'e, E>(executor: E, name: &str, slug: &str) -> Result<Tag, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Tag>(
        r#"
        INSERT INTO tags (name, slug) VALUES ($1, $2)
        ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug
        RETURNING id, name, slug
        "#,
    )
    .bind(name)
    .bind(slug)
    .fetch_one(executor)
    .await
}

/// Remove every tag association of a post
pub async fn delete_post_tags<'e, E>(executor: E, post_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn insert_post_tag<'e, E>(
    executor: E,
    post_id: Uuid,
    tag_id: Uuid,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2)")
        .bind(post_id)
        .bind(tag_id)
        .execute(executor)
        .await?;

    Ok(())
}
