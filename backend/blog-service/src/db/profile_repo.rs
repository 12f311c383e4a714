use crate::models::Profile;
use sqlx::PgExecutor;

/// All user profiles, newest first
pub async fn list_profiles<'e, E>(executor: E) -> Result<Vec<Profile>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Profile>(
        "SELECT id, email, full_name, created_at FROM profiles ORDER BY created_at DESC",
    )
    .fetch_all(executor)
    .await
}
