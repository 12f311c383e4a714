use crate::models::AppRole;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Whether `user_id` holds `role`
pub async fn has_role<'e, E>(executor: E, user_id: Uuid, role: AppRole) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2::app_role)",
    )
    .bind(user_id)
    .bind(role.as_str())
    .fetch_one(executor)
    .await?;

    Ok(exists)
}
