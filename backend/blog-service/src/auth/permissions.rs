/// Ownership and admin checks for posts
///
/// The same predicate decides the `can_edit` flag shown to clients and the
/// server-side check on update and delete. Row-level security in the
/// database remains the authoritative layer.
use super::AuthContext;
use crate::error::{AppError, Result};
use crate::models::Post;

/// True iff the caller owns the post or is an admin
pub fn can_modify_post(ctx: &AuthContext, post: &Post) -> bool {
    match ctx.user_id() {
        Some(user_id) => user_id == post.user_id || ctx.is_admin,
        None => false,
    }
}

/// Require a signed-in caller allowed to modify `post`
pub fn ensure_can_modify(ctx: &AuthContext, post: &Post) -> Result<()> {
    ctx.require_user()?;
    if can_modify_post(ctx, post) {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "You don't have permission to modify this post",
        ))
    }
}

/// Require a signed-in admin
pub fn ensure_admin(ctx: &AuthContext) -> Result<()> {
    ctx.require_user()?;
    if ctx.is_admin {
        Ok(())
    } else {
        Err(AppError::admin_required())
    }
}
