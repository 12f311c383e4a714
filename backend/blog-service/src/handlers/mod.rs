/// HTTP handlers for blog endpoints
///
/// - Posts: home listing, detail, edit form, create, update, delete
/// - Tags: tag list for filters
/// - Admin: dashboard and moderation delete
/// - Session: current caller for the navigation bar
/// - Health: liveness and readiness checks
pub mod admin;
pub mod health;
pub mod posts;
pub mod session;
pub mod tags;

// Re-export handler functions at module level
pub use admin::{admin_dashboard, admin_delete_post};
pub use posts::{create_post, delete_post, get_edit_form, get_post, list_posts, update_post};
pub use session::get_session;
pub use tags::list_tags;
