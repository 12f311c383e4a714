/// Business logic layer
///
/// - `posts`: post save (with tag sync and image upload), reads and deletion
/// - `tag_sync`: tag association replacement inside a save transaction
/// - `admin`: admin dashboard and moderation
pub mod admin;
pub mod posts;
pub mod tag_sync;

pub use admin::{AdminDashboard, AdminService};
pub use posts::{
    EditForm, HomeListing, PostDetail, PostService, PostSummary, SaveKind, SavePost, SavedPost,
};
pub use tag_sync::{sync_post_tags, TagSyncSummary};
