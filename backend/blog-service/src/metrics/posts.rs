use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    /// Post saves by operation (create/update) and outcome (success/error).
    pub static ref POST_SAVE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_post_save_total",
        "Post saves segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register blog_post_save_total");

    /// Duration of post saves, upload included.
    pub static ref POST_SAVE_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "blog_post_save_duration_seconds",
        "Post save duration segmented by operation",
        &["operation"]
    )
    .expect("failed to register blog_post_save_duration_seconds");

    /// Tags created lazily by post saves.
    pub static ref TAGS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "blog_tags_created_total",
        "Tags created while saving posts"
    )
    .expect("failed to register blog_tags_created_total");

    /// Post deletions by route (owner/admin).
    pub static ref POST_DELETE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_post_delete_total",
        "Post deletions segmented by route",
        &["route"]
    )
    .expect("failed to register blog_post_delete_total");

    /// Uploaded images removed after a failed save (success/error).
    pub static ref IMAGE_CLEANUP_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_image_cleanup_total",
        "Compensating image deletes segmented by result",
        &["result"]
    )
    .expect("failed to register blog_image_cleanup_total");
}
