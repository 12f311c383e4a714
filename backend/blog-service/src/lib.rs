/// Blog Service Library
///
/// HTTP JSON backend of the BreakingNewsDaily blog: posts with tags and a
/// featured image, written by signed-in users and moderated by admins.
///
/// # Modules
///
/// - `app`: shared state and route table
/// - `auth`: per-request caller identity and post permissions
/// - `config`: configuration management
/// - `db`: store traits and the PostgreSQL implementation
/// - `error`: error types and handling
/// - `handlers`: HTTP request handlers
/// - `metrics`: Prometheus collectors and `/metrics`
/// - `middleware`: bearer-token authentication and request timing
/// - `models`: rows, form input and validation
/// - `seo`: post page metadata
/// - `services`: post save with tag sync, reads, admin operations
/// - `slug`: URL slugs
/// - `storage`: object storage for featured images
/// - `tags`: tag string parsing
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod seo;
pub mod services;
pub mod slug;
pub mod storage;
pub mod tags;

pub use app::{configure, AppState};
pub use config::Config;
pub use error::{AppError, Result};
