/// Shared application state and route table
use actix_web::web;
use crypto_core::jwt::JwtValidator;
use std::sync::Arc;

use crate::config::Config;
use crate::db::BlogStore;
use crate::error::AppError;
use crate::handlers;
use crate::metrics;
use crate::middleware::{JwtAuthMiddleware, MetricsMiddleware};
use crate::services::{AdminService, PostService};
use crate::storage::ObjectStorage;

/// Backends and configuration every handler sees, registered as `web::Data<AppState>`
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BlogStore>,
        storage: Arc<dyn ObjectStorage>,
        config: Config,
    ) -> Self {
        Self {
            store,
            storage,
            config: Arc::new(config),
        }
    }

    pub fn post_service(&self) -> PostService {
        PostService::new(
            self.store.clone(),
            self.storage.clone(),
            self.config.storage.max_image_bytes,
        )
    }

    pub fn admin_service(&self) -> AdminService {
        AdminService::new(self.store.clone())
    }
}

/// Register health, metrics and `/api/v1` routes.
///
/// Health routes are registered ahead of the `/api/v1` scope so they bypass
/// authentication. Unparsable path and query parameters become JSON 400s.
pub fn configure(cfg: &mut web::ServiceConfig, validator: Option<Arc<JwtValidator>>) {
    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid path parameter: {}", err)).into()
    }));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query parameter: {}", err)).into()
    }));

    cfg.route("/metrics", web::get().to(metrics::serve_metrics))
        .route("/api/v1/health", web::get().to(handlers::health::health_summary))
        .route(
            "/api/v1/health/ready",
            web::get().to(handlers::health::readiness_summary),
        )
        .route(
            "/api/v1/health/live",
            web::get().to(handlers::health::liveness_check),
        )
        .service(
            web::scope("/api/v1")
                .wrap(JwtAuthMiddleware::new(validator))
                .wrap(MetricsMiddleware)
                .route("/session", web::get().to(handlers::get_session))
                .route("/tags", web::get().to(handlers::list_tags))
                .service(
                    web::scope("/posts")
                        .service(
                            web::resource("")
                                .route(web::get().to(handlers::list_posts))
                                .route(web::post().to(handlers::create_post)),
                        )
                        .service(
                            web::resource("/{slug}/edit")
                                .route(web::get().to(handlers::get_edit_form)),
                        )
                        .service(
                            web::resource("/{slug}")
                                .route(web::get().to(handlers::get_post))
                                .route(web::put().to(handlers::update_post))
                                .route(web::delete().to(handlers::delete_post)),
                        ),
                )
                .service(
                    web::scope("/admin")
                        .route("/dashboard", web::get().to(handlers::admin_dashboard))
                        .route(
                            "/posts/{post_id}",
                            web::delete().to(handlers::admin_delete_post),
                        ),
                ),
        );
}
