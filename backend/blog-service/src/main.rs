use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use blog_service::db::migrations::MIGRATOR;
use blog_service::db::PgBlogStore;
use blog_service::storage::S3ObjectStorage;
use blog_service::{configure, AppState, Config};
use crypto_core::jwt::JwtValidator;
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Container healthcheck: `blog-service healthcheck`
async fn run_healthcheck() -> io::Result<()> {
    let port = std::env::var("BLOG_SERVICE_PORT").unwrap_or_else(|_| "8080".to_string());
    let url = format!("http://127.0.0.1:{}/api/v1/health", port);

    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

/// Blog Service
///
/// # Routes
///
/// - `/api/v1/session` - current caller
/// - `/api/v1/posts/*` - listing, detail, edit form, create, update, delete
/// - `/api/v1/tags` - tag list
/// - `/api/v1/admin/*` - dashboard and moderation
/// - `/api/v1/health*`, `/metrics` - health checks and Prometheus metrics
#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    if std::env::args().nth(1).as_deref() == Some("healthcheck") {
        return run_healthcheck().await;
    }

    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let validator = match config.auth.jwt_public_key_pem.as_deref() {
        Some(pem) => Some(Arc::new(JwtValidator::from_rsa_pem(pem).map_err(|err| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to initialize JWT validation: {err}"),
            )
        })?)),
        None => {
            tracing::warn!(
                "JWT public key not configured; requests carrying a token will be rejected"
            );
            None
        }
    };

    let db_cfg = DbPoolConfig::from_env("blog-service").map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid database configuration: {e}"),
        )
    })?;
    db_cfg.log_config();

    let db_pool = match create_pg_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Connected to database via db-pool crate");

    MIGRATOR.run(&db_pool).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to run database migrations: {e}"),
        )
    })?;
    tracing::info!("Database migrations completed");

    let storage = S3ObjectStorage::from_config(&config.storage).await;
    tracing::info!(bucket = %storage.bucket(), "Object storage client initialized");

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();
    let state = web::Data::new(AppState::new(
        Arc::new(PgBlogStore::new(db_pool)),
        Arc::new(storage),
        config,
    ));

    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let validator = validator.clone();
        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(move |cfg| configure(cfg, validator))
    })
    .bind(&http_bind_address)?
    .run();

    let server_handle = server.handle();

    tokio::select! {
        result = server => {
            if let Err(e) = &result {
                tracing::error!("HTTP server returned error: {}", e);
            }
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    tracing::info!("blog-service shutting down");
    Ok(())
}
