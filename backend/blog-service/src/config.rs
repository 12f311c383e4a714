/// Configuration management for Blog Service
///
/// Everything is read from environment variables. `main` loads a `.env` file
/// first when one exists. Database settings live in `db-pool`.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Object storage for featured images
    pub storage: StorageConfig,
    /// Token validation and sign-in redirect
    pub auth: AuthConfig,
    /// Public site identity used in SEO metadata
    pub site: SiteConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible backends
    pub endpoint: Option<String>,
    /// Base URL public object URLs are built from
    pub public_base_url: String,
    pub force_path_style: bool,
    /// Largest accepted featured image, in bytes
    pub max_image_bytes: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// RS256 public key used to validate bearer tokens
    pub jwt_public_key_pem: Option<String>,
    pub sign_in_path: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "jwt_public_key_pem",
                &self.jwt_public_key_pem.as_ref().map(|_| "[configured]"),
            )
            .field("sign_in_path", &self.sign_in_path)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    /// Origin of the public site, without trailing slash
    pub url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("BLOG_SERVICE_PORT", 8080)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if is_production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:5173".to_string(),
                };

                if is_production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            storage: {
                let bucket =
                    std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "post-images".to_string());
                let region =
                    std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string());
                let endpoint = non_empty_env("STORAGE_ENDPOINT");
                let force_path_style = parse_env_or_default("STORAGE_PATH_STYLE", false)?;
                let public_base_url = non_empty_env("STORAGE_PUBLIC_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| {
                        default_public_base_url(&bucket, &region, endpoint.as_deref())
                    });

                StorageConfig {
                    bucket,
                    region,
                    endpoint,
                    public_base_url,
                    force_path_style,
                    max_image_bytes: parse_env_or_default("MAX_IMAGE_BYTES", 5_242_880)?,
                }
            },
            auth: {
                let jwt_public_key_pem = non_empty_env("JWT_PUBLIC_KEY_PEM");
                if is_production && jwt_public_key_pem.is_none() {
                    return Err("JWT_PUBLIC_KEY_PEM must be set in production".to_string());
                }

                AuthConfig {
                    jwt_public_key_pem,
                    sign_in_path: std::env::var("SIGN_IN_PATH")
                        .unwrap_or_else(|_| crate::error::DEFAULT_SIGN_IN_PATH.to_string()),
                }
            },
            site: SiteConfig {
                name: std::env::var("SITE_NAME")
                    .unwrap_or_else(|_| "BreakingNewsDaily".to_string()),
                url: std::env::var("SITE_URL")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string())
                    .trim_end_matches('/')
                    .to_string(),
            },
        })
    }
}

/// `https://<bucket>.s3.<region>.amazonaws.com` on AWS, `<endpoint>/<bucket>` otherwise
fn default_public_base_url(bucket: &str, region: &str, endpoint: Option<&str>) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 14] = [
        "APP_ENV",
        "BLOG_SERVICE_HOST",
        "BLOG_SERVICE_PORT",
        "CORS_ALLOWED_ORIGINS",
        "STORAGE_BUCKET",
        "STORAGE_REGION",
        "STORAGE_ENDPOINT",
        "STORAGE_PUBLIC_BASE_URL",
        "STORAGE_PATH_STYLE",
        "MAX_IMAGE_BYTES",
        "JWT_PUBLIC_KEY_PEM",
        "SIGN_IN_PATH",
        "SITE_NAME",
        "SITE_URL",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.cors.allowed_origins, "http://localhost:5173");
        assert_eq!(config.storage.bucket, "post-images");
        assert_eq!(
            config.storage.public_base_url,
            "https://post-images.s3.us-east-1.amazonaws.com"
        );
        assert_eq!(config.storage.max_image_bytes, 5_242_880);
        assert!(!config.storage.force_path_style);
        assert!(config.auth.jwt_public_key_pem.is_none());
        assert_eq!(config.auth.sign_in_path, "/auth");
        assert_eq!(config.site.name, "BreakingNewsDaily");
    }

    #[test]
    #[serial]
    fn test_custom_endpoint_base_url() {
        clear_env();
        std::env::set_var("STORAGE_ENDPOINT", "http://localhost:9000/");
        std::env::set_var("STORAGE_PATH_STYLE", "true");
        std::env::set_var("SITE_URL", "https://news.example.com/");

        let config = Config::from_env().unwrap();
        assert_eq!(
            config.storage.public_base_url,
            "http://localhost:9000/post-images"
        );
        assert!(config.storage.force_path_style);
        assert_eq!(config.site.url, "https://news.example.com");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_number_is_error() {
        clear_env();
        std::env::set_var("MAX_IMAGE_BYTES", "lots");
        let err = Config::from_env().unwrap_err();
        assert!(err.contains("MAX_IMAGE_BYTES"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_production_guards() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("JWT_PUBLIC_KEY_PEM", "pem");
        assert!(Config::from_env()
            .unwrap_err()
            .contains("CORS_ALLOWED_ORIGINS must be set"));

        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        assert!(Config::from_env().unwrap_err().contains("cannot be '*'"));

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://news.example.com");
        std::env::remove_var("JWT_PUBLIC_KEY_PEM");
        assert!(Config::from_env()
            .unwrap_err()
            .contains("JWT_PUBLIC_KEY_PEM"));

        std::env::set_var("JWT_PUBLIC_KEY_PEM", "pem");
        assert!(Config::from_env().is_ok());
        clear_env();
    }

    #[test]
    fn test_auth_debug_redacts_key() {
        let auth = AuthConfig {
            jwt_public_key_pem: Some("-----BEGIN PUBLIC KEY-----".into()),
            sign_in_path: "/auth".into(),
        };
        let rendered = format!("{:?}", auth);
        assert!(!rendered.contains("BEGIN"));
        assert!(rendered.contains("[configured]"));
    }
}
