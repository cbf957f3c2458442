/// Configuration management for the blog service
///
/// All configuration is loaded from environment variables; a `.env` file is
/// honored in development via dotenvy (loaded in `main`).
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// SMTP settings for newsletter dispatch
    pub email: EmailConfig,
    /// Local image upload storage
    pub uploads: UploadConfig,
    /// Site identity used for post authorship, admin replies, and the
    /// newsletter template
    pub site: SiteConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// SMTP relay settings
///
/// An empty `smtp_host` puts the mailer into no-op mode (logs only), which
/// is the expected setup for development and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// From address, e.g. `Blog <noreply@example.com>`
    pub smtp_from: String,
}

/// Local upload storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded images are written to
    pub dir: String,
    /// URL path prefix the directory is served under
    pub public_prefix: String,
}

/// Site identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name shown in the newsletter header
    pub name: String,
    /// Display name stamped on posts and admin replies
    pub author_name: String,
    /// Contact address stamped on admin replies
    pub author_email: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("BLOG_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("BLOG_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(5000),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/blog".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            email: EmailConfig {
                smtp_host: std::env::var("SMTP_HOST").unwrap_or_default(),
                smtp_port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                smtp_username: std::env::var("SMTP_USERNAME").ok(),
                smtp_password: std::env::var("SMTP_PASSWORD").ok(),
                smtp_from: std::env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "Blog <noreply@localhost>".to_string()),
            },
            uploads: UploadConfig {
                dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
                public_prefix: std::env::var("UPLOAD_PUBLIC_PREFIX")
                    .unwrap_or_else(|_| "/uploads".to_string()),
            },
            site: SiteConfig {
                name: std::env::var("SITE_NAME").unwrap_or_else(|_| "Blog".to_string()),
                author_name: std::env::var("SITE_AUTHOR_NAME")
                    .unwrap_or_else(|_| "Editor".to_string()),
                author_email: std::env::var("SITE_AUTHOR_EMAIL")
                    .unwrap_or_else(|_| "editor@localhost".to_string()),
            },
        })
    }
}
