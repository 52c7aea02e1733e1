use anyhow::Result;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub client_base_url: String,
    pub public_base_url: String,
    pub site_password: String,
    pub admin_password: String,
    pub session_secret: String,
    pub session_ttl_hours: u64,
    pub photo_dir: String,
    pub photo_url_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/darakbang".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            client_base_url: env::var("CLIENT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://{}:{}", host, port)),
            site_password: env::var("SITE_PASSWORD").unwrap_or_default(),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            session_secret: env::var("SESSION_SECRET").unwrap_or_else(|_| {
                "change-this-session-secret-before-deploying-12345".to_string()
            }),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .unwrap_or(12),
            photo_dir: env::var("PHOTO_DIR").unwrap_or_else(|_| "./photos".to_string()),
            photo_url_ttl_secs: env::var("PHOTO_URL_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            host,
            port,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_hours * 3600)
    }

    pub fn photo_url_ttl(&self) -> Duration {
        Duration::from_secs(self.photo_url_ttl_secs)
    }

    /// Both passwords must be non-empty; the default session secret is rejected in production.
    pub fn validate(&self) -> Result<()> {
        if self.site_password.is_empty() {
            anyhow::bail!("SITE_PASSWORD must be set");
        }
        if self.admin_password.is_empty() {
            anyhow::bail!("ADMIN_PASSWORD must be set");
        }
        if self.is_production() && self.session_secret.starts_with("change-this") {
            anyhow::bail!("SESSION_SECRET must be set in production");
        }
        Ok(())
    }

    /// Fixed configuration for tests: known passwords, no real database.
    pub fn test_config() -> Self {
        Config {
            database_url: "postgres://localhost:5432/darakbang_test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            client_base_url: "http://localhost:5173".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
            site_password: "site-password".to_string(),
            admin_password: "admin-password".to_string(),
            session_secret: "test_session_secret_for_testing_only".to_string(),
            session_ttl_hours: 1,
            photo_dir: std::env::temp_dir()
                .join("darakbang-test-photos")
                .to_string_lossy()
                .into_owned(),
            photo_url_ttl_secs: 3600,
        }
    }
}
