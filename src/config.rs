use anyhow::Context;

/// 3600 * 100 seconds.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 360_000;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub github: GithubConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            ttl_seconds: std::env::var("JWT_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS),
        };
        let github = GithubConfig {
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".into()),
            client_id: std::env::var("GITHUB_CLIENT_ID").ok().filter(|v| !v.is_empty()),
            client_secret: std::env::var("GITHUB_CLIENT_SECRET")
                .ok()
                .filter(|v| !v.is_empty()),
        };
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);
        Ok(Self {
            database_url,
            host,
            port,
            jwt,
            github,
        })
    }
}
