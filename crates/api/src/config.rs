/// Default session lifetime in hours.
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Serve the read endpoints without a session.
    pub public_reads: bool,
    /// Access gate configuration.
    pub auth: AuthConfig,
}

/// Access gate configuration: which password to accept and how sessions
/// are signed.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Argon2 PHC hash of the admin password. Takes precedence over
    /// `plain_password`.
    pub password_hash: Option<String>,
    /// Plaintext admin password, used only when no hash is configured.
    pub plain_password: Option<String>,
    /// HMAC-SHA256 secret used to sign and verify session tokens.
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    /// Mark the session cookie `Secure`.
    pub secure_cookie: bool,
}

impl AuthConfig {
    /// True when some password is configured.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some() || self.plain_password.is_some()
    }

    /// Session lifetime in seconds.
    pub fn session_ttl_secs(&self) -> i64 {
        self.session_ttl_hours * 60 * 60
    }

    /// Load the access gate configuration from environment variables.
    ///
    /// | Env Var              | Required | Default |
    /// |----------------------|----------|---------|
    /// | `AUTH_JWT_SECRET`    | **yes**  | --      |
    /// | `AUTH_PASSWORD_HASH` | no       | unset   |
    /// | `AUTH_PASSWORD`      | no       | unset   |
    /// | `SESSION_TTL_HOURS`  | no       | `12`    |
    /// | `COOKIE_SECURE`      | no       | `false` |
    ///
    /// # Panics
    ///
    /// Panics if `AUTH_JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("AUTH_JWT_SECRET")
            .expect("AUTH_JWT_SECRET must be set in the environment");
        assert!(!jwt_secret.is_empty(), "AUTH_JWT_SECRET must not be empty");

        let session_ttl_hours: i64 = std::env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| DEFAULT_SESSION_TTL_HOURS.to_string())
            .parse()
            .expect("SESSION_TTL_HOURS must be a valid i64");

        Self {
            password_hash: non_empty_var("AUTH_PASSWORD_HASH"),
            plain_password: non_empty_var("AUTH_PASSWORD"),
            jwt_secret,
            session_ttl_hours,
            secure_cookie: flag_var("COOKIE_SECURE"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3001`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PUBLIC_READS`         | `false`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_reads: flag_var("PUBLIC_READS"),
            auth: AuthConfig::from_env(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag_var(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
