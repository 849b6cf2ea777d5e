use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::services::CallAnalyticsConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Notes |
/// |----------|---------|-------|
/// | ENVIRONMENT | development | development \| staging \| production |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | DATA_DIR | ./data | SQLite database directory |
/// | LOG_DIR | (unset) | enables daily-rolling file logs (read at startup) |
/// | LOG_LEVEL | info | log verbosity (read at startup) |
/// | TIMEZONE | Asia/Kolkata | business time zone |
/// | JWT_SECRET | dev fallback | at least 32 bytes in production |
/// | JWT_EXPIRATION_MINUTES | 480 | one workday |
/// | JWT_ISSUER | hq-server | |
/// | JWT_AUDIENCE | hq-clients | |
/// | CALL_API_BASE_URL | http://localhost:8090 | call-analytics vendor |
/// | CALL_API_USERNAME / _PASSWORD / _KEY / _PBX_ID | (empty) | vendor credentials |
/// | CALL_API_PAGE_SIZE | 500 | |
/// | CALL_API_TIMEOUT_MS | 10000 | per-request timeout |
/// | SES_FROM_EMAIL | (unset) | unset disables all email |
/// | SES_REGION | (unset) | overrides the AWS default chain |
/// | HR_NOTIFY_EMAIL | (unset) | HR alerts and digests |
/// | ADMIN_EMAIL / ADMIN_PASSWORD | admin@hq.local / admin123 | first-run seed |
/// | WORKDAY_END_HOUR | 20 | absentee sweep trigger (local) |
/// | MEETING_DIGEST_HOUR | 9 | meeting digest trigger (local) |
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// HTTP API port
    pub http_port: u16,
    /// Directory holding the SQLite database file
    pub data_dir: String,
    /// Business time zone; all day windows are computed here
    pub timezone: Tz,
    /// JWT settings
    pub jwt: JwtConfig,
    /// Call-analytics vendor settings
    pub call: CallAnalyticsConfig,
    /// Sender address for outgoing mail; None disables the mailer
    pub ses_from_email: Option<String>,
    /// Optional AWS region override for SES
    pub ses_region: Option<String>,
    /// HR inbox for reason alerts and the absentee digest
    pub hr_notify_email: Option<String>,
    /// First-run admin seed credentials
    pub admin_email: String,
    pub admin_password: String,
    /// Local hour (0-23) when the absentee sweep runs
    pub workday_end_hour: u32,
    /// Local hour (0-23) when the meeting digest goes out
    pub meeting_digest_hour: u32,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables, with defaults for
    /// everything a development run needs
    pub fn from_env() -> Self {
        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|s| s.parse::<Tz>().ok())
            .unwrap_or(chrono_tz::Asia::Kolkata);

        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => {
                if secret.len() < 32 {
                    tracing::warn!("JWT_SECRET shorter than 32 bytes; using it anyway");
                }
                secret
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set; using a development fallback key");
                "hq-server-development-secret-key-not-for-production".to_string()
            }
        };

        Self {
            environment: env_or("ENVIRONMENT", "development"),
            http_port: env_parse("HTTP_PORT", 3000),
            data_dir: env_or("DATA_DIR", "./data"),
            timezone,
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_minutes: env_parse("JWT_EXPIRATION_MINUTES", 480),
                issuer: env_or("JWT_ISSUER", "hq-server"),
                audience: env_or("JWT_AUDIENCE", "hq-clients"),
            },
            call: CallAnalyticsConfig {
                base_url: env_or("CALL_API_BASE_URL", "http://localhost:8090"),
                username: env_or("CALL_API_USERNAME", ""),
                password: env_or("CALL_API_PASSWORD", ""),
                api_key: env_or("CALL_API_KEY", ""),
                pbx_id: env_or("CALL_API_PBX_ID", ""),
                page_size: env_parse("CALL_API_PAGE_SIZE", 500),
                timeout_ms: env_parse("CALL_API_TIMEOUT_MS", 10_000),
                timezone_label: timezone.name().to_string(),
            },
            ses_from_email: std::env::var("SES_FROM_EMAIL").ok(),
            ses_region: std::env::var("SES_REGION").ok(),
            hr_notify_email: std::env::var("HR_NOTIFY_EMAIL").ok(),
            admin_email: env_or("ADMIN_EMAIL", "admin@hq.local"),
            admin_password: env_or("ADMIN_PASSWORD", "admin123"),
            workday_end_hour: env_parse("WORKDAY_END_HOUR", 20).min(23),
            meeting_digest_hour: env_parse("MEETING_DIGEST_HOUR", 9).min(23),
        }
    }

    /// Override the filesystem and port bindings; used by tests that
    /// spin up a real server against a scratch directory
    pub fn with_overrides(data_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Path of the SQLite database file inside `data_dir`
    pub fn db_path(&self) -> String {
        format!("{}/hq.db", self.data_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
