use std::net::IpAddr;
use std::path::PathBuf;

use chrono_tz::Tz;
use ipnet::IpNet;

/// Address that receives every submission notification unless overridden.
pub const DEFAULT_NOTIFY_TO: &str = "contact@alephiclabs.com";

/// Zone the log and notification timestamps are rendered in.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub database_url: Option<String>,
    pub max_body_size: usize,
    pub log_level: String,
    pub notify_to: String,
    pub upload_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub admin_token: Option<String>,
    pub honeypot_field: Option<String>,
    pub header_policy: HeaderPolicy,
    pub timezone: Tz,
    pub rate_limit: u32,
    pub rate_window_secs: u64,
    pub trusted_proxies: Vec<IpNet>,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

/// How a sheet's header row reacts to fields it has not seen before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// The first record fixes the columns; unknown fields are dropped.
    Frozen,
    /// Unknown fields become new trailing columns.
    Append,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("INTAKE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_HOST: {e}"))?;

        let port: u16 = env_or("INTAKE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_PORT: {e}"))?;

        let base_url = env_or("INTAKE_BASE_URL", &format!("http://{host}:{port}"));

        let database_url = env_optional("DATABASE_URL");

        let max_body_size: usize = env_or("INTAKE_MAX_BODY_SIZE", "10485760")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("INTAKE_LOG_LEVEL", "info");
        let notify_to = env_or("INTAKE_NOTIFY_TO", DEFAULT_NOTIFY_TO);
        let upload_dir = PathBuf::from(env_or("INTAKE_UPLOAD_DIR", "uploads"));
        let static_dir = env_optional("INTAKE_STATIC_DIR").map(PathBuf::from);
        let admin_token = env_optional("INTAKE_ADMIN_TOKEN");
        let honeypot_field = env_optional("INTAKE_HONEYPOT_FIELD");

        let header_policy = match env_or("INTAKE_HEADER_POLICY", "frozen").as_str() {
            "append" => HeaderPolicy::Append,
            "frozen" => HeaderPolicy::Frozen,
            other => return Err(format!("Invalid INTAKE_HEADER_POLICY: {other}")),
        };

        let timezone = parse_timezone(&env_or("INTAKE_TIMEZONE", DEFAULT_TIMEZONE))?;

        let rate_limit: u32 = env_or("INTAKE_RATE_LIMIT", "10")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_RATE_LIMIT: {e}"))?;

        let rate_window_secs: u64 = env_or("INTAKE_RATE_WINDOW_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_RATE_WINDOW_SECS: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("INTAKE_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid INTAKE_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let smtp = match (
            std::env::var("INTAKE_SMTP_HOST").ok(),
            std::env::var("INTAKE_SMTP_PORT").ok(),
            std::env::var("INTAKE_SMTP_USER").ok(),
            std::env::var("INTAKE_SMTP_PASS").ok(),
            std::env::var("INTAKE_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid INTAKE_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            host,
            port,
            base_url,
            database_url,
            max_body_size,
            log_level,
            notify_to,
            upload_dir,
            static_dir,
            admin_token,
            honeypot_field,
            header_policy,
            timezone,
            rate_limit,
            rate_window_secs,
            trusted_proxies,
            smtp,
        })
    }
}

/// Parse an IANA zone name such as `America/New_York`.
pub fn parse_timezone(raw: &str) -> Result<Tz, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("Invalid INTAKE_TIMEZONE: {raw}"))
}

fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
