use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::models::Settings;
use crate::notifications::PushPermission;
use crate::policy::AdminSecret;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    pub admin_secret: Option<AdminSecret>,
    pub settings: Settings,
    pub push_permission: PushPermission,
    pub push_webhook_url: Option<String>,
    pub refresh_interval: Duration,
    pub repository_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenvy::dotenv().ok();

        // A hash wins over a plain password when both are set
        let admin_secret = match (
            non_empty_var("ADMIN_PASSWORD_HASH"),
            non_empty_var("ADMIN_PASSWORD"),
        ) {
            (Some(hash), _) => Some(AdminSecret::Argon2(hash)),
            (None, Some(plain)) => Some(AdminSecret::Plain(plain)),
            (None, None) => None,
        };

        Ok(Config {
            database_url: non_empty_var("DATABASE_URL"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_var("SERVER_PORT", 5000),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 10),
            admin_secret,
            settings: Settings {
                auto_delete_expired: parse_flag("AUTO_DELETE_EXPIRED", true),
                auto_purge_trash: parse_flag("AUTO_PURGE_TRASH", false),
                warning_days_15: parse_flag("WARNING_DAYS_15", true),
                warning_days_3: parse_flag("WARNING_DAYS_3", true),
            },
            push_permission: parse_var("PUSH_PERMISSION", PushPermission::Default),
            push_webhook_url: non_empty_var("PUSH_WEBHOOK_URL"),
            refresh_interval: Duration::from_secs(parse_var("REFRESH_INTERVAL_SECS", 60)),
            repository_timeout: Duration::from_millis(parse_var("REPOSITORY_TIMEOUT_MS", 5000)),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            db_max_connections: 10,
            admin_secret: None,
            settings: Settings::default(),
            push_permission: PushPermission::Default,
            push_webhook_url: None,
            refresh_interval: Duration::from_secs(60),
            repository_timeout: Duration::from_millis(5000),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match non_empty_var(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} value {:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

fn parse_flag(key: &str, default: bool) -> bool {
    non_empty_var(key)
        .map(|raw| parse_bool(&raw).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "0.0.0.0:5000");
        assert!(config.settings.auto_delete_expired);
        assert!(!config.settings.auto_purge_trash);
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
    }
}
