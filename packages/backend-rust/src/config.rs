use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_QUESTION_SET: &str = "sat-core";
const DEFAULT_JWT_EXPIRES_IN: &str = "24h";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub database_url: String,
    pub jwt_secret: Option<String>,
    pub jwt_expires_in: String,
    pub question_set: String,
    pub seed_diagnostic: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let database_url = env_string("DATABASE_URL").unwrap_or_else(default_database_url);

        let jwt_secret = env_string("JWT_SECRET");
        let jwt_expires_in =
            env_string("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_JWT_EXPIRES_IN.to_string());

        let question_set = env_string("DIAGNOSTIC_QUESTION_SET")
            .unwrap_or_else(|| DEFAULT_QUESTION_SET.to_string());
        let seed_diagnostic = env_bool("SEED_DIAGNOSTIC").unwrap_or(true);

        Self {
            host,
            port,
            log_level,
            database_url,
            jwt_secret,
            jwt_expires_in,
            question_set,
            seed_diagnostic,
        }
    }

    /// In-memory configuration used by tests and embedded servers.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            log_level: "warn".to_string(),
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: Some(jwt_secret.to_string()),
            jwt_expires_in: DEFAULT_JWT_EXPIRES_IN.to_string(),
            question_set: DEFAULT_QUESTION_SET.to_string(),
            seed_diagnostic: true,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub fn default_sqlite_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("com.prep.app")
        .join("prep.db")
}

fn default_database_url() -> String {
    format!("sqlite:{}?mode=rwc", default_sqlite_path().display())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    let normalized = value.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_tests_uses_memory_database() {
        let config = Config::for_tests("secret");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.jwt_secret.as_deref(), Some("secret"));
        assert_eq!(config.bind_addr().port(), 0);
    }

    #[test]
    fn test_default_sqlite_path_file_name() {
        let path = default_sqlite_path();
        assert!(path.ends_with("com.prep.app/prep.db"));
    }
}
