//! Environment-backed configuration with a default for every knob, read once
//! at startup and passed down explicitly.

use std::env;
use std::str::FromStr;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Remote host to probe over SSH.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Pinned SHA-256 host-key fingerprint, hex. When set, any other key is
    /// a hard connect error; when unset the key is accepted with a warning.
    pub host_fingerprint: Option<String>,
    pub connect_timeout_secs: u64,
    pub command_timeout_secs: u64,
}

impl RemoteConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST_IP", "10.0.3.15"),
            port: env_parse("HOST_PORT", 22),
            user: env_or("HOST_USER", "root"),
            password: env_or("HOST_PASSWORD", "root"),
            host_fingerprint: env::var("HOST_FINGERPRINT").ok().filter(|v| !v.is_empty()),
            connect_timeout_secs: env_parse("CONNECT_TIMEOUT_SECS", 10),
            command_timeout_secs: env_parse("COMMAND_TIMEOUT_SECS", 30),
        }
    }
}

/// MariaDB/MySQL connection parameters, shared by the collector and the
/// read API.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    pub fn from_env() -> Self {
        Self {
            host: env_or("DB_HOST", "127.0.0.1"),
            port: env_parse("DB_PORT", 3306),
            name: env_or("DB_NAME", "server_monitor"),
            user: env_or("DB_USER", "monitor"),
            password: env_or("DB_PASSWORD", "monitorpass"),
        }
    }
}

/// Log level filter and destination file.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub file: String,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            level: env_or("LOG_LEVEL", "info"),
            file: env_or("LOG_FILE", "server_monitor.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test touches a disjoint set of variables so they can run in
    // parallel.

    #[test]
    fn remote_config_defaults_and_overrides() {
        env::remove_var("HOST_PORT");
        env::remove_var("HOST_FINGERPRINT");
        let cfg = RemoteConfig::from_env();
        assert_eq!(cfg.port, 22);
        assert_eq!(cfg.connect_timeout_secs, 10);
        assert!(cfg.host_fingerprint.is_none());

        env::set_var("HOST_PORT", "2222");
        env::set_var("HOST_FINGERPRINT", "ab12");
        let cfg = RemoteConfig::from_env();
        assert_eq!(cfg.port, 2222);
        assert_eq!(cfg.host_fingerprint.as_deref(), Some("ab12"));
        env::remove_var("HOST_PORT");
        env::remove_var("HOST_FINGERPRINT");
    }

    #[test]
    fn db_config_ignores_unparseable_port() {
        env::set_var("DB_PORT", "not-a-port");
        let cfg = DbConfig::from_env();
        assert_eq!(cfg.port, 3306);
        env::remove_var("DB_PORT");
    }

    #[test]
    fn log_config_defaults() {
        env::remove_var("LOG_LEVEL");
        env::remove_var("LOG_FILE");
        let cfg = LogConfig::from_env();
        assert_eq!(cfg.level, "info");
        assert_eq!(cfg.file, "server_monitor.log");
    }
}
