use crate::error::ConfigError;
use std::{env, net::IpAddr, path::PathBuf};

/// Sources used when `SANCTIONS_URLS` is not set
///
/// Each should serve either JSON (list of strings, list of objects with an
/// `address`-like field, or an object keyed by address) or CSV with an
/// `address`/`wallet` column.
pub const DEFAULT_SOURCE_URLS: &[&str] = &[
    "https://example.com/sanctions/latest.json",
    "https://example.com/sanctions/crypto_addresses.csv",
];

/// Origins allowed to call the API from a browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub cache_file: PathBuf,
    pub source_urls: Vec<String>,
    /// `None` leaves `/admin/refresh` open
    pub admin_token: Option<String>,
    pub allow_origins: AllowedOrigins,
    pub fetch_timeout_secs: u64,
    /// 0 disables the periodic refresh task
    pub refresh_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `BIND_ADDR` (default: 0.0.0.0)
    /// - `PORT` (default: 10000)
    /// - `CACHE_FILE` (default: /tmp/sanctions_cache.json)
    /// - `SANCTIONS_URLS` comma-separated (default: built-in list)
    /// - `ADMIN_TOKEN` (default: empty, admin endpoint open)
    /// - `ALLOW_ORIGINS` comma-separated (default: *)
    /// - `FETCH_TIMEOUT_SECS` (default: 15, must be at least 1)
    /// - `REFRESH_INTERVAL_SECS` (default: 0, disabled)
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("BIND_ADDR '{}'", raw)))?,
            Err(_) => IpAddr::from([0, 0, 0, 0]),
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("PORT '{}'", raw)))?,
            Err(_) => 10000,
        };

        let cache_file = env::var("CACHE_FILE")
            .unwrap_or_else(|_| "/tmp/sanctions_cache.json".to_string())
            .into();

        let source_urls = match env::var("SANCTIONS_URLS") {
            Ok(raw) if !raw.trim().is_empty() => split_list(&raw),
            _ => DEFAULT_SOURCE_URLS.iter().map(|u| u.to_string()).collect(),
        };

        let admin_token = env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

        let allow_origins =
            parse_origins(&env::var("ALLOW_ORIGINS").unwrap_or_else(|_| "*".to_string()));

        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(15);
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "FETCH_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        let refresh_interval_secs = env::var("REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        Ok(Self {
            bind_addr,
            port,
            cache_file,
            source_urls,
            admin_token,
            allow_origins,
            fetch_timeout_secs,
            refresh_interval_secs,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `*` anywhere in the list means any origin
pub fn parse_origins(raw: &str) -> AllowedOrigins {
    let origins = split_list(raw);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "BIND_ADDR",
        "PORT",
        "CACHE_FILE",
        "SANCTIONS_URLS",
        "ADMIN_TOKEN",
        "ALLOW_ORIGINS",
        "FETCH_TIMEOUT_SECS",
        "REFRESH_INTERVAL_SECS",
    ];

    fn clear_vars() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    // Env vars are process-wide, so defaults, overrides and the invalid case
    // run in one test to avoid racing each other.
    #[test]
    fn test_config_from_env() {
        clear_vars();

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 10000);
        assert_eq!(config.bind_addr, IpAddr::from([0, 0, 0, 0]));
        assert_eq!(config.cache_file, PathBuf::from("/tmp/sanctions_cache.json"));
        assert_eq!(config.source_urls.len(), DEFAULT_SOURCE_URLS.len());
        assert_eq!(config.admin_token, None);
        assert_eq!(config.allow_origins, AllowedOrigins::Any);
        assert_eq!(config.fetch_timeout_secs, 15);
        assert_eq!(config.refresh_interval_secs, 0);

        env::set_var("PORT", "8080");
        env::set_var("CACHE_FILE", "/tmp/test_cache.json");
        env::set_var("SANCTIONS_URLS", "https://a.example/list.json, ,https://b.example/list.csv");
        env::set_var("ADMIN_TOKEN", "secret");
        env::set_var("ALLOW_ORIGINS", "https://app.example, https://admin.example");
        env::set_var("REFRESH_INTERVAL_SECS", "3600");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_file, PathBuf::from("/tmp/test_cache.json"));
        assert_eq!(
            config.source_urls,
            vec!["https://a.example/list.json", "https://b.example/list.csv"]
        );
        assert_eq!(config.admin_token.as_deref(), Some("secret"));
        assert_eq!(
            config.allow_origins,
            AllowedOrigins::List(vec![
                "https://app.example".to_string(),
                "https://admin.example".to_string()
            ])
        );
        assert_eq!(config.refresh_interval_secs, 3600);

        // Empty token disables the admin check
        env::set_var("ADMIN_TOKEN", "");
        assert_eq!(Config::from_env().unwrap().admin_token, None);

        env::set_var("PORT", "not-a-port");
        assert!(Config::from_env().is_err());
        env::remove_var("PORT");

        // A zero timeout would fail every fetch
        env::set_var("FETCH_TIMEOUT_SECS", "0");
        assert!(Config::from_env().is_err());
        env::set_var("FETCH_TIMEOUT_SECS", "30");
        assert_eq!(Config::from_env().unwrap().fetch_timeout_secs, 30);

        clear_vars();
    }

    #[test]
    fn test_parse_origins_wildcard() {
        assert_eq!(parse_origins("*"), AllowedOrigins::Any);
        assert_eq!(parse_origins(""), AllowedOrigins::Any);
        assert_eq!(parse_origins("https://a.example,*"), AllowedOrigins::Any);
    }
}
