//! Configuration module

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::file::{read_json, write_json_durable};
use crate::store::log_store::{DEFAULT_RETENTION_DAYS, MAX_RETENTION_DAYS};

const PROTECTION_FILE: &str = "autoProtect.json";
const LOGS_FILE: &str = "logs.json";
const PROTECT_KEY_FILE: &str = "protect_key.json";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address
    pub bind_addr: IpAddr,

    /// Server port
    pub port: u16,

    /// Directory holding the durable JSON documents
    pub data_dir: PathBuf,

    /// Shared secret for control routes
    pub protect_api_key: Option<String>,

    /// Where a generated protect key is kept between restarts
    pub protect_key_file: PathBuf,

    /// Generate a protect key when none is configured
    pub protect_key_autogen: bool,

    /// Event log retention window
    pub log_retention_days: u32,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        Self {
            bind_addr: env::var("BIND_ADDR")
                .ok()
                .and_then(|a| a.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            protect_api_key: env::var("PROTECT_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),

            protect_key_file: env::var("PROTECT_KEY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join(PROTECT_KEY_FILE)),

            protect_key_autogen: env::var("PROTECT_KEY_AUTOGEN")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(environment != "production"),

            log_retention_days: env::var("LOG_RETENTION_DAYS")
                .ok()
                .map_or(DEFAULT_RETENTION_DAYS, |d| parse_retention_days(&d)),

            data_dir,
            environment,
        }
    }

    /// Configuration rooted at `data_dir` with defaults everywhere else
    #[cfg(test)]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            protect_api_key: None,
            protect_key_file: data_dir.join(PROTECT_KEY_FILE),
            protect_key_autogen: false,
            log_retention_days: DEFAULT_RETENTION_DAYS,
            data_dir,
            environment: "development".to_string(),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn protection_file(&self) -> PathBuf {
        self.data_dir.join(PROTECTION_FILE)
    }

    pub fn logs_file(&self) -> PathBuf {
        self.data_dir.join(LOGS_FILE)
    }

    /// Fill in `protect_api_key` from the key file, generating one if allowed.
    ///
    /// Order: `PROTECT_API_KEY`, then the key file, then a fresh key persisted
    /// to the key file. Leaves the key unset when nothing resolves.
    pub fn resolve_protect_key(&mut self) {
        if self.protect_api_key.is_some() {
            return;
        }

        match read_key_file(&self.protect_key_file) {
            Ok(Some(key)) => {
                self.protect_api_key = Some(key);
                return;
            }
            Ok(None) => {}
            Err(e) => tracing::error!(
                "Failed to load protect key from {}: {}",
                self.protect_key_file.display(),
                e
            ),
        }

        if !self.protect_key_autogen {
            tracing::warn!("No protect API key configured; control routes will refuse requests");
            return;
        }

        let key = uuid::Uuid::new_v4().simple().to_string();
        match write_json_durable(&self.protect_key_file, &ProtectKeyFile { key: key.clone() }) {
            Ok(()) => {
                tracing::info!("Protect API key generated and saved to {}", self.protect_key_file.display());
                self.protect_api_key = Some(key);
            }
            Err(e) => tracing::error!("Failed to create protect key: {}", e),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ProtectKeyFile {
    #[serde(default)]
    key: String,
}

fn read_key_file(path: &Path) -> Result<Option<String>, crate::store::StoreError> {
    let file: Option<ProtectKeyFile> = read_json(path)?;
    Ok(file.map(|f| f.key.trim().to_string()).filter(|k| !k.is_empty()))
}

fn parse_retention_days(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(days) if days <= MAX_RETENTION_DAYS => days,
        _ => {
            tracing::warn!(
                "LOG_RETENTION_DAYS={} is not a day count up to {}; using {}",
                raw,
                MAX_RETENTION_DAYS,
                DEFAULT_RETENTION_DAYS
            );
            DEFAULT_RETENTION_DAYS
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_key_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_data_dir(dir.path());
        config.protect_api_key = Some("from-env".to_string());
        config.protect_key_autogen = true;

        config.resolve_protect_key();
        assert_eq!(config.protect_api_key.as_deref(), Some("from-env"));
        assert!(!config.protect_key_file.exists());
    }

    #[test]
    fn test_key_is_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_data_dir(dir.path());
        std::fs::write(&config.protect_key_file, r#"{"key": "stored-key"}"#).unwrap();

        config.resolve_protect_key();
        assert_eq!(config.protect_api_key.as_deref(), Some("stored-key"));
    }

    #[test]
    fn test_generated_key_is_persisted_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = Config::with_data_dir(dir.path());
        first.protect_key_autogen = true;
        first.resolve_protect_key();
        let key = first.protect_api_key.clone().unwrap();
        assert_eq!(key.len(), 32);

        let mut second = Config::with_data_dir(dir.path());
        second.resolve_protect_key();
        assert_eq!(second.protect_api_key, Some(key));
    }

    #[test]
    fn test_no_key_without_autogen() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_data_dir(dir.path());
        config.resolve_protect_key();
        assert!(config.protect_api_key.is_none());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_parse_retention_days() {
        assert_eq!(parse_retention_days("7"), 7);
        assert_eq!(parse_retention_days(" 365 "), 365);
        assert_eq!(parse_retention_days("36500"), MAX_RETENTION_DAYS);
        assert_eq!(parse_retention_days("36501"), DEFAULT_RETENTION_DAYS);
        assert_eq!(parse_retention_days("4294967295"), DEFAULT_RETENTION_DAYS);
        assert_eq!(parse_retention_days("forever"), DEFAULT_RETENTION_DAYS);
    }
}
