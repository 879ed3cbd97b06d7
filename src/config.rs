use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "DentaDesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the HTTP API.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

/// Default upstream chat-completions API base URL.
pub const DEFAULT_AI_URL: &str = "https://api.artemox.com/v1";

/// Seed used for mock data when `DENTADESK_SEED` is unset.
pub const DEFAULT_SEED: u64 = 20_241_230;

/// File name of the local storage database inside the data directory.
pub const STORAGE_FILE: &str = "local_storage.db";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "dentadesk_lib=debug,dentadesk=debug,tower_http=info,info"
    } else {
        "info"
    }
}

/// Get the application data directory.
/// ~/DentaDesk/ unless a home directory cannot be determined.
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => PathBuf::from(APP_NAME),
    }
}

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen: SocketAddr,
    pub data_dir: PathBuf,
    pub ai_url: String,
    /// Bearer token for the upstream API. `None` means the relay forwards
    /// without an Authorization header and the upstream decides.
    pub ai_key: Option<String>,
    pub seed: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid listen address {value}: {reason}")]
    InvalidListen { value: String, reason: String },
    #[error("Invalid mock data seed: {0}")]
    InvalidSeed(String),
}

impl AppConfig {
    /// Read configuration from `DENTADESK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_raw = lookup("DENTADESK_LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidListen {
                value: listen_raw.clone(),
                reason: e.to_string(),
            })?;

        let data_dir = lookup("DENTADESK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(app_data_dir);

        let ai_url = lookup("DENTADESK_AI_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_AI_URL.to_string());

        let ai_key = lookup("DENTADESK_AI_KEY").filter(|key| !key.trim().is_empty());

        let seed = match lookup("DENTADESK_SEED") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed(raw))?,
            None => DEFAULT_SEED,
        };

        Ok(Self {
            listen,
            data_dir,
            ai_url,
            ai_key,
            seed,
        })
    }

    /// Path to the local storage database.
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("DentaDesk"));
    }

    #[test]
    fn defaults_when_environment_empty() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.listen.to_string(), DEFAULT_LISTEN);
        assert_eq!(config.ai_url, DEFAULT_AI_URL);
        assert!(config.ai_key.is_none());
        assert_eq!(config.seed, DEFAULT_SEED);
        assert!(config.storage_path().ends_with(STORAGE_FILE));
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DENTADESK_LISTEN", "0.0.0.0:8080"),
            ("DENTADESK_DATA_DIR", "/tmp/dentadesk"),
            ("DENTADESK_AI_URL", "http://localhost:9000/v1/"),
            ("DENTADESK_AI_KEY", "sk-test"),
            ("DENTADESK_SEED", "7"),
        ]))
        .unwrap();

        assert_eq!(config.listen.port(), 8080);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/dentadesk"));
        assert_eq!(config.ai_url, "http://localhost:9000/v1");
        assert_eq!(config.ai_key.as_deref(), Some("sk-test"));
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn blank_key_is_treated_as_missing() {
        let config = AppConfig::from_lookup(lookup_from(&[("DENTADESK_AI_KEY", "  ")])).unwrap();
        assert!(config.ai_key.is_none());
    }

    #[test]
    fn invalid_listen_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("DENTADESK_LISTEN", "nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidListen { .. }));
    }

    #[test]
    fn invalid_seed_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("DENTADESK_SEED", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeed(_)));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
