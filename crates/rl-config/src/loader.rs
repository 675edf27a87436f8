//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "rolelist.toml",
    "config.toml",
    "./config/rolelist.toml",
    "./config/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides,
    /// then validate it
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) but reads overrides through `lookup`
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup)? {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        } else {
            debug!("No configuration file found, using defaults");
        }

        apply_overrides(&mut config, &lookup);
        config.validate()?;

        Ok(config)
    }

    fn find_config_file<F>(&self, lookup: &F) -> Result<Option<PathBuf>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An explicitly requested file must exist
        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::ReadError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("config file {} not found", path.display()),
                )));
            }
            return Ok(Some(path.clone()));
        }

        if let Some(path) = lookup("ROLELIST_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        Ok(CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // GraphQL
    if let Some(val) = lookup("ROLELIST_GRAPHQL_ENDPOINT") {
        config.graphql.endpoint = val;
    }
    if let Some(val) = lookup("ROLELIST_GRAPHQL_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse() {
            config.graphql.timeout_secs = secs;
        }
    }
    if let Some(val) = lookup("ROLELIST_GRAPHQL_RETRY_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.graphql.retry_attempts = attempts;
        }
    }
    if let Some(val) = lookup("ROLELIST_GRAPHQL_RETRY_DELAY_MS") {
        if let Ok(delay) = val.parse() {
            config.graphql.retry_delay_ms = delay;
        }
    }
    if let Some(val) = lookup("ROLELIST_GRAPHQL_USER_AGENT") {
        config.graphql.user_agent = Some(val);
    }

    // Auth
    if let Some(val) = lookup("ROLELIST_BEARER_TOKEN") {
        config.graphql.auth.bearer_token = Some(val);
    }
    if let Some(val) = lookup("ROLELIST_ADMIN_SECRET") {
        config.graphql.auth.admin_secret = Some(val);
    }
    if let Some(val) = lookup("ROLELIST_CLIENT_ID") {
        config.graphql.auth.client_id = Some(val);
    }
    if let Some(val) = lookup("ROLELIST_CLIENT_SECRET") {
        config.graphql.auth.client_secret = Some(val);
    }
    if let Some(val) = lookup("ROLELIST_TOKEN_URL") {
        config.graphql.auth.token_url = Some(val);
    }

    // Store
    if let Some(val) = lookup("ROLELIST_PAGE_LIMIT") {
        if let Ok(limit) = val.parse() {
            config.store.page_limit = limit;
        }
    }
    if let Some(val) = lookup("ROLELIST_THROTTLE_MS") {
        if let Ok(ms) = val.parse() {
            config.store.throttle_ms = ms;
        }
    }

    // Defaults
    if let Some(val) = lookup("ROLELIST_TIME_COMMITMENT_MIN") {
        if let Ok(min) = val.parse() {
            config.defaults.time_commitment_min = min;
        }
    }
    if let Some(val) = lookup("ROLELIST_TIME_COMMITMENT_MAX") {
        if let Ok(max) = val.parse() {
            config.defaults.time_commitment_max = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[graphql]\nendpoint = \"https://roles.example.org/v1/graphql\"\n\n[store]\npage_limit = 10"
        )
        .unwrap();

        let config = ConfigLoader::with_path(file.path())
            .load_with(|_| None)
            .unwrap();

        assert_eq!(config.graphql.endpoint, "https://roles.example.org/v1/graphql");
        assert_eq!(config.store.page_limit, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = ConfigLoader::with_path("/nonexistent/rolelist.toml").load_with(|_| None);
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\npage_limit = 10\nthrottle_ms = 250").unwrap();

        let env = vars(&[
            ("ROLELIST_PAGE_LIMIT", "30"),
            ("ROLELIST_ADMIN_SECRET", "s3cret"),
            ("ROLELIST_TIME_COMMITMENT_MAX", "12"),
        ]);

        let config = ConfigLoader::with_path(file.path())
            .load_with(|key| env.get(key).cloned())
            .unwrap();

        assert_eq!(config.store.page_limit, 30);
        assert_eq!(config.store.throttle_ms, 250);
        assert_eq!(config.graphql.auth.admin_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.defaults.time_commitment_max, 12);
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\npage_limit = 15").unwrap();

        let env = vars(&[("ROLELIST_PAGE_LIMIT", "lots")]);
        let config = ConfigLoader::with_path(file.path())
            .load_with(|key| env.get(key).cloned())
            .unwrap();

        assert_eq!(config.store.page_limit, 15);
    }

    #[test]
    fn test_overrides_are_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\ntime_commitment_min = 5").unwrap();

        let env = vars(&[("ROLELIST_TIME_COMMITMENT_MAX", "2")]);
        let result = ConfigLoader::with_path(file.path()).load_with(|key| env.get(key).cloned());

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_config_env_var_points_at_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nthrottle_ms = 900").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let env = vars(&[("ROLELIST_CONFIG", path.as_str())]);
        let config = ConfigLoader::new()
            .load_with(|key| env.get(key).cloned())
            .unwrap();

        assert_eq!(config.store.throttle_ms, 900);
    }
}
